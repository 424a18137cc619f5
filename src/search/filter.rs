use crate::models::{HeatingType, ListingType, PropertyCondition, PropertyType};
use serde::{Deserialize, Serialize};

/// Conversion between a filter value and its query-string form
pub(crate) trait QueryValue: Sized {
    /// `None` when the value should not appear in a query string at all
    fn to_query(&self) -> Option<String>;
    fn from_query(raw: &str) -> Option<Self>;
}

impl QueryValue for String {
    fn to_query(&self) -> Option<String> {
        let trimmed = self.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn from_query(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

impl QueryValue for f64 {
    fn to_query(&self) -> Option<String> {
        // f64's Display never uses exponents or separators, 200000.0 prints as "200000"
        self.is_finite().then(|| self.to_string())
    }

    fn from_query(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

macro_rules! integer_query_value {
    ($($ty:ty),+) => {
        $(
            impl QueryValue for $ty {
                fn to_query(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn from_query(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )+
    };
}

integer_query_value!(i32, u32);

macro_rules! enum_query_value {
    ($($ty:ty),+) => {
        $(
            impl QueryValue for $ty {
                fn to_query(&self) -> Option<String> {
                    Some(self.as_str().to_string())
                }

                fn from_query(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )+
    };
}

enum_query_value!(PropertyType, ListingType, HeatingType, PropertyCondition);

/// Declares `SearchFilter` from a single table of (field, type, query parameter).
/// Encoder, decoder and serde all read parameter names from here.
macro_rules! search_filter {
    ($($field:ident: $ty:ty => $param:literal,)+) => {
        /// Criteria of one property search. Every criterion is optional.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct SearchFilter {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )+
            #[serde(skip_serializing_if = "Vec::is_empty")]
            pub features: Vec<String>,
        }

        impl SearchFilter {
            /// Query parameter names understood by the decoder
            pub const PARAMS: &'static [&'static str] = &[$($param,)+ FEATURES_PARAM];

            /// Populated scalar criteria in declaration order
            pub(crate) fn scalar_params(&self) -> Vec<(&'static str, String)> {
                let mut pairs = Vec::new();
                $(
                    if let Some(value) = self.$field.as_ref().and_then(QueryValue::to_query) {
                        pairs.push(($param, value));
                    }
                )+
                pairs
            }

            /// Sets the criterion named by `param`. Returns false for unknown names.
            /// Values that do not parse leave the criterion untouched.
            pub(crate) fn set_scalar_param(&mut self, param: &str, raw: &str) -> bool {
                match param {
                    $(
                        $param => {
                            if let Some(value) = <$ty as QueryValue>::from_query(raw) {
                                self.$field = Some(value);
                            }
                            true
                        }
                    )+
                    _ => false,
                }
            }
        }
    };
}

pub const FEATURES_PARAM: &str = "features";

search_filter! {
    search_term: String => "searchTerm",
    price_min: f64 => "priceMin",
    price_max: f64 => "priceMax",
    property_type: PropertyType => "propertyType",
    listing_type: ListingType => "listingType",
    room_count: f64 => "roomCount",
    room_count_min: f64 => "roomCountMin",
    room_count_max: f64 => "roomCountMax",
    floor: i32 => "floor",
    floor_min: i32 => "floorMin",
    floor_max: i32 => "floorMax",
    total_floors: u32 => "totalFloors",
    total_floors_min: u32 => "totalFloorsMin",
    total_floors_max: u32 => "totalFloorsMax",
    construction_year: i32 => "constructionYear",
    construction_year_min: i32 => "constructionYearMin",
    construction_year_max: i32 => "constructionYearMax",
    heating_type: HeatingType => "heatingType",
    property_condition: PropertyCondition => "propertyCondition",
    size_in_sq_mt: f64 => "sizeInSqMt",
    size_in_sq_mt_min: f64 => "sizeInSqMtMin",
    size_in_sq_mt_max: f64 => "sizeInSqMtMax",
    city: String => "city",
    state: String => "state",
    zip_code: String => "zipCode",
}

impl SearchFilter {
    /// True when no criterion would end up in a query string
    pub fn is_empty(&self) -> bool {
        self.scalar_params().is_empty() && self.active_features().next().is_none()
    }

    /// Features that carry a value, in selection order
    pub fn active_features(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .map(|feature| feature.trim())
            .filter(|feature| !feature.is_empty())
    }
}
