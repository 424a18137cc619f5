use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a marketplace enumeration together with its wire name and display label.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($wire:literal, $label:literal),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name used on the wire and in query strings
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Human-readable label
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// A value that does not name any variant of a marketplace enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

wire_enum! {
    /// Kind of real estate
    pub enum PropertyType {
        Apartment => ("APARTMENT", "Apartment"),
        House => ("HOUSE", "House"),
        Land => ("LAND", "Land"),
        Commercial => ("COMMERCIAL", "Commercial"),
        Condo => ("CONDO", "Condo"),
        Garage => ("GARAGE", "Garage"),
        Other => ("OTHER", "Other property"),
    }
}

wire_enum! {
    /// Transaction category of a listing
    pub enum ListingType {
        ForSale => ("FOR_SALE", "For sale"),
        ForRent => ("FOR_RENT", "For rent"),
        ForLease => ("FOR_LEASE", "For lease"),
    }
}

wire_enum! {
    pub enum HeatingType {
        Central => ("CENTRAL", "Central heating"),
        District => ("DISTRICT", "District heating"),
        Electric => ("ELECTRIC", "Electric heating"),
        Gas => ("GAS", "Gas heating"),
        HeatPump => ("HEAT_PUMP", "Heat pump"),
        Solar => ("SOLAR", "Solar heating"),
        WoodPellet => ("WOOD_PELLET", "Wood pellet heating"),
        Oil => ("OIL", "Oil heating"),
        None => ("NONE", "No heating"),
        Other => ("OTHER", "Other heating"),
    }
}

wire_enum! {
    pub enum PropertyCondition {
        NewConstruction => ("NEW_CONSTRUCTION", "New construction"),
        Renovated => ("RENOVATED", "Renovated"),
        Modernized => ("MODERNIZED", "Modernized"),
        Good => ("GOOD", "Good condition"),
        NeedsRenovation => ("NEEDS_RENOVATION", "Needs renovation"),
        Original => ("ORIGINAL", "Original condition"),
        Luxury => ("LUXURY", "Luxury"),
        Shell => ("SHELL", "Shell construction"),
        Other => ("OTHER", "Other condition"),
    }
}

/// Property listing as returned by the marketplace backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub room_count: Option<f64>,
    pub floor: Option<i32>,
    pub total_floors: Option<u32>,
    pub size_in_sq_mt: Option<f64>,
    pub construction_year: Option<i32>,
    pub heating_type: Option<HeatingType>,
    pub property_condition: Option<PropertyCondition>,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyPage {
    pub content: Vec<Property>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl PropertyPage {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Total listing count, falling back to the page content when the backend omits it
    pub fn total(&self) -> u64 {
        self.total_elements.max(self.content.len() as u64)
    }

    pub fn page_count(&self) -> u32 {
        self.total_pages.max(1)
    }
}

/// Signed-in user as known to the session store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Profile details of the signed-in user (agent, agency or private seller)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub agency_name: Option<String>,
    pub avatar_url: Option<String>,
}
