use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Maximum number of features on a listing in the creation form
pub const LISTING_FEATURE_LIMIT: usize = 10;

/// How long a feature warning stays visible, in seconds
pub const WARNING_TTL_SECS: i64 = 5;

/// Canonical feature name (lowercase) to the spellings users type for it
pub const FEATURE_SYNONYMS: &[(&str, &[&str])] = &[
    ("ac", &["air conditioning", "a/c", "ac", "air con", "climate control"]),
    ("parking", &["parking space", "parking spot", "parking lot", "car park"]),
    ("garage", &["carport", "covered parking"]),
    ("pool", &["swimming pool", "pool"]),
    ("elevator", &["lift"]),
    ("garden", &["yard", "backyard"]),
    ("balcony", &["loggia"]),
    ("terrace", &["patio", "deck"]),
    ("internet", &["wifi", "wi-fi", "broadband"]),
    ("furnished", &["furniture", "fully furnished"]),
    ("storage", &["storage room", "basement storage"]),
    ("security", &["alarm", "video surveillance", "cctv"]),
    ("fireplace", &["chimney", "wood stove"]),
];

/// Resolve free text to the spelling of a known feature.
///
/// Tries an exact case-insensitive match, then the synonym table, then
/// substring containment in either direction. The first hit wins.
pub fn find_matching_feature(input: &str, known: &[String]) -> Option<String> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let known_lower: Vec<(String, &String)> = known
        .iter()
        .map(|feature| (feature.trim().to_lowercase(), feature))
        .filter(|(lower, _)| !lower.is_empty())
        .collect();

    if let Some((_, feature)) = known_lower.iter().find(|(lower, _)| *lower == needle) {
        return Some((*feature).clone());
    }

    for (canonical, synonyms) in FEATURE_SYNONYMS {
        if !synonyms.contains(&needle.as_str()) {
            continue;
        }
        if let Some((_, feature)) = known_lower.iter().find(|(lower, _)| lower == canonical) {
            return Some((*feature).clone());
        }
    }

    known_lower
        .iter()
        .find(|(lower, _)| needle.contains(lower.as_str()) || lower.contains(needle.as_str()))
        .map(|(_, feature)| (*feature).clone())
}

/// Result of adding a feature to a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureAdded {
    /// Input resolved to a known feature
    Matched(String),
    /// Input kept as typed, it may not match any indexed property
    Unmatched(String),
    Duplicate(String),
    LimitReached,
    Empty,
}

/// A non-blocking notice that dismisses itself after [`WARNING_TTL_SECS`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Warning {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now - self.raised_at < Duration::seconds(WARNING_TTL_SECS)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WarningBanner {
    warning: Option<Warning>,
}

impl WarningBanner {
    pub fn raise(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.warning = Some(Warning {
            message: message.into(),
            raised_at: now,
        });
    }

    /// Message still on screen at `now`; expired warnings are dropped
    pub fn current(&mut self, now: DateTime<Utc>) -> Option<&str> {
        if self.warning.as_ref().is_some_and(|w| !w.is_visible(now)) {
            self.warning = None;
        }
        self.warning.as_ref().map(|w| w.message.as_str())
    }

    pub fn dismiss(&mut self) {
        self.warning = None;
    }
}

/// Ordered set of features picked in a form
#[derive(Debug, Clone, Default)]
pub struct FeatureSelection {
    features: Vec<String>,
    limit: Option<usize>,
    banner: WarningBanner,
}

impl FeatureSelection {
    /// Unbounded selection, as used by the advanced search
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection capped at `limit` entries
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Selection for the listing creation form
    pub fn for_listing() -> Self {
        Self::with_limit(LISTING_FEATURE_LIMIT)
    }

    pub fn add(&mut self, input: &str, known: &[String], now: DateTime<Utc>) -> FeatureAdded {
        let typed = input.trim();
        if typed.is_empty() {
            return FeatureAdded::Empty;
        }

        let matched = find_matching_feature(typed, known);
        let feature = matched.clone().unwrap_or_else(|| typed.to_string());

        if self.contains(&feature) {
            return FeatureAdded::Duplicate(feature);
        }
        if self.limit.is_some_and(|limit| self.features.len() >= limit) {
            return FeatureAdded::LimitReached;
        }

        self.features.push(feature.clone());
        match matched {
            Some(_) => FeatureAdded::Matched(feature),
            None => {
                debug!("No known feature matches '{}'", feature);
                self.banner.raise(
                    format!(
                        "\"{}\" does not match any known feature, some listings may not be found",
                        feature
                    ),
                    now,
                );
                FeatureAdded::Unmatched(feature)
            }
        }
    }

    /// Removes a feature, ignoring case. Returns whether anything was removed.
    pub fn remove(&mut self, feature: &str) -> bool {
        let before = self.features.len();
        let needle = feature.trim().to_lowercase();
        self.features.retain(|f| f.to_lowercase() != needle);
        self.features.len() != before
    }

    pub fn contains(&self, feature: &str) -> bool {
        let needle = feature.trim().to_lowercase();
        self.features.iter().any(|f| f.to_lowercase() == needle)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn into_features(self) -> Vec<String> {
        self.features
    }

    pub fn warning(&mut self, now: DateTime<Utc>) -> Option<&str> {
        self.banner.current(now)
    }
}
