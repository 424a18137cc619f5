use crate::search::filter::{SearchFilter, FEATURES_PARAM};
use url::form_urlencoded;

/// Path of the results page
pub const SEARCH_PATH: &str = "/search";

/// Encode a filter as a URL query string (without the leading `?`).
///
/// Only populated criteria are emitted. Each feature becomes its own
/// `features=<value>` pair so values may contain any character.
pub fn encode(filter: &SearchFilter) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for (param, value) in filter.scalar_params() {
        serializer.append_pair(param, &value);
    }
    for feature in filter.active_features() {
        serializer.append_pair(FEATURES_PARAM, feature);
    }

    serializer.finish()
}

/// Shareable results-page location for a filter
pub fn search_path(filter: &SearchFilter) -> String {
    let query = encode(filter);
    if query.is_empty() {
        SEARCH_PATH.to_string()
    } else {
        format!("{}?{}", SEARCH_PATH, query)
    }
}

/// Parse a query string back into a filter.
///
/// Accepts a bare query, a `?`-prefixed query, a path or a full URL.
/// Never fails: unknown parameters and unparsable values are skipped.
pub fn decode(input: &str) -> SearchFilter {
    let mut filter = SearchFilter::default();

    for (param, value) in form_urlencoded::parse(query_part(input).as_bytes()) {
        if param == FEATURES_PARAM {
            let feature = value.trim();
            if !feature.is_empty() {
                filter.features.push(feature.to_string());
            }
        } else {
            filter.set_scalar_param(&param, &value);
        }
    }

    filter
}

fn query_part(input: &str) -> &str {
    let without_fragment = input.split('#').next().unwrap_or_default();

    if let Some(query) = without_fragment.strip_prefix('?') {
        return query;
    }
    if without_fragment.starts_with('/') || has_scheme(without_fragment) {
        return without_fragment
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or_default();
    }
    // A bare query has at least one `=`; a raw `?` inside it belongs to a value
    if without_fragment.contains('=') {
        without_fragment
    } else {
        ""
    }
}

fn has_scheme(input: &str) -> bool {
    match input.find("://") {
        Some(end) => {
            let scheme = &input[..end];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
