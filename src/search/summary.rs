use crate::search::filter::SearchFilter;
use std::fmt::Display;

/// Shown when a search has no criteria at all
pub const ALL_LISTINGS: &str = "All listings";

const SEPARATOR: &str = ", ";

/// Human-readable description of the active criteria of a filter
pub fn summarize(filter: &SearchFilter) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(term) = text(&filter.search_term) {
        parts.push(format!("\"{}\"", term));
    }
    if let Some(listing_type) = filter.listing_type {
        parts.push(listing_type.label().to_string());
    }
    if let Some(property_type) = filter.property_type {
        parts.push(property_type.label().to_string());
    }
    if let Some(price) = range("Price", filter.price_min, filter.price_max, number) {
        parts.push(price);
    }

    if let Some(rooms) = filter.room_count {
        parts.push(room_label(rooms));
    }
    if let Some(rooms) = range("Rooms", filter.room_count_min, filter.room_count_max, room_label) {
        parts.push(rooms);
    }

    if let Some(size) = filter.size_in_sq_mt {
        parts.push(square_meters(size));
    }
    if let Some(size) = range(
        "Size",
        filter.size_in_sq_mt_min,
        filter.size_in_sq_mt_max,
        square_meters,
    ) {
        parts.push(size);
    }

    if let Some(floor) = filter.floor {
        parts.push(floor_label(floor));
    }
    if let Some(floor) = range("Floor", filter.floor_min, filter.floor_max, floor_label) {
        parts.push(floor);
    }

    if let Some(total) = filter.total_floors {
        parts.push(format!("{} floors in building", total));
    }
    if let Some(total) = range(
        "Floors in building",
        filter.total_floors_min,
        filter.total_floors_max,
        number,
    ) {
        parts.push(total);
    }

    if let Some(year) = filter.construction_year {
        parts.push(format!("Built in {}", year));
    }
    if let Some(built) = range(
        "Built",
        filter.construction_year_min,
        filter.construction_year_max,
        number,
    ) {
        parts.push(built);
    }

    if let Some(heating) = filter.heating_type {
        parts.push(heating.label().to_string());
    }
    if let Some(condition) = filter.property_condition {
        parts.push(condition.label().to_string());
    }

    let location: Vec<&str> = [&filter.city, &filter.state, &filter.zip_code]
        .into_iter()
        .filter_map(|field| text(field))
        .collect();
    if !location.is_empty() {
        parts.push(location.join(" "));
    }

    let features: Vec<&str> = filter.active_features().collect();
    if !features.is_empty() {
        parts.push(format!("Features: {}", features.join(SEPARATOR)));
    }

    if parts.is_empty() {
        ALL_LISTINGS.to_string()
    } else {
        parts.join(SEPARATOR)
    }
}

/// Room count label: 0.5 is a studio
pub fn room_label(rooms: f64) -> String {
    if rooms == 0.5 {
        "Studio".to_string()
    } else if rooms == 1.0 {
        "1 room".to_string()
    } else {
        format!("{} rooms", rooms)
    }
}

/// Floor label: 0 is the ground floor, negative floors are basements
pub fn floor_label(floor: i32) -> String {
    match floor {
        0 => "Ground floor".to_string(),
        f if f < 0 => format!("{}. basement", f.unsigned_abs()),
        f => format!("{}. floor", f),
    }
}

fn square_meters(size: f64) -> String {
    format!("{} m²", size)
}

fn number<T: Display>(value: T) -> String {
    value.to_string()
}

fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn range<T>(name: &str, min: Option<T>, max: Option<T>, label: impl Fn(T) -> String) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) => Some(format!("{} {} - {}", name, label(min), label(max))),
        (Some(min), None) => Some(format!("{} from {}", name, label(min))),
        (None, Some(max)) => Some(format!("{} up to {}", name, label(max))),
        (None, None) => None,
    }
}
