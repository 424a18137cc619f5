use crate::client::SearchState;
use crate::models::{Property, PropertyPage};
use crate::search::summary::{floor_label, room_label};
use std::fmt::Write;

pub const NO_RESULTS_MESSAGE: &str = "No listings match your search.";
pub const LOADING_MESSAGE: &str = "Loading...";

/// Text rendering of the results page
pub fn render_state(state: &SearchState) -> String {
    if state.loading {
        return LOADING_MESSAGE.to_string();
    }
    if let Some(error) = &state.error {
        return error.clone();
    }
    match &state.results {
        Some(page) => render_page(page),
        None => NO_RESULTS_MESSAGE.to_string(),
    }
}

/// Numbered property cards followed by a page footer
pub fn render_page(page: &PropertyPage) -> String {
    if page.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let offset = page.number as usize * page.size as usize;
    let mut out = String::new();
    for (i, property) in page.content.iter().enumerate() {
        out.push_str(&render_card(offset + i + 1, property));
        out.push('\n');
    }
    let _ = write!(
        out,
        "Page {} of {} ({} listings)",
        page.number + 1,
        page.page_count(),
        page.total()
    );
    out
}

pub fn render_card(position: usize, property: &Property) -> String {
    let mut out = String::new();

    let heading = property
        .title
        .as_deref()
        .or(property.address.as_deref())
        .unwrap_or("Untitled listing");
    let _ = write!(out, "{}. {}", position, heading);
    if let Some(price) = property.price {
        let _ = write!(out, " ({})", price);
    }
    out.push('\n');

    let mut facts = Vec::new();
    if let Some(listing_type) = property.listing_type {
        facts.push(listing_type.label().to_string());
    }
    if let Some(property_type) = property.property_type {
        facts.push(property_type.label().to_string());
    }
    if let Some(rooms) = property.room_count {
        facts.push(room_label(rooms));
    }
    if let Some(size) = property.size_in_sq_mt {
        facts.push(format!("{} m²", size));
    }
    if let Some(floor) = property.floor {
        facts.push(floor_label(floor));
    }
    if !facts.is_empty() {
        let _ = writeln!(out, "   {}", facts.join(", "));
    }

    let location: Vec<&str> = [&property.address, &property.city, &property.zip_code]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .filter(|value| !value.trim().is_empty())
        .collect();
    if !location.is_empty() {
        let _ = writeln!(out, "   Location: {}", location.join(", "));
    }
    if !property.features.is_empty() {
        let _ = writeln!(out, "   Features: {}", property.features.join(", "));
    }
    let _ = write!(out, "   /properties/{}", property.id);

    out
}
