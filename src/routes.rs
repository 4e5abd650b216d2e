//! Addressable resources consumed and produced by the catalog.
//!
//! Only three: the species list (optional free-text `q`), a species detail
//! addressed by its URL-encoded scientific name, and the static about page.

use std::borrow::Cow;

pub const HOME_ROUTE: &str = "/";
pub const SPECIES_LIST_ROUTE: &str = "/species";
pub const ABOUT_ROUTE: &str = "/about";

/// `/species/{encoded scientific name}`
pub fn species_detail_route(scientific_name: &str) -> String {
    format!("{}/{}", SPECIES_LIST_ROUTE, urlencoding::encode(scientific_name))
}

/// `/species` or `/species?q={encoded query}` for a non-blank query
pub fn species_list_route(query: Option<&str>) -> String {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => {
            format!("{}?q={}", SPECIES_LIST_ROUTE, urlencoding::encode(q))
        }
        _ => SPECIES_LIST_ROUTE.to_string(),
    }
}

/// Decode the path segment of a detail route back to a scientific name.
/// Invalid UTF-8 after decoding is treated as a miss.
pub fn decode_detail_segment(segment: &str) -> Option<Cow<'_, str>> {
    urlencoding::decode(segment).ok()
}
