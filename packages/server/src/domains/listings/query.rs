//! Search request and filter building.
//!
//! One `ListingSearch` serves every search-shaped endpoint: the GET query
//! string and the POST body deserialize into the same struct, and
//! `store_predicates` is the single place a request becomes store filters.
//! Malformed filter values never fail a request; they produce no constraint.

use serde::Deserialize;
use serde_json::json;

use super::models::Listing;
use super::sort::effective_price;
use crate::kernel::Predicate;

/// Columns searched by the free-text `q` filter.
const TEXT_SEARCH_COLUMNS: [&str; 4] = ["title", "description", "city", "neighborhood"];

/// A listing search as a client sends it. Everything is optional; absent
/// fields apply no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingSearch {
    /// "City" or "City, State".
    pub location: Option<String>,
    /// "Any", "N+" or an exact count.
    pub bed: Option<String>,
    /// Same grammar as `bed`.
    pub bath: Option<String>,
    /// "For Rent" or "For Sale".
    pub rent: Option<String>,

    /// Free-text search over title/description/city/neighborhood.
    pub q: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub property_type: Option<String>,
    /// Bounds on the effective price (applied in process).
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<i64>,
    pub max_bedrooms: Option<i64>,
    pub min_bathrooms: Option<i64>,
    /// Comma-separated amenity names; matches listings sharing at least one.
    pub amenities: Option<String>,
    pub available_only: Option<bool>,
    pub featured_only: Option<bool>,

    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Parse one bed/bath filter value into a predicate over `column`.
///
/// "Any" and empty mean no constraint, "N+" a lower bound, a bare integer an
/// exact match. Anything unparseable is explicitly no constraint - bad
/// filter syntax never rejects a search.
pub fn parse_count_filter(column: &str, raw: &str) -> Option<Predicate> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("any") {
        return None;
    }
    if let Some(prefix) = raw.strip_suffix('+') {
        return prefix
            .trim()
            .parse::<i64>()
            .ok()
            .map(|n| Predicate::Gte(column.to_string(), json!(n)));
    }
    raw.parse::<i64>()
        .ok()
        .map(|n| Predicate::Eq(column.to_string(), json!(n)))
}

/// Predicates for a location string: one comma splits into city + state
/// equality, otherwise the whole trimmed string filters on city alone.
fn location_predicates(raw: &str) -> Vec<Predicate> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() == 2 {
        return vec![
            Predicate::Eq("city".to_string(), json!(parts[0].trim())),
            Predicate::Eq("state".to_string(), json!(parts[1].trim())),
        ];
    }
    let city = raw.trim();
    if city.is_empty() {
        return Vec::new();
    }
    vec![Predicate::Eq("city".to_string(), json!(city))]
}

/// The market filter maps onto the listing-type enum column: "For Rent"
/// admits rent and both, "For Sale" admits sale and both. Anything else is
/// no constraint.
fn market_predicate(raw: &str) -> Option<Predicate> {
    let types = match raw {
        "For Rent" => vec![json!("rent"), json!("both")],
        "For Sale" => vec![json!("sale"), json!("both")],
        _ => return None,
    };
    Some(Predicate::OneOf("property_listing_type".to_string(), types))
}

impl ListingSearch {
    /// Every store-side predicate this search implies. All conjunctive.
    pub fn store_predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(location) = &self.location {
            predicates.extend(location_predicates(location));
        }
        if let Some(bed) = &self.bed {
            predicates.extend(parse_count_filter("bedrooms", bed));
        }
        if let Some(bath) = &self.bath {
            predicates.extend(parse_count_filter("bathrooms", bath));
        }
        if let Some(rent) = &self.rent {
            predicates.extend(market_predicate(rent));
        }

        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            predicates.push(Predicate::AnyIlike(
                TEXT_SEARCH_COLUMNS.iter().map(|c| c.to_string()).collect(),
                q.to_string(),
            ));
        }
        if let Some(city) = &self.city {
            predicates.push(Predicate::Eq("city".to_string(), json!(city)));
        }
        if let Some(state) = &self.state {
            predicates.push(Predicate::Eq("state".to_string(), json!(state)));
        }
        if let Some(property_type) = &self.property_type {
            predicates.push(Predicate::Eq("property_type".to_string(), json!(property_type)));
        }
        if let Some(min_bedrooms) = self.min_bedrooms {
            predicates.push(Predicate::Gte("bedrooms".to_string(), json!(min_bedrooms)));
        }
        if let Some(max_bedrooms) = self.max_bedrooms {
            predicates.push(Predicate::Lte("bedrooms".to_string(), json!(max_bedrooms)));
        }
        if let Some(min_bathrooms) = self.min_bathrooms {
            predicates.push(Predicate::Gte("bathrooms".to_string(), json!(min_bathrooms)));
        }
        if self.available_only == Some(true) {
            predicates.push(Predicate::Eq("is_available".to_string(), json!(true)));
        }
        if self.featured_only == Some(true) {
            predicates.push(Predicate::Eq("is_featured".to_string(), json!(true)));
        }

        predicates
    }

    /// The requested amenity names, trimmed and de-blanked.
    pub fn amenity_list(&self) -> Vec<String> {
        self.amenities
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect()
    }

    /// Whether any filter must run over the fetched snapshot instead of the
    /// store: amenity intersection and effective-price bounds both span data
    /// the store can't express as a single-column predicate.
    pub fn needs_in_process_pass(&self) -> bool {
        !self.amenity_list().is_empty() || self.min_price.is_some() || self.max_price.is_some()
    }

    /// Apply the in-process filters to a fetched snapshot.
    pub fn retain_in_process(&self, listings: &mut Vec<Listing>) {
        let amenities = self.amenity_list();
        if !amenities.is_empty() {
            listings.retain(|listing| {
                amenities
                    .iter()
                    .any(|wanted| listing.amenities.iter().any(|have| have == wanted))
            });
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            listings.retain(|listing| match effective_price(listing) {
                Some(price) => {
                    self.min_price.is_none_or(|min| price >= min)
                        && self.max_price.is_none_or(|max| price <= max)
                }
                None => false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_filter_grammar() {
        assert_eq!(parse_count_filter("bedrooms", "Any"), None);
        assert_eq!(parse_count_filter("bedrooms", ""), None);
        assert_eq!(
            parse_count_filter("bedrooms", "2+"),
            Some(Predicate::Gte("bedrooms".to_string(), json!(2)))
        );
        assert_eq!(
            parse_count_filter("bedrooms", "3"),
            Some(Predicate::Eq("bedrooms".to_string(), json!(3)))
        );
        // Malformed values are no constraint, never an error.
        assert_eq!(parse_count_filter("bedrooms", "lots"), None);
        assert_eq!(parse_count_filter("bedrooms", "x+"), None);
    }

    #[test]
    fn location_splits_on_single_comma() {
        let search = ListingSearch {
            location: Some("Los Angeles, CA".to_string()),
            ..Default::default()
        };
        assert_eq!(
            search.store_predicates(),
            vec![
                Predicate::Eq("city".to_string(), json!("Los Angeles")),
                Predicate::Eq("state".to_string(), json!("CA")),
            ]
        );

        let search = ListingSearch {
            location: Some("  San Francisco ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            search.store_predicates(),
            vec![Predicate::Eq("city".to_string(), json!("San Francisco"))]
        );
    }

    #[test]
    fn market_filter_admits_both() {
        let search = ListingSearch {
            rent: Some("For Rent".to_string()),
            ..Default::default()
        };
        assert_eq!(
            search.store_predicates(),
            vec![Predicate::OneOf(
                "property_listing_type".to_string(),
                vec![json!("rent"), json!("both")]
            )]
        );

        let search = ListingSearch {
            rent: Some("whatever".to_string()),
            ..Default::default()
        };
        assert!(search.store_predicates().is_empty());
    }

    #[test]
    fn blank_and_any_filters_are_noops() {
        let search = ListingSearch {
            location: Some("   ".to_string()),
            bed: Some("Any".to_string()),
            bath: Some("not-a-number".to_string()),
            q: Some("".to_string()),
            ..Default::default()
        };
        assert!(search.store_predicates().is_empty());
    }

    #[test]
    fn amenity_list_trims_and_drops_blanks() {
        let search = ListingSearch {
            amenities: Some(" Pool , , Gym ".to_string()),
            ..Default::default()
        };
        assert_eq!(search.amenity_list(), vec!["Pool", "Gym"]);
        assert!(search.needs_in_process_pass());
    }
}
