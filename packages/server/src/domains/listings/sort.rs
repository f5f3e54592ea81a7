//! Sort resolution.
//!
//! Client sort keys map onto store columns except for `price`: price spans
//! two physical columns (plus a legacy third), so the pipeline computes an
//! effective price per record and sorts the fetched snapshot in process.

use std::cmp::Ordering;

use super::models::Listing;
use crate::kernel::Direction;

/// A resolved sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price,
    Bedrooms,
    Bathrooms,
    SquareFeet,
    Rating,
    CreatedAt,
}

impl SortKey {
    /// Unknown or absent keys fall back to `created_at`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("price") => SortKey::Price,
            Some("bedrooms") => SortKey::Bedrooms,
            Some("bathrooms") => SortKey::Bathrooms,
            Some("square_feet") => SortKey::SquareFeet,
            Some("rating") => SortKey::Rating,
            _ => SortKey::CreatedAt,
        }
    }

    /// The store column to order by, or `None` for the computed price key.
    pub fn column(&self) -> Option<&'static str> {
        match self {
            SortKey::Price => None,
            SortKey::Bedrooms => Some("bedrooms"),
            SortKey::Bathrooms => Some("bathrooms"),
            SortKey::SquareFeet => Some("square_feet"),
            SortKey::Rating => Some("rating"),
            SortKey::CreatedAt => Some("created_at"),
        }
    }
}

/// "asc"/"desc", case-insensitive; anything else is descending.
pub fn parse_direction(raw: Option<&str>) -> Direction {
    match raw {
        Some(raw) if raw.eq_ignore_ascii_case("asc") => Direction::Asc,
        _ => Direction::Desc,
    }
}

/// The single comparable price of a listing: sale price, else monthly rent,
/// else the legacy nightly rate.
pub fn effective_price(listing: &Listing) -> Option<f64> {
    listing
        .price_for_sale
        .or(listing.price_per_month)
        .or(listing.price_per_night)
}

/// Sort a snapshot by effective price. Records with no resolvable price are
/// dropped outright (not pinned to zero or infinity); ties keep their fetch
/// order thanks to the stable sort.
pub fn sort_by_effective_price(listings: &mut Vec<Listing>, direction: Direction) {
    listings.retain(|listing| effective_price(listing).is_some());
    listings.sort_by(|a, b| {
        let ordering = effective_price(a)
            .partial_cmp(&effective_price(b))
            .unwrap_or(Ordering::Equal);
        match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
}

/// In-process ordering for the store-backed keys, used when another filter
/// already forced the pipeline to fetch the full snapshot.
pub fn sort_by_key(listings: &mut [Listing], key: SortKey, direction: Direction) {
    listings.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Price => effective_price(a)
                .partial_cmp(&effective_price(b))
                .unwrap_or(Ordering::Equal),
            SortKey::Bedrooms => a.bedrooms.cmp(&b.bedrooms),
            SortKey::Bathrooms => a.bathrooms.cmp(&b.bathrooms),
            SortKey::SquareFeet => a.square_feet.cmp(&b.square_feet),
            SortKey::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
}
