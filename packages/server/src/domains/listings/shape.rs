//! Endpoint-facing listing shapes.
//!
//! The same stored record is promised to callers in two shapes: the full
//! record (search results, single-listing lookups) and a card summary with
//! derived display fields (the listings grid). Derivations only ever
//! default; a sparse record can't fail shaping.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::models::{Listing, ListingType};
use super::pipeline::PipelineOutcome;

/// Paginated, ordered result envelope.
///
/// `results` is keyed by listing id and preserves insertion order, but map
/// iteration order is not something every consumer runtime honors - so the
/// sort order is also carried explicitly in `order`.
#[derive(Debug, Serialize)]
pub struct ListingPage<T> {
    pub results: IndexMap<String, T>,
    pub order: Vec<String>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub has_more: bool,
}

impl<T> ListingPage<T> {
    /// Shape a pipeline outcome, keeping its ordering.
    pub fn from_outcome(outcome: PipelineOutcome, shape: impl Fn(&Listing) -> T) -> Self {
        let mut results = IndexMap::with_capacity(outcome.listings.len());
        let mut order = Vec::with_capacity(outcome.listings.len());
        for listing in &outcome.listings {
            let id = listing.id.to_string();
            order.push(id.clone());
            results.insert(id, shape(listing));
        }
        ListingPage {
            results,
            order,
            page: outcome.page,
            limit: outcome.limit,
            total: outcome.total,
            has_more: outcome.has_more,
        }
    }
}

/// Card summary of a listing, as the listings grid renders it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCard {
    pub id: String,
    pub status: String,
    pub address: String,
    pub location: String,
    pub sqft: i64,
    pub garages: i64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub agent: String,
    #[serde(rename = "listingAge")]
    pub listing_age: String,
    pub price: f64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub listing_type: String,
    pub price_for_sale: Option<f64>,
    pub price_per_month: Option<f64>,
    pub has_yard: bool,
    pub has_parking_lot: bool,
}

impl ListingCard {
    pub fn from_listing(listing: &Listing, now: DateTime<Utc>) -> Self {
        ListingCard {
            id: listing.id.to_string(),
            status: status_label(&listing.listing_type).to_string(),
            address: listing.address.clone(),
            location: location_label(&listing.city, &listing.state),
            sqft: listing.square_feet,
            garages: listing.garage_number.unwrap_or(0),
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            agent: listing.host_id.to_string(),
            listing_age: listing_age(listing.created_at, now),
            price: display_price(listing),
            image_url: primary_image(listing),
            listing_type: listing.listing_type.clone(),
            price_for_sale: listing.price_for_sale,
            price_per_month: listing.price_per_month,
            has_yard: listing.has_yard,
            has_parking_lot: listing.has_parking_lot,
        }
    }
}

/// Display label for a raw listing-type value; unknown values read as sales.
pub fn status_label(listing_type: &str) -> &'static str {
    match listing_type.parse::<ListingType>() {
        Ok(ListingType::Rent) => "For Rent",
        Ok(ListingType::Sale) => "For Sale",
        Ok(ListingType::Both) => "For Sale & Rent",
        Err(_) => "For Sale",
    }
}

/// Always "{city}, {state}", even when one side is empty.
pub fn location_label(city: &str, state: &str) -> String {
    format!("{}, {}", city, state)
}

/// First image, or empty string when the record has none.
pub fn primary_image(listing: &Listing) -> String {
    listing.images.first().cloned().unwrap_or_default()
}

/// The price a card shows: sale price for sales, monthly rent for rentals;
/// 'both' prefers the sale price and falls back to rent. Missing prices
/// default to zero.
pub fn display_price(listing: &Listing) -> f64 {
    match listing.listing_type.parse::<ListingType>() {
        Ok(ListingType::Rent) => listing.price_per_month.unwrap_or(0.0),
        Ok(ListingType::Sale) => listing.price_for_sale.unwrap_or(0.0),
        _ => listing
            .price_for_sale
            .or(listing.price_per_month)
            .unwrap_or(0.0),
    }
}

/// Humanized age of a listing.
pub fn listing_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_days();
    match days {
        d if d <= 0 => "New".to_string(),
        1 => "1 day ago".to_string(),
        d => format!("{} days ago", d),
    }
}
