use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::{ListingId, UserId};
use crate::kernel::{collections, BaseRecordStore, JsonObject, StoreQuery};

/// Listing - a property advertised for rent and/or sale
///
/// Mirrors the hosted store's row shape. Optional columns deserialize to
/// zero/empty/false so a sparse legacy row never fails a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub host_id: UserId,

    // Content
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,

    // Classification
    #[serde(default)]
    pub property_type: String,
    #[serde(rename = "property_listing_type", default)]
    pub listing_type: String, // 'rent', 'sale', 'both'

    // Physical attributes
    #[serde(default)]
    pub bedrooms: i64,
    #[serde(default)]
    pub bathrooms: i64,
    #[serde(default)]
    pub square_feet: i64,
    #[serde(default)]
    pub garage_number: Option<i64>,

    // Pricing. A rent listing carries the monthly price, a sale listing the
    // sale price, 'both' carries both. price_per_night survives on rows that
    // predate the split.
    #[serde(default)]
    pub price_per_month: Option<f64>,
    #[serde(default)]
    pub price_for_sale: Option<f64>,
    #[serde(default)]
    pub price_per_night: Option<f64>,

    // Location
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub neighborhood: String,

    // Feature flags
    #[serde(default)]
    pub has_yard: bool,
    #[serde(default)]
    pub has_parking_lot: bool,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,

    // Aggregate metrics
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Enums for type-safe handling of the listing_type column
// =============================================================================

/// Listing type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Rent,
    Sale,
    Both,
}

impl std::fmt::Display for ListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingType::Rent => write!(f, "rent"),
            ListingType::Sale => write!(f, "sale"),
            ListingType::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for ListingType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rent" => Ok(ListingType::Rent),
            "sale" => Ok(ListingType::Sale),
            "both" => Ok(ListingType::Both),
            _ => Err(anyhow::anyhow!("Invalid listing type: {}", s)),
        }
    }
}

// =============================================================================
// Write payloads
// =============================================================================

/// Payload for creating a listing. Identity, rating fields and timestamps
/// are assigned server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub host_id: UserId,
    pub title: String,
    pub description: String,
    pub property_type: String,
    #[serde(rename = "property_listing_type")]
    pub listing_type: ListingType,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub square_feet: i64,
    #[serde(default)]
    pub garage_number: Option<i64>,
    #[serde(default)]
    pub price_per_month: Option<f64>,
    #[serde(default)]
    pub price_for_sale: Option<f64>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub has_yard: bool,
    #[serde(default)]
    pub has_parking_lot: bool,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl NewListing {
    /// A rent listing must carry a monthly price and no sale price, a sale
    /// listing the inverse, 'both' carries both.
    pub fn check_price_invariant(&self) -> std::result::Result<(), String> {
        let (month, sale) = (self.price_per_month.is_some(), self.price_for_sale.is_some());
        let ok = match self.listing_type {
            ListingType::Rent => month && !sale,
            ListingType::Sale => sale && !month,
            ListingType::Both => month && sale,
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "Listing of type '{}' has inconsistent price fields",
                self.listing_type
            ))
        }
    }
}

/// Partial update: only supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(
        rename = "property_listing_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub square_feet: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garage_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_month: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_for_sale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_yard: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_parking_lot: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

// =============================================================================
// Store queries - ALL listing queries live here
// =============================================================================

impl Listing {
    pub fn from_row(row: JsonObject) -> Result<Self> {
        serde_json::from_value(Value::Object(row)).context("Malformed listing row")
    }

    pub async fn find_by_id(
        id: &ListingId,
        store: &dyn BaseRecordStore,
    ) -> Result<Option<Self>> {
        let query = StoreQuery::new().eq("id", id.as_str()).limit(1);
        let mut rows = store.select(collections::LISTINGS, &query).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Self::from_row(rows.remove(0)).map(Some)
    }

    pub async fn find_by_host(host_id: &UserId, store: &dyn BaseRecordStore) -> Result<Vec<Self>> {
        let query = StoreQuery::new()
            .eq("host_id", host_id.as_str())
            .order("created_at", crate::kernel::Direction::Desc);
        let rows = store.select(collections::LISTINGS, &query).await?;
        rows.into_iter().map(Self::from_row).collect()
    }

    pub async fn create(new_listing: NewListing, store: &dyn BaseRecordStore) -> Result<Self> {
        let now = Utc::now();
        let mut row = match serde_json::to_value(&new_listing)? {
            Value::Object(map) => map,
            _ => unreachable!("NewListing serializes to an object"),
        };
        row.insert("id".to_string(), json!(ListingId::generate()));
        row.insert("rating".to_string(), json!(0.0));
        row.insert("review_count".to_string(), json!(0));
        row.insert("created_at".to_string(), json!(now));
        row.insert("updated_at".to_string(), json!(now));

        let stored = store.insert(collections::LISTINGS, row).await?;
        Self::from_row(stored)
    }

    /// Patch the listing; `updated_at` always refreshes. `None` when no row
    /// matched the id.
    pub async fn update(
        id: &ListingId,
        patch: &ListingPatch,
        store: &dyn BaseRecordStore,
    ) -> Result<Option<Self>> {
        let mut row = match serde_json::to_value(patch)? {
            Value::Object(map) => map,
            _ => unreachable!("ListingPatch serializes to an object"),
        };
        row.insert("updated_at".to_string(), json!(Utc::now()));

        let query = StoreQuery::new().eq("id", id.as_str());
        let mut updated = store.update(collections::LISTINGS, &query, row).await?;
        if updated.is_empty() {
            return Ok(None);
        }
        Self::from_row(updated.remove(0)).map(Some)
    }

    /// Returns whether a row was actually removed.
    pub async fn delete(id: &ListingId, store: &dyn BaseRecordStore) -> Result<bool> {
        let query = StoreQuery::new().eq("id", id.as_str());
        let deleted = store.delete(collections::LISTINGS, &query).await?;
        Ok(!deleted.is_empty())
    }

    /// Distinct "City, State" strings across all listings, sorted.
    pub async fn cities(store: &dyn BaseRecordStore) -> Result<Vec<String>> {
        let rows = store
            .select(collections::LISTINGS, &StoreQuery::new())
            .await?;
        let mut cities: Vec<String> = rows
            .iter()
            .filter_map(|row| {
                let city = row.get("city").and_then(Value::as_str)?;
                let state = row.get("state").and_then(Value::as_str)?;
                Some(format!("{}, {}", city, state))
            })
            .collect();
        cities.sort();
        cities.dedup();
        Ok(cities)
    }

    /// Distinct property types across all listings, sorted.
    pub async fn property_types(store: &dyn BaseRecordStore) -> Result<Vec<String>> {
        let rows = store
            .select(collections::LISTINGS, &StoreQuery::new())
            .await?;
        let mut types: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get("property_type").and_then(Value::as_str))
            .map(String::from)
            .collect();
        types.sort();
        types.dedup();
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_type_round_trips() {
        for (raw, parsed) in [
            ("rent", ListingType::Rent),
            ("sale", ListingType::Sale),
            ("both", ListingType::Both),
        ] {
            assert_eq!(raw.parse::<ListingType>().unwrap(), parsed);
            assert_eq!(parsed.to_string(), raw);
        }
        assert!("condo".parse::<ListingType>().is_err());
    }

    #[test]
    fn sparse_row_deserializes_with_defaults() {
        let row: JsonObject = serde_json::from_value(json!({
            "id": "l-1",
            "host_id": "h-1",
            "created_at": "2025-06-01T00:00:00Z",
            "updated_at": "2025-06-01T00:00:00Z"
        }))
        .unwrap();
        let listing = Listing::from_row(row).unwrap();
        assert_eq!(listing.bedrooms, 0);
        assert!(listing.is_available);
        assert!(listing.images.is_empty());
        assert!(listing.price_for_sale.is_none());
        assert_eq!(listing.listing_type, "");
    }

    #[test]
    fn price_invariant_by_listing_type() {
        let mut listing = NewListing {
            host_id: "h-1".into(),
            title: "t".into(),
            description: "d".into(),
            property_type: "House".into(),
            listing_type: ListingType::Rent,
            bedrooms: 2,
            bathrooms: 1,
            square_feet: 900,
            garage_number: None,
            price_per_month: Some(2100.0),
            price_for_sale: None,
            city: "Los Angeles".into(),
            state: "CA".into(),
            country: "USA".into(),
            latitude: 34.05,
            longitude: -118.24,
            address: "1 Main St".into(),
            neighborhood: String::new(),
            has_yard: false,
            has_parking_lot: false,
            amenities: vec![],
            images: vec![],
            is_available: true,
            is_featured: false,
        };
        assert!(listing.check_price_invariant().is_ok());

        listing.listing_type = ListingType::Sale;
        assert!(listing.check_price_invariant().is_err());

        listing.price_for_sale = Some(750_000.0);
        listing.price_per_month = None;
        assert!(listing.check_price_invariant().is_ok());

        listing.listing_type = ListingType::Both;
        assert!(listing.check_price_invariant().is_err());
        listing.price_per_month = Some(2100.0);
        assert!(listing.check_price_invariant().is_ok());
    }

    #[test]
    fn patch_serializes_only_supplied_fields() {
        let patch = ListingPatch {
            bedrooms: Some(3),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "bedrooms": 3 }));
    }
}
