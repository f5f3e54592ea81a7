use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::BuyerId;
use crate::kernel::{collections, BaseRecordStore, Direction, JsonObject, StoreQuery};

/// Buyer - a purchase-side account with saved search preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub id: BuyerId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Saved search preferences, schemaless on the wire.
    #[serde(default)]
    pub preferences: JsonObject,
    #[serde(default)]
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update: only supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

/// Structured search preferences a buyer can save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyerPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_cities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_property_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bedrooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bedrooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_amenities: Option<Vec<String>>,
}

impl Buyer {
    pub fn from_row(row: JsonObject) -> Result<Self> {
        serde_json::from_value(Value::Object(row)).context("Malformed buyer row")
    }

    pub async fn list(
        skip: u64,
        limit: u64,
        is_verified: Option<bool>,
        store: &dyn BaseRecordStore,
    ) -> Result<Vec<Self>> {
        let mut query = StoreQuery::new()
            .order("created_at", Direction::Desc)
            .window(skip, limit);
        if let Some(is_verified) = is_verified {
            query = query.eq("is_verified", is_verified);
        }
        let rows = store.select(collections::BUYERS, &query).await?;
        rows.into_iter().map(Self::from_row).collect()
    }

    pub async fn find_by_id(id: &BuyerId, store: &dyn BaseRecordStore) -> Result<Option<Self>> {
        let query = StoreQuery::new().eq("id", id.as_str()).limit(1);
        let mut rows = store.select(collections::BUYERS, &query).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Self::from_row(rows.remove(0)).map(Some)
    }

    pub async fn find_by_email(email: &str, store: &dyn BaseRecordStore) -> Result<Option<Self>> {
        let query = StoreQuery::new().eq("email", email).limit(1);
        let mut rows = store.select(collections::BUYERS, &query).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Self::from_row(rows.remove(0)).map(Some)
    }

    /// Create the buyer profile row for a freshly registered identity. The
    /// id comes from the identity service so the two stay linked.
    pub async fn provision(
        id: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        phone: Option<String>,
        preferences: Option<JsonObject>,
        store: &dyn BaseRecordStore,
    ) -> Result<Self> {
        let now = Utc::now();
        let mut row = JsonObject::new();
        row.insert("id".to_string(), json!(id));
        row.insert("email".to_string(), json!(email));
        row.insert("first_name".to_string(), json!(first_name));
        row.insert("last_name".to_string(), json!(last_name));
        row.insert(
            "full_name".to_string(),
            json!(format!("{} {}", first_name, last_name)),
        );
        row.insert("phone".to_string(), json!(phone));
        row.insert(
            "preferences".to_string(),
            Value::Object(preferences.unwrap_or_default()),
        );
        row.insert("is_verified".to_string(), json!(false));
        row.insert("created_at".to_string(), json!(now));
        row.insert("updated_at".to_string(), json!(now));

        let stored = store.insert(collections::BUYERS, row).await?;
        Self::from_row(stored)
    }

    /// Patch the buyer. When a name component changes, `full_name` is
    /// recomputed from the merged first/last pair.
    pub async fn update(
        id: &BuyerId,
        patch: &BuyerPatch,
        store: &dyn BaseRecordStore,
    ) -> Result<Option<Self>> {
        let mut row = match serde_json::to_value(patch)? {
            Value::Object(map) => map,
            _ => unreachable!("BuyerPatch serializes to an object"),
        };

        if patch.first_name.is_some() || patch.last_name.is_some() {
            if let Some(current) = Self::find_by_id(id, store).await? {
                let first = patch.first_name.as_deref().unwrap_or(&current.first_name);
                let last = patch.last_name.as_deref().unwrap_or(&current.last_name);
                row.insert("full_name".to_string(), json!(format!("{} {}", first, last)));
            }
        }
        row.insert("updated_at".to_string(), json!(Utc::now()));

        let query = StoreQuery::new().eq("id", id.as_str());
        let mut updated = store.update(collections::BUYERS, &query, row).await?;
        if updated.is_empty() {
            return Ok(None);
        }
        Self::from_row(updated.remove(0)).map(Some)
    }

    /// Replace the saved preferences wholesale.
    pub async fn update_preferences(
        id: &BuyerId,
        preferences: &BuyerPreferences,
        store: &dyn BaseRecordStore,
    ) -> Result<bool> {
        let mut row = JsonObject::new();
        row.insert("preferences".to_string(), serde_json::to_value(preferences)?);
        row.insert("updated_at".to_string(), json!(Utc::now()));

        let query = StoreQuery::new().eq("id", id.as_str());
        let updated = store.update(collections::BUYERS, &query, row).await?;
        Ok(!updated.is_empty())
    }

    pub async fn delete(id: &BuyerId, store: &dyn BaseRecordStore) -> Result<bool> {
        let query = StoreQuery::new().eq("id", id.as_str());
        let deleted = store.delete(collections::BUYERS, &query).await?;
        Ok(!deleted.is_empty())
    }

    pub async fn verified(store: &dyn BaseRecordStore) -> Result<Vec<Self>> {
        let query = StoreQuery::new()
            .eq("is_verified", true)
            .order("created_at", Direction::Desc);
        let rows = store.select(collections::BUYERS, &query).await?;
        rows.into_iter().map(Self::from_row).collect()
    }

    pub async fn set_verified(
        id: &BuyerId,
        is_verified: bool,
        store: &dyn BaseRecordStore,
    ) -> Result<bool> {
        let mut row = JsonObject::new();
        row.insert("is_verified".to_string(), json!(is_verified));
        row.insert("updated_at".to_string(), json!(Utc::now()));

        let query = StoreQuery::new().eq("id", id.as_str());
        let updated = store.update(collections::BUYERS, &query, row).await?;
        Ok(!updated.is_empty())
    }
}
