use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::UserId;
use crate::kernel::{collections, BaseRecordStore, Direction, JsonObject, StoreQuery};

/// User - a profile account; hosts own listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub is_verified: bool,
}

/// Partial update: only supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_host: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

impl User {
    pub fn from_row(row: JsonObject) -> Result<Self> {
        serde_json::from_value(Value::Object(row)).context("Malformed profile row")
    }

    pub async fn list(
        skip: u64,
        limit: u64,
        is_host: Option<bool>,
        is_verified: Option<bool>,
        store: &dyn BaseRecordStore,
    ) -> Result<Vec<Self>> {
        let mut query = StoreQuery::new()
            .order("created_at", Direction::Desc)
            .window(skip, limit);
        if let Some(is_host) = is_host {
            query = query.eq("is_host", is_host);
        }
        if let Some(is_verified) = is_verified {
            query = query.eq("is_verified", is_verified);
        }
        let rows = store.select(collections::PROFILES, &query).await?;
        rows.into_iter().map(Self::from_row).collect()
    }

    pub async fn find_by_id(id: &UserId, store: &dyn BaseRecordStore) -> Result<Option<Self>> {
        let query = StoreQuery::new().eq("id", id.as_str()).limit(1);
        let mut rows = store.select(collections::PROFILES, &query).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Self::from_row(rows.remove(0)).map(Some)
    }

    pub async fn find_by_email(email: &str, store: &dyn BaseRecordStore) -> Result<Option<Self>> {
        let query = StoreQuery::new().eq("email", email).limit(1);
        let mut rows = store.select(collections::PROFILES, &query).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Self::from_row(rows.remove(0)).map(Some)
    }

    pub async fn create(new_user: NewUser, store: &dyn BaseRecordStore) -> Result<Self> {
        let now = Utc::now();
        let mut row = match serde_json::to_value(&new_user)? {
            Value::Object(map) => map,
            _ => unreachable!("NewUser serializes to an object"),
        };
        row.insert("id".to_string(), json!(UserId::generate()));
        row.insert("created_at".to_string(), json!(now));
        row.insert("updated_at".to_string(), json!(now));

        let stored = store.insert(collections::PROFILES, row).await?;
        Self::from_row(stored)
    }

    /// Patch the profile. When a name component changes, `full_name` is
    /// recomputed from the merged first/last pair.
    pub async fn update(
        id: &UserId,
        patch: &UserPatch,
        store: &dyn BaseRecordStore,
    ) -> Result<Option<Self>> {
        let mut row = match serde_json::to_value(patch)? {
            Value::Object(map) => map,
            _ => unreachable!("UserPatch serializes to an object"),
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
        let mut updated = store.update(collections::PROFILES, &query, row).await?;
        if updated.is_empty() {
            return Ok(None);
        }
        Self::from_row(updated.remove(0)).map(Some)
    }

    pub async fn delete(id: &UserId, store: &dyn BaseRecordStore) -> Result<bool> {
        let query = StoreQuery::new().eq("id", id.as_str());
        let deleted = store.delete(collections::PROFILES, &query).await?;
        Ok(!deleted.is_empty())
    }

    pub async fn hosts(store: &dyn BaseRecordStore) -> Result<Vec<Self>> {
        let query = StoreQuery::new()
            .eq("is_host", true)
            .order("created_at", Direction::Desc);
        let rows = store.select(collections::PROFILES, &query).await?;
        rows.into_iter().map(Self::from_row).collect()
    }

    pub async fn verified(store: &dyn BaseRecordStore) -> Result<Vec<Self>> {
        let query = StoreQuery::new()
            .eq("is_verified", true)
            .order("created_at", Direction::Desc);
        let rows = store.select(collections::PROFILES, &query).await?;
        rows.into_iter().map(Self::from_row).collect()
    }

    pub async fn set_verified(
        id: &UserId,
        is_verified: bool,
        store: &dyn BaseRecordStore,
    ) -> Result<bool> {
        let mut row = JsonObject::new();
        row.insert("is_verified".to_string(), json!(is_verified));
        row.insert("updated_at".to_string(), json!(Utc::now()));

        let query = StoreQuery::new().eq("id", id.as_str());
        let updated = store.update(collections::PROFILES, &query, row).await?;
        Ok(!updated.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MemoryStore;

    fn new_user(email: &str, is_host: bool) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Theo".to_string(),
            last_name: "Laurence".to_string(),
            full_name: "Theo Laurence".to_string(),
            phone: None,
            avatar_url: None,
            bio: None,
            is_host,
            is_verified: false,
        }
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let store = MemoryStore::new();
        let created = User::create(new_user("theo@example.com", true), &store)
            .await
            .unwrap();

        let fetched = User::find_by_id(&created.id, &store)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.email, "theo@example.com");
        assert!(fetched.is_host);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn hosts_filter_only_returns_hosts() {
        let store = MemoryStore::new();
        User::create(new_user("host@example.com", true), &store)
            .await
            .unwrap();
        User::create(new_user("guest@example.com", false), &store)
            .await
            .unwrap();

        let hosts = User::hosts(&store).await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].email, "host@example.com");
    }
}
