//! Typed wrappers around the store's opaque string IDs.
//!
//! The hosted record store hands back UUID-formatted strings; wrapping them
//! per entity keeps a `ListingId` from being passed where a `UserId` was
//! expected. New IDs are minted app-side as UUID v4 strings, matching what
//! the store expects on insert.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

/// A typed wrapper around an opaque string ID.
///
/// The type parameter `T` is a marker for the entity the ID belongs to, so
/// IDs of different entities are incompatible at compile time.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T>(String, #[serde(skip)] PhantomData<fn() -> T>);

impl<T> Id<T> {
    /// Mint a fresh ID (UUID v4, string form).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string(), PhantomData)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl<T> From<String> for Id<T> {
    fn from(raw: String) -> Self {
        Self(raw, PhantomData)
    }
}

impl<T> From<&str> for Id<T> {
    fn from(raw: &str) -> Self {
        Self(raw.to_string(), PhantomData)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for listing records.
pub struct ListingEntity;

/// Marker type for user profiles.
pub struct ProfileEntity;

/// Marker type for buyer records.
pub struct BuyerEntity;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for listings.
pub type ListingId = Id<ListingEntity>;

/// Typed ID for user profiles. Listing ownership points at one of these.
pub type UserId = Id<ProfileEntity>;

/// Typed ID for buyers.
pub type BuyerId = Id<BuyerEntity>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_uuid_strings() {
        let id = ListingId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn ids_round_trip_through_serde() {
        let id = ListingId::from("abc-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc-123\"");
        let back: ListingId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
