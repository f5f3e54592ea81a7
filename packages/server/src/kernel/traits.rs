// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. Filtering,
// sorting and shaping live in domain code that consumes these traits.
//
// Naming convention: Base* for trait names (e.g., BaseRecordStore)

use anyhow::Result;
use async_trait::async_trait;

use super::query::{JsonObject, StoreQuery};
use crate::domains::auth::{AuthError, AuthSession, AuthUser};

// =============================================================================
// Record Store Trait (Infrastructure - hosted database)
// =============================================================================

/// Generic query interface over the hosted record store.
///
/// One implementation speaks the hosted service's REST dialect; tests inject
/// an in-memory implementation with the same semantics. Callers treat every
/// method as a single atomic operation; the store provides last-write-wins
/// for concurrent mutations of the same row.
#[async_trait]
pub trait BaseRecordStore: Send + Sync {
    /// Fetch rows matching the query, honoring its ordering and window.
    async fn select(&self, collection: &str, query: &StoreQuery) -> Result<Vec<JsonObject>>;

    /// Exact count of rows matching the query's predicates (ordering and
    /// window are ignored).
    async fn count(&self, collection: &str, query: &StoreQuery) -> Result<u64>;

    /// Insert one row and return it as stored.
    async fn insert(&self, collection: &str, row: JsonObject) -> Result<JsonObject>;

    /// Patch every row matching the query's predicates; only the columns
    /// present in `patch` change. Returns the updated rows.
    async fn update(
        &self,
        collection: &str,
        query: &StoreQuery,
        patch: JsonObject,
    ) -> Result<Vec<JsonObject>>;

    /// Delete every row matching the query's predicates and return them.
    async fn delete(&self, collection: &str, query: &StoreQuery) -> Result<Vec<JsonObject>>;
}

// =============================================================================
// Identity Service Trait (Infrastructure - hosted auth)
// =============================================================================

/// Opaque boundary to the hosted identity/credential service.
///
/// The platform never stores or checks credentials itself; every call here is
/// "hand the hosted service a credential, get back a session or a failure".
#[async_trait]
pub trait BaseIdentityService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Register a new identity; `metadata` is attached to the hosted account.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: JsonObject,
    ) -> Result<AuthSession, AuthError>;

    /// Resolve a bearer token to the user it authenticates.
    async fn verify_token(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn update_password(&self, access_token: &str, new_password: &str)
        -> Result<(), AuthError>;
}
