// TestDependencies - in-memory implementations for testing
//
// Provides a record store and identity service that can be injected into
// ServerDeps for tests. The store evaluates the same query semantics as the
// hosted dialect: conjunctive predicates, multi-key ordering with nulls
// last, offset/limit windowing, exact counts.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::query::{Direction, JsonObject, OrderBy, Predicate, StoreQuery};
use super::traits::{BaseIdentityService, BaseRecordStore};
use crate::domains::auth::{AuthError, AuthSession, AuthUser};

// =============================================================================
// In-memory record store
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<JsonObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append fixture rows to a collection.
    pub fn seed(&self, collection: &str, rows: Vec<JsonObject>) {
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(rows);
    }

    /// Snapshot of a collection, in insertion order. For test assertions.
    pub fn rows(&self, collection: &str) -> Vec<JsonObject> {
        let collections = self.collections.lock().unwrap();
        collections.get(collection).cloned().unwrap_or_default()
    }
}

fn value_eq(a: &Value, b: &Value) -> bool {
    // Numbers compare across integer/float representations.
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Some(x.cmp(y));
    }
    None
}

fn matches(row: &JsonObject, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Eq(column, value) => row
            .get(column)
            .filter(|v| !v.is_null())
            .is_some_and(|v| value_eq(v, value)),
        Predicate::OneOf(column, values) => row
            .get(column)
            .filter(|v| !v.is_null())
            .is_some_and(|v| values.iter().any(|candidate| value_eq(v, candidate))),
        Predicate::Gte(column, value) => row
            .get(column)
            .and_then(|v| compare_values(v, value))
            .is_some_and(|ordering| ordering != Ordering::Less),
        Predicate::Lte(column, value) => row
            .get(column)
            .and_then(|v| compare_values(v, value))
            .is_some_and(|ordering| ordering != Ordering::Greater),
        Predicate::AnyIlike(columns, needle) => {
            let needle = needle.to_lowercase();
            columns.iter().any(|column| {
                row.get(column)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        }
    }
}

fn matches_all(row: &JsonObject, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|predicate| matches(row, predicate))
}

fn sort_rows(rows: &mut [JsonObject], order: &[OrderBy]) {
    rows.sort_by(|a, b| {
        for key in order {
            let left = a.get(&key.column).filter(|v| !v.is_null());
            let right = b.get(&key.column).filter(|v| !v.is_null());
            let ordering = match (left, right) {
                (None, None) => Ordering::Equal,
                // Nulls last, in either direction.
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => {
                    let ordering = compare_values(x, y).unwrap_or(Ordering::Equal);
                    match key.direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl BaseRecordStore for MemoryStore {
    async fn select(&self, collection: &str, query: &StoreQuery) -> Result<Vec<JsonObject>> {
        let collections = self.collections.lock().unwrap();
        let mut rows: Vec<JsonObject> = collections
            .get(collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(row, &query.predicates))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        sort_rows(&mut rows, &query.order);

        let offset = query.offset.unwrap_or(0) as usize;
        let rows = rows.into_iter().skip(offset);
        Ok(match query.limit {
            Some(limit) => rows.take(limit as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn count(&self, collection: &str, query: &StoreQuery) -> Result<u64> {
        let collections = self.collections.lock().unwrap();
        let count = collections
            .get(collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(row, &query.predicates))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert(&self, collection: &str, row: JsonObject) -> Result<JsonObject> {
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        collection: &str,
        query: &StoreQuery,
        patch: JsonObject,
    ) -> Result<Vec<JsonObject>> {
        let mut collections = self.collections.lock().unwrap();
        let mut updated = Vec::new();
        if let Some(rows) = collections.get_mut(collection) {
            for row in rows.iter_mut() {
                if matches_all(row, &query.predicates) {
                    for (column, value) in &patch {
                        row.insert(column.clone(), value.clone());
                    }
                    updated.push(row.clone());
                }
            }
        }
        Ok(updated)
    }

    async fn delete(&self, collection: &str, query: &StoreQuery) -> Result<Vec<JsonObject>> {
        let mut collections = self.collections.lock().unwrap();
        let mut deleted = Vec::new();
        if let Some(rows) = collections.get_mut(collection) {
            rows.retain(|row| {
                if matches_all(row, &query.predicates) {
                    deleted.push(row.clone());
                    false
                } else {
                    true
                }
            });
        }
        Ok(deleted)
    }
}

// =============================================================================
// Mock identity service
// =============================================================================

#[derive(Debug, Clone)]
struct MockAccount {
    id: String,
    email: String,
    password: String,
}

/// Identity service double. Tokens are transparent (`token-<user id>`,
/// `refresh-<user id>`) so tests can mint them without a sign-in round trip.
#[derive(Default)]
pub struct MockIdentityService {
    accounts: Mutex<Vec<MockAccount>>,
}

impl MockIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts.lock().unwrap().push(MockAccount {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        self
    }

    pub fn account_id(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.email == email)
            .map(|account| account.id.clone())
    }

    pub fn token_for(&self, email: &str) -> Option<String> {
        self.account_id(email).map(|id| format!("token-{}", id))
    }

    fn session_for(account: &MockAccount) -> AuthSession {
        AuthSession {
            access_token: format!("token-{}", account.id),
            refresh_token: format!("refresh-{}", account.id),
            expires_in: 3600,
            user: AuthUser {
                id: account.id.clone(),
                email: Some(account.email.clone()),
            },
        }
    }
}

#[async_trait]
impl BaseIdentityService for MockIdentityService {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|account| account.email == email && account.password == password)
            .map(Self::session_for)
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _metadata: JsonObject,
    ) -> Result<AuthSession, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|account| account.email == email) {
            return Err(AuthError::RegistrationFailed(
                "User already registered".to_string(),
            ));
        }
        let account = MockAccount {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let session = Self::session_for(&account);
        accounts.push(account);
        Ok(session)
    }

    async fn verify_token(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let id = access_token
            .strip_prefix("token-")
            .ok_or(AuthError::InvalidToken)?;
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|account| account.id == id)
            .map(|account| AuthUser {
                id: account.id.clone(),
                email: Some(account.email.clone()),
            })
            .ok_or(AuthError::InvalidToken)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let id = refresh_token
            .strip_prefix("refresh-")
            .ok_or(AuthError::InvalidToken)?;
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|account| account.id == id)
            .map(Self::session_for)
            .ok_or(AuthError::InvalidToken)
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self.verify_token(access_token).await?;
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|account| account.id == user.id)
            .ok_or(AuthError::InvalidToken)?;
        account.password = new_password.to_string();
        Ok(())
    }
}
