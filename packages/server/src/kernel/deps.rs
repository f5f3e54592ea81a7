//! Injected collaborator bundle.
//!
//! Handlers receive one `ServerDeps` instead of reaching for globals; tests
//! swap in the in-memory store and mock identity service from
//! `test_dependencies`.

use std::sync::Arc;

use super::traits::{BaseIdentityService, BaseRecordStore};

#[derive(Clone)]
pub struct ServerDeps {
    store: Arc<dyn BaseRecordStore>,
    identity: Arc<dyn BaseIdentityService>,
}

impl ServerDeps {
    pub fn new(store: Arc<dyn BaseRecordStore>, identity: Arc<dyn BaseIdentityService>) -> Self {
        Self { store, identity }
    }

    pub fn store(&self) -> &dyn BaseRecordStore {
        self.store.as_ref()
    }

    pub fn identity(&self) -> &dyn BaseIdentityService {
        self.identity.as_ref()
    }

    pub fn identity_arc(&self) -> Arc<dyn BaseIdentityService> {
        self.identity.clone()
    }
}
