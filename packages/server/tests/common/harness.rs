//! Test harness: the real router wired to the in-memory store and the mock
//! identity service, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use server_core::kernel::test_dependencies::{MemoryStore, MockIdentityService};
use server_core::kernel::ServerDeps;
use server_core::server::build_app;
use tower::ServiceExt;

pub struct TestHarness {
    app: Router,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<MockIdentityService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_identity(MockIdentityService::new())
    }

    pub fn with_identity(identity: MockIdentityService) -> Self {
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(identity);
        let deps = ServerDeps::new(store.clone(), identity.clone());
        let app = build_app(deps, &["http://localhost:3000".to_string()]);
        Self {
            app,
            store,
            identity,
        }
    }

    async fn run(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.run(request).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(path)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.run(request).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.run(request).await
    }

    pub async fn post_json_with_token(
        &self,
        path: &str,
        body: &Value,
        token: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.run(request).await
    }

    pub async fn post_empty_with_token(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.run(request).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.run(request).await
    }

    pub async fn put_empty(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.run(request).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.run(request).await
    }
}
