//! Common test utilities for integration tests.

pub mod fixtures;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ckd_risk::api::{router, AppState};
use ckd_risk::compute::ModelStore;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// Re-export common types
pub use fixtures::*;

/// Test environment holding a model directory.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub model_path: PathBuf,
    pub store: Arc<ModelStore>,
}

impl TestEnv {
    /// Environment whose artifact does not exist yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let model_path = temp_dir.path().join("ckd_model.json");
        let store = Arc::new(ModelStore::new(&model_path));

        Self {
            temp_dir,
            model_path,
            store,
        }
    }

    /// Environment serving `artifact`.
    pub fn with_model(artifact: &str) -> Self {
        let env = Self::new();
        env.write_model(artifact);
        assert!(env.store.load(), "fixture artifact failed to load");
        env
    }

    /// Overwrite the artifact on disk without reloading.
    pub fn write_model(&self, artifact: &str) {
        std::fs::write(&self.model_path, artifact).expect("Failed to write model");
    }

    pub fn app(&self) -> Router {
        router(AppState::new(Arc::clone(&self.store)), true)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Send one request through the router and decode the JSON reply.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is not JSON")
    };
    (status, body)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("valid request");
    send(app, request).await
}
