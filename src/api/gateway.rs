//! HTTP server for the CKD risk API.

use super::handlers::*;
use crate::compute::ModelStore;
use crate::config::ServerConfig;
use crate::error::{CkdError, Result};
use crate::shutdown::ShutdownCoordinator;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Model served by `/predict` and swapped by `/load-model`.
    pub store: Arc<ModelStore>,
}

impl AppState {
    pub fn new(store: Arc<ModelStore>) -> Self {
        Self { store }
    }
}

/// Build the API router.
pub fn router(state: AppState, cors_enabled: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/load-model", get(load_model))
        .route("/model-info", get(model_info))
        .route("/predict", post(predict))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Run the API server until the coordinator signals shutdown.
pub async fn run_server(
    config: ServerConfig,
    store: Arc<ModelStore>,
    shutdown: ShutdownCoordinator,
) -> Result<()> {
    let app = router(AppState::new(store), config.cors_enabled);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        cors = config.cors_enabled,
        "CKD risk API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait_for_shutdown().await })
        .await
        .map_err(|e| CkdError::Network(e.to_string()))?;

    info!("CKD risk API stopped");
    Ok(())
}
