//! ckd-risk - Chronic kidney disease risk assessment service.
//!
//! Serves a pre-trained binary classifier over HTTP. A patient record with seven
//! clinical measurements goes in; a CKD probability, a risk tier, a GFR-based
//! stage, the abnormal findings and tier-specific recommendations come out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  HTTP API: /health | /ready | /load-model | /model-info     │
//! │            /predict                                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Assessment: feature assembly | risk tier | CKD stage       │
//! │              key factors | recommendations                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Model store: JSON artifact | capability resolution | swap  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use ckd_risk::config::ServiceConfig;
//!
//! #[tokio::main]
//! async fn main() -> ckd_risk::Result<()> {
//!     let config = ServiceConfig::development();
//!     ckd_risk::run(config).await
//! }
//! ```

pub mod api;
pub mod assessment;
pub mod cli;
pub mod compute;
pub mod config;
pub mod error;
pub mod health;
pub mod observability;
pub mod risk;
pub mod shutdown;

pub use error::{CkdError, Result};

use crate::compute::ModelStore;
use crate::config::ServiceConfig;
use crate::observability::MetricsExporter;
use crate::shutdown::{ShutdownCoordinator, SignalHandler};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Run the CKD risk service until a shutdown signal arrives.
pub async fn run(config: ServiceConfig) -> Result<()> {
    config.validate()?;

    // Initialize observability
    observability::init(&config.observability)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting CKD risk service");

    // The recorder must be in place before the startup load records into it.
    let exporter = if config.observability.metrics_enabled {
        Some(MetricsExporter::install()?)
    } else {
        None
    };

    let store = Arc::new(ModelStore::new(config.server.model_path.clone()));
    load_initial_model(&store);

    if let Some(exporter) = exporter {
        let metrics_addr = config.observability.metrics_addr;
        info!("Starting metrics server on {}", metrics_addr);

        tokio::spawn(async move {
            if let Err(e) = exporter.serve(metrics_addr).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    let coordinator = ShutdownCoordinator::with_timeout(config.shutdown.timeout);

    // Start signal handler in background
    let signal_coordinator = coordinator.clone();
    tokio::spawn(async move {
        SignalHandler::new(signal_coordinator).run().await;
    });

    let mut server = tokio::spawn(api::run_server(
        config.server.clone(),
        store,
        coordinator.clone(),
    ));

    tokio::select! {
        result = &mut server => return join_result(result),
        _ = coordinator.wait_for_shutdown() => {}
    }

    info!("Shutting down CKD risk service gracefully...");

    match tokio::time::timeout(coordinator.timeout(), &mut server).await {
        Ok(result) => join_result(result)?,
        Err(_) => {
            warn!(
                timeout = ?coordinator.timeout(),
                "In-flight requests did not drain in time; aborting server"
            );
            server.abort();
        }
    }

    info!("CKD risk service shutdown complete");
    Ok(())
}

/// Load the configured artifact at startup. A missing model is not fatal;
/// `/load-model` can pick it up later.
fn load_initial_model(store: &ModelStore) -> bool {
    let loaded = store.load();
    if !loaded {
        warn!(
            path = %store.path().display(),
            "Starting server without model. Predictions will fail until a model is loaded"
        );
    }
    loaded
}

fn join_result(
    result: std::result::Result<Result<()>, tokio::task::JoinError>,
) -> Result<()> {
    result.map_err(|e| CkdError::Internal(format!("API server task failed: {}", e)))?
}
