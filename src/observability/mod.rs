//! Observability module for the CKD risk service.
//!
//! Provides logging and Prometheus metrics.

use crate::config::ObservabilityConfig;
use crate::error::{CkdError, Result};
use metrics::{counter, gauge, histogram};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging. `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| CkdError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| CkdError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!("Observability initialized");
    Ok(())
}

/// Installed metrics recorder plus the means to serve it.
///
/// Install before anything records, so the startup model load is counted.
pub struct MetricsExporter {
    #[cfg(feature = "prometheus")]
    handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsExporter {
    /// Install the global Prometheus recorder and register standard metrics.
    #[cfg(feature = "prometheus")]
    pub fn install() -> Result<Self> {
        use metrics_exporter_prometheus::PrometheusBuilder;

        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| CkdError::Internal(format!("Failed to install metrics recorder: {}", e)))?;

        register_metrics();
        Ok(Self { handle })
    }

    /// Metrics export needs the `prometheus` feature.
    #[cfg(not(feature = "prometheus"))]
    pub fn install() -> Result<Self> {
        tracing::warn!("Metrics enabled but the `prometheus` feature is not compiled in");
        Ok(Self {})
    }

    /// Current metrics in Prometheus text format.
    #[cfg(feature = "prometheus")]
    pub fn render(&self) -> String {
        self.handle.render()
    }

    #[cfg(not(feature = "prometheus"))]
    pub fn render(&self) -> String {
        String::new()
    }

    /// Serve `/metrics` on `addr` until the process exits.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        use tokio::net::TcpListener;

        let exporter = Arc::new(self);
        let app = axum::Router::new().route(
            "/metrics",
            axum::routing::get(move || {
                let exporter = Arc::clone(&exporter);
                async move { exporter.render() }
            }),
        );

        let listener = TcpListener::bind(addr).await?;
        info!(addr = %addr, "Metrics server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| CkdError::Network(e.to_string()))?;

        Ok(())
    }
}

/// Register standard counters so they appear before the first event.
///
/// `ckd_model_loaded` is left to the load path.
pub fn register_metrics() {
    counter!("ckd_model_loads_total").absolute(0);
    counter!("ckd_predictions_total").absolute(0);
    counter!("ckd_request_errors_total").absolute(0);
}

/// Record the outcome of a model load attempt.
pub fn record_model_load(outcome: &'static str, loaded: bool) {
    counter!("ckd_model_loads_total", "outcome" => outcome).increment(1);
    gauge!("ckd_model_loaded").set(if loaded { 1.0 } else { 0.0 });
}

/// Record a successful prediction.
pub fn record_prediction(risk_level: &'static str, elapsed: Duration) {
    counter!("ckd_predictions_total", "risk_level" => risk_level).increment(1);
    histogram!("ckd_prediction_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record a request that ended in an error response.
pub fn record_request_error(kind: &'static str, status: u16) {
    counter!(
        "ckd_request_errors_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
}
