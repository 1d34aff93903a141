//! Health and readiness checks for the CKD risk service.
//!
//! `/health` always answers while the process is serving requests; `/ready`
//! additionally requires a loaded model, for Kubernetes-style deployments.

use crate::compute::ModelStore;
use serde::{Deserialize, Serialize};

/// Liveness status reported by `/health` and `/load-model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Process is up and serving requests.
    Healthy,
}

/// Body of `/health` and `/load-model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: HealthStatus,
    /// Whether a model is currently loaded.
    pub model_loaded: bool,
}

impl HealthResponse {
    /// Snapshot the store's state.
    pub fn from_store(store: &ModelStore) -> Self {
        Self {
            status: HealthStatus::Healthy,
            model_loaded: store.is_loaded(),
        }
    }
}

/// Readiness check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready to accept predictions.
    pub ready: bool,
    /// Reason if not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Served model type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    /// Served model version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    /// When the served model was loaded (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
}

impl ReadinessResponse {
    /// Create a not-ready response.
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            ready: false,
            reason: Some(reason.into()),
            model_type: None,
            model_version: None,
            loaded_at: None,
        }
    }

    /// Build readiness from the model store.
    pub fn from_store(store: &ModelStore) -> Self {
        match store.current() {
            Some(model) => Self {
                ready: true,
                reason: None,
                model_type: Some(model.model_type().to_string()),
                model_version: Some(model.version.clone()),
                loaded_at: Some(model.loaded_at.to_rfc3339()),
            },
            None => Self::not_ready(format!(
                "Model not loaded from {}",
                store.path().display()
            )),
        }
    }

    /// HTTP status code for this result.
    pub fn to_status_code(&self) -> u16 {
        if self.ready {
            200
        } else {
            503
        }
    }
}
