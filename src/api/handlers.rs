//! CKD risk API request handlers.

use super::error::ApiError;
use super::gateway::AppState;
use crate::assessment::{self, Assessment};
use crate::compute::{LoadedModel, RequestPayload, FEATURE_NAMES};
use crate::error::CkdError;
use crate::health::{HealthResponse, ReadinessResponse};
use crate::observability;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Body of `/model-info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub model_type: String,
    pub model_loaded: bool,
    pub expected_features: Vec<String>,
    pub n_features: usize,
    pub classes: Vec<i64>,
}

impl ModelInfoResponse {
    /// Describe a loaded model.
    pub fn from_model(model: &LoadedModel) -> Self {
        let classifier = model.classifier();
        Self {
            model_type: classifier.model_type().to_string(),
            model_loaded: true,
            expected_features: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            n_features: classifier.n_features(),
            classes: classifier.classes().to_vec(),
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_store(&state.store))
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let readiness = ReadinessResponse::from_store(&state.store);
    let status =
        StatusCode::from_u16(readiness.to_status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    (status, Json(readiness))
}

/// Re-read the artifact. A failed reload keeps the previous model.
pub async fn load_model(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let store = Arc::clone(&state.store);
    let reloaded = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|e| CkdError::Internal(format!("model reload task failed: {}", e)))?;

    debug!(reloaded, "Reload requested");
    Ok(Json(HealthResponse::from_store(&state.store)))
}

pub async fn model_info(State(state): State<AppState>) -> Result<Json<ModelInfoResponse>, ApiError> {
    let model = state
        .store
        .require()
        .map_err(|e| ApiError::with_status(StatusCode::NOT_FOUND, e))?;

    Ok(Json(ModelInfoResponse::from_model(&model)))
}

/// Score one patient record.
///
/// The model check comes before body parsing, so a service without a model
/// answers 500 even to malformed requests.
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Result<Json<Assessment>, ApiError> {
    let model = state.store.require()?;
    let payload = parse_payload(&body)?;

    let start = Instant::now();
    let assessment = assessment::assess(&model, &payload)?;
    let elapsed = start.elapsed();

    let level = assessment.prediction.risk_level;
    observability::record_prediction(level.as_str(), elapsed);
    info!(
        risk_level = level.as_str(),
        probability = assessment.prediction.probability,
        has_ckd = assessment.prediction.has_ckd,
        "Prediction served"
    );

    Ok(Json(assessment))
}

/// Decode a `/predict` body. An absent body or empty object carries no data.
pub(crate) fn parse_payload(body: &[u8]) -> Result<RequestPayload, CkdError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CkdError::EmptyPayload);
    }

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| CkdError::InvalidBody(e.to_string()))?;

    match &value {
        serde_json::Value::Object(map) if map.is_empty() => return Err(CkdError::EmptyPayload),
        serde_json::Value::Object(_) => {}
        serde_json::Value::Null => return Err(CkdError::EmptyPayload),
        other => {
            return Err(CkdError::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_type(other)
            )))
        }
    }

    serde_json::from_value(value).map_err(|e| CkdError::InvalidBody(e.to_string()))
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
