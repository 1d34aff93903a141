//! End-to-end CKD risk assessment.
//!
//! Ties feature assembly, model inference and clinical interpretation into the
//! response served by `/predict` and printed by `ckd-risk predict`.

use crate::compute::inference::{self, value_or_zero, FeatureVector, RequestPayload, FEATURE_NAMES};
use crate::compute::model::LoadedModel;
use crate::error::Result;
use crate::risk::{self, CkdStage, RiskLevel};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Model verdict and its clinical reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub has_ckd: bool,
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub ckd_stage: CkdStage,
}

/// Human-readable findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub key_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Provenance of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentMetadata {
    pub model_version: String,
    pub timestamp: String,
    pub features_used: Vec<String>,
}

/// Complete `/predict` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub prediction: PredictionSummary,
    pub analysis: Analysis,
    pub metadata: AssessmentMetadata,
}

/// Current UTC time at second precision, e.g. `2024-05-01T09:30:00`.
pub fn timestamp_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Run the full request-to-response transformation against `model`.
pub fn assess(model: &LoadedModel, payload: &RequestPayload) -> Result<Assessment> {
    let features = FeatureVector::assemble(payload)?;
    payload.check_auxiliary()?;

    let gfr = value_or_zero(&payload.gfr, "GFR")?;
    let key_factors = risk::key_factors(payload)?;

    let prediction = inference::predict(model, &features)?;
    let risk_level = risk::risk_level(prediction.probability);
    let recommendations = risk::recommendations(risk_level, payload)?;

    Ok(Assessment {
        prediction: PredictionSummary {
            has_ckd: prediction.has_ckd,
            probability: prediction.probability,
            risk_level,
            ckd_stage: risk::ckd_stage(gfr),
        },
        analysis: Analysis {
            key_factors,
            recommendations,
        },
        metadata: AssessmentMetadata {
            model_version: model.version.clone(),
            timestamp: timestamp_now(),
            features_used: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        },
    })
}
