// Feature Assembly and Prediction

use super::model::{LoadedModel, ModelCapability};
use crate::error::{CkdError, Result};
use serde::{Deserialize, Serialize};

/// Feature columns in the exact order the classifier was trained on.
pub const FEATURE_NAMES: [&str; 7] = [
    "SerumCreatinine",
    "GFR",
    "Itching",
    "FastingBloodSugar",
    "ProteinInUrine",
    "BUNLevels",
    "MuscleCramps",
];

/// A raw clinical value as sent by clients: a number or numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClinicalValue {
    Number(f64),
    Text(String),
    /// Any other JSON type; always rejected when read
    Other(serde_json::Value),
}

impl ClinicalValue {
    /// Parse as a float, naming `field` in the error.
    pub fn to_f64(&self, field: &str) -> Result<f64> {
        match self {
            ClinicalValue::Number(v) => Ok(*v),
            ClinicalValue::Text(s) => s.trim().parse::<f64>().map_err(|_| CkdError::InvalidValue {
                field: field.to_string(),
                reason: format!("could not convert string to float: '{}'", s),
            }),
            ClinicalValue::Other(v) => Err(CkdError::InvalidValue {
                field: field.to_string(),
                reason: format!("expected a number, got {}", v),
            }),
        }
    }
}

impl From<f64> for ClinicalValue {
    fn from(v: f64) -> Self {
        ClinicalValue::Number(v)
    }
}

impl From<&str> for ClinicalValue {
    fn from(s: &str) -> Self {
        ClinicalValue::Text(s.to_string())
    }
}

/// Body of a `/predict` request.
///
/// The seven model features are required at assembly time; the remaining
/// fields only feed the recommendation rules and read as 0 when absent.
/// JSON `null` counts as absent. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    #[serde(rename = "SerumCreatinine", alias = "serumCreatinine", default)]
    pub serum_creatinine: Option<ClinicalValue>,
    #[serde(rename = "GFR", alias = "gfr", default)]
    pub gfr: Option<ClinicalValue>,
    #[serde(rename = "Itching", alias = "itching", default)]
    pub itching: Option<ClinicalValue>,
    #[serde(rename = "FastingBloodSugar", alias = "fastingBloodSugar", default)]
    pub fasting_blood_sugar: Option<ClinicalValue>,
    #[serde(rename = "ProteinInUrine", alias = "proteinInUrine", default)]
    pub protein_in_urine: Option<ClinicalValue>,
    #[serde(rename = "BUNLevels", alias = "bunLevels", default)]
    pub bun_levels: Option<ClinicalValue>,
    #[serde(rename = "MuscleCramps", alias = "muscleCramps", default)]
    pub muscle_cramps: Option<ClinicalValue>,

    #[serde(rename = "systolicBP", default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<ClinicalValue>,
    #[serde(rename = "serumElectrolytesSodium", default, skip_serializing_if = "Option::is_none")]
    pub serum_electrolytes_sodium: Option<ClinicalValue>,
    #[serde(rename = "socioeconomicStatus", default, skip_serializing_if = "Option::is_none")]
    pub socioeconomic_status: Option<ClinicalValue>,
}

impl RequestPayload {
    /// Required feature fields paired with their canonical names, in model order.
    fn features(&self) -> [(&'static str, Option<&ClinicalValue>); 7] {
        [
            (FEATURE_NAMES[0], self.serum_creatinine.as_ref()),
            (FEATURE_NAMES[1], self.gfr.as_ref()),
            (FEATURE_NAMES[2], self.itching.as_ref()),
            (FEATURE_NAMES[3], self.fasting_blood_sugar.as_ref()),
            (FEATURE_NAMES[4], self.protein_in_urine.as_ref()),
            (FEATURE_NAMES[5], self.bun_levels.as_ref()),
            (FEATURE_NAMES[6], self.muscle_cramps.as_ref()),
        ]
    }

    /// Names of required features absent from the payload, in model order.
    pub fn missing_fields(&self) -> Vec<String> {
        self.features()
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Reject non-numeric auxiliary fields; absent ones are fine.
    pub fn check_auxiliary(&self) -> Result<()> {
        let auxiliary = [
            ("systolicBP", &self.systolic_bp),
            ("serumElectrolytesSodium", &self.serum_electrolytes_sodium),
            ("socioeconomicStatus", &self.socioeconomic_status),
        ];
        for (name, value) in auxiliary {
            value_or_zero(value, name)?;
        }
        Ok(())
    }
}

/// Read an optional field, treating absence as 0.
pub fn value_or_zero(value: &Option<ClinicalValue>, field: &str) -> Result<f64> {
    value.as_ref().map_or(Ok(0.0), |v| v.to_f64(field))
}

/// One row of model input, columns in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; 7],
}

impl FeatureVector {
    /// Build the row, failing on any missing or non-numeric feature.
    pub fn assemble(payload: &RequestPayload) -> Result<Self> {
        let missing = payload.missing_fields();
        if !missing.is_empty() {
            return Err(CkdError::MissingFields(missing));
        }

        let mut values = [0.0; 7];
        for (slot, (name, value)) in values.iter_mut().zip(payload.features()) {
            // Presence was checked above.
            if let Some(value) = value {
                *slot = value.to_f64(name)?;
            }
        }
        Ok(Self { values })
    }

    #[cfg(test)]
    pub(crate) fn from_values(values: [f64; 7]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Raw model output for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Discrete prediction is the positive class
    pub has_ckd: bool,
    /// Probability of the positive class, in [0, 1]
    pub probability: f64,
}

/// Score a feature row with the loaded model.
pub fn predict(model: &LoadedModel, features: &FeatureVector) -> Result<Prediction> {
    if let Some(trained) = &model.feature_names {
        if trained.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(CkdError::Prediction(format!(
                "The feature names should match those that were passed during fit: expected [{}], got [{}]",
                trained.join(", "),
                FEATURE_NAMES.join(", ")
            )));
        }
    }

    let row = features.as_slice();
    let probability = match &model.capability {
        ModelCapability::Probabilistic(classifier) => {
            let proba = classifier.predict_proba(row)?;
            match proba.as_slice() {
                [_, positive, ..] => *positive,
                [only] => *only,
                [] => {
                    return Err(CkdError::Prediction(
                        "model returned no class probabilities".to_string(),
                    ))
                }
            }
        }
        ModelCapability::LabelOnly(classifier) => classifier.predict(row)? as f64,
    };

    let label = model.classifier().predict(row)?;

    Ok(Prediction {
        has_ckd: label != 0,
        probability: probability.clamp(0.0, 1.0),
    })
}
