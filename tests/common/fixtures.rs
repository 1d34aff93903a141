// Test fixtures and data generators for integration tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

/// Canonical feature order.
pub const FEATURES: [&str; 7] = [
    "SerumCreatinine",
    "GFR",
    "Itching",
    "FastingBloodSugar",
    "ProteinInUrine",
    "BUNLevels",
    "MuscleCramps",
];

/// Patient record from the service documentation.
pub fn worked_example() -> Value {
    json!({
        "SerumCreatinine": 2.0,
        "GFR": 40,
        "Itching": 6,
        "FastingBloodSugar": 150,
        "ProteinInUrine": 0.4,
        "BUNLevels": 30,
        "MuscleCramps": 1
    })
}

/// A record with every measurement in the normal range.
pub fn healthy_patient() -> Value {
    json!({
        "SerumCreatinine": 0.9,
        "GFR": 105,
        "Itching": 0,
        "FastingBloodSugar": 90,
        "ProteinInUrine": 0.05,
        "BUNLevels": 12,
        "MuscleCramps": 0
    })
}

/// `payload` with `fields` removed.
pub fn without(mut payload: Value, fields: &[&str]) -> Value {
    if let Some(map) = payload.as_object_mut() {
        for field in fields {
            map.remove(*field);
        }
    }
    payload
}

/// `payload` with `field` set to `value`.
pub fn with(mut payload: Value, field: &str, value: Value) -> Value {
    if let Some(map) = payload.as_object_mut() {
        map.insert(field.to_string(), value);
    }
    payload
}

/// Logistic regression artifact that always predicts `probability`.
pub fn constant_logistic(probability: f64, version: &str) -> String {
    let logit = (probability / (1.0 - probability)).ln();
    json!({
        "kind": "logistic_regression",
        "version": version,
        "feature_names": FEATURES,
        "classes": [0, 1],
        "n_features": 7,
        "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        "intercept": logit
    })
    .to_string()
}

/// Label-only artifact; positive when GFR is below 60.
pub fn gfr_svc() -> String {
    json!({
        "kind": "linear_svc",
        "version": "svc-1",
        "classes": [0, 1],
        "n_features": 7,
        "coefficients": [0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        "intercept": 60.0
    })
    .to_string()
}

/// Artifact trained on a different number of columns.
pub fn narrow_model() -> String {
    json!({
        "kind": "logistic_regression",
        "classes": [0, 1],
        "n_features": 5,
        "coefficients": [0.1, 0.1, 0.1, 0.1, 0.1],
        "intercept": 0.0
    })
    .to_string()
}

/// Path of the bundled sample artifact.
pub fn sample_model_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join("ckd_model.json")
}

/// Deterministic random patient generator for reproducible tests
pub struct PatientGenerator {
    rng: StdRng,
}

impl PatientGenerator {
    /// Creates a new generator with a fixed seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A complete record with plausible clinical ranges
    pub fn patient(&mut self) -> Value {
        json!({
            "SerumCreatinine": self.rng.gen_range(0.5..8.0),
            "GFR": self.rng.gen_range(5.0..120.0),
            "Itching": self.rng.gen_range(0.0..10.0),
            "FastingBloodSugar": self.rng.gen_range(70.0..250.0),
            "ProteinInUrine": self.rng.gen_range(0.0..3.0),
            "BUNLevels": self.rng.gen_range(5.0..80.0),
            "MuscleCramps": self.rng.gen_range(0.0..7.0),
            "systolicBP": self.rng.gen_range(90.0..190.0)
        })
    }
}

impl Default for PatientGenerator {
    fn default() -> Self {
        Self::new(42)
    }
}
