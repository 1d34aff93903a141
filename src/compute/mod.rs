//! Model serving for the CKD risk service
//!
//! Provides the inference side of the service:
//! - Classifier capability traits and JSON model artifacts
//! - A hot-swappable model store
//! - Feature assembly and prediction

pub mod inference;
pub mod model;
pub mod registry;

pub use inference::{ClinicalValue, FeatureVector, Prediction, RequestPayload, FEATURE_NAMES};
pub use model::{Classifier, LoadedModel, ModelArtifact, ModelCapability, ProbabilisticClassifier};
pub use registry::ModelStore;
