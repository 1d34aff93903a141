//! Error types for the CKD risk service.
//!
//! This module provides a unified error type [`CkdError`] for all service operations,
//! along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Model availability**: no model has been loaded yet
//! - **Request validation**: required clinical fields are missing or not numeric
//! - **Inference**: the classifier rejected the feature row
//! - **Model loading**: the artifact could not be read or failed validation
//! - **Configuration**: invalid settings or unreadable config files
//!
//! # Example
//!
//! ```rust
//! use ckd_risk::error::{CkdError, Result};
//!
//! fn parse_gfr(raw: &str) -> Result<f64> {
//!     raw.trim()
//!         .parse::<f64>()
//!         .map_err(|e| CkdError::InvalidValue {
//!             field: "GFR".into(),
//!             reason: e.to_string(),
//!         })
//! }
//!
//! assert!(parse_gfr("42.5").is_ok());
//! assert!(parse_gfr("high").unwrap_err().is_client_error());
//! ```

use std::io;
use thiserror::Error;

/// Main error type for CKD risk operations.
#[derive(Error, Debug)]
pub enum CkdError {
    // Request errors
    #[error("Model not loaded. Please ensure {artifact} is at {path}.")]
    ModelUnavailable { artifact: String, path: String },

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid numeric value in form data: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("No data provided")]
    EmptyPayload,

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    // Inference errors
    #[error("Error making prediction: {0}")]
    Prediction(String),

    // Model loading errors
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid model artifact: {0}")]
    InvalidModel(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // External errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl CkdError {
    /// Whether the caller sent a request the service cannot act on.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CkdError::MissingFields(_)
                | CkdError::InvalidValue { .. }
                | CkdError::EmptyPayload
                | CkdError::InvalidBody(_)
        )
    }

    /// Short, stable label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CkdError::ModelUnavailable { .. } => "model_unavailable",
            CkdError::MissingFields(_) => "validation",
            CkdError::InvalidValue { .. } | CkdError::EmptyPayload | CkdError::InvalidBody(_) => {
                "parse"
            }
            CkdError::Prediction(_) => "prediction",
            CkdError::ModelNotFound(_) | CkdError::InvalidModel(_) => "model_load",
            CkdError::Config(_) | CkdError::InvalidConfig { .. } => "config",
            CkdError::Io(_)
            | CkdError::Network(_)
            | CkdError::Internal(_) => "unexpected",
        }
    }
}

/// Result type alias for CKD risk operations.
pub type Result<T> = std::result::Result<T, CkdError>;
