//! HTTP API for CKD risk assessment.
//!
//! Routes:
//! - `GET /health` liveness and model state
//! - `GET /ready` readiness, 503 until a model is loaded
//! - `GET /load-model` re-read the model artifact
//! - `GET /model-info` served model description
//! - `POST /predict` risk assessment for one patient record

mod error;
mod gateway;
mod handlers;

pub use error::{ApiError, ErrorBody};
pub use gateway::{router, run_server, AppState};
pub use handlers::ModelInfoResponse;
