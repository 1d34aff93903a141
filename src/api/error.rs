//! HTTP error responses for the CKD risk API.

use crate::error::CkdError;
use crate::observability;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// JSON body returned on error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A `CkdError` paired with the status it is reported under.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: CkdError,
}

impl ApiError {
    /// Report `error` with an explicit status.
    pub fn with_status(status: StatusCode, error: CkdError) -> Self {
        Self { status, error }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn error(&self) -> &CkdError {
        &self.error
    }
}

fn status_for_error(e: &CkdError) -> StatusCode {
    if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<CkdError> for ApiError {
    fn from(error: CkdError) -> Self {
        Self {
            status: status_for_error(&error),
            error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind();
        let message = self.error.to_string();

        if self.status.is_client_error() {
            warn!(status = self.status.as_u16(), kind, "{}", message);
        } else {
            error!(status = self.status.as_u16(), kind, "{}", message);
        }
        observability::record_request_error(kind, self.status.as_u16());

        (self.status, Json(ErrorBody { error: message })).into_response()
    }
}
