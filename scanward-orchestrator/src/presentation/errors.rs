//! Mapping of application errors to HTTP responses

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::application::StartScanError;
use crate::domain::ScanId;
use crate::infrastructure::job_store::JobStoreError;
use crate::presentation::models::ErrorResponse;

/// API error with its HTTP status
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict { message: String, scan_id: ScanId },
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StartScanError> for ApiError {
    fn from(err: StartScanError) -> Self {
        match err {
            StartScanError::InvalidRepoName(_)
            | StartScanError::NoValidTools
            | StartScanError::MissingCredential(_) => Self::BadRequest(err.to_string()),
            StartScanError::AlreadyRunning { ref scan_id } => Self::Conflict {
                scan_id: scan_id.clone(),
                message: err.to_string(),
            },
            StartScanError::Store(store) => store.into(),
            StartScanError::QueueUnavailable(_) => Self::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<JobStoreError> for ApiError {
    fn from(err: JobStoreError) -> Self {
        match err {
            JobStoreError::NotFound(_) => Self::NotFound(err.to_string()),
            JobStoreError::Unavailable(_) => Self::ServiceUnavailable(err.to_string()),
            JobStoreError::Serialization(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = match self {
            Self::Conflict { message, scan_id } => ErrorResponse {
                error: message,
                scan_id: Some(scan_id),
            },
            other => ErrorResponse {
                error: other.to_string(),
                scan_id: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
