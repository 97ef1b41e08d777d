use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use models::errors::ModelError;
use service::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

use crate::observability::{STORE_ERRORS_TOTAL, VALIDATION_REJECTIONS_TOTAL};

/// JSON error response: `{"error": title, "detail": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(detail.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.title.to_string(), detail: self.detail };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => {
                VALIDATION_REJECTIONS_TOTAL.inc();
                JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg))
            }
            ServiceError::DoesNotExist(msg) => JsonApiError::not_found(msg),
            ServiceError::Store(msg) => {
                STORE_ERRORS_TOTAL.inc();
                error!(error = %msg, "store operation failed");
                JsonApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Store Unavailable", Some(msg))
            }
            ServiceError::Model(ModelError::Decode(msg)) => {
                warn!(error = %msg, "stored record could not be decoded");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Corrupt Record", Some(msg))
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(e: JsonRejection) -> Self {
        VALIDATION_REJECTIONS_TOTAL.inc();
        warn!(error = %e.body_text(), "request body rejected");
        JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.body_text()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store unreachable: {0}")]
    Store(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
