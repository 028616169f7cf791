//! JSON error responses
//!
//! Every error leaves the server as `{"ok": false, "error": "..."}` with a
//! status that tells the caller whether retrying can help.

use crate::push::PushError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request, the caller must fix it
    #[error("{0}")]
    InvalidInput(String),

    /// Push delivery is not configured, only the operator can fix it
    #[error("push delivery not configured")]
    ServiceUnconfigured,

    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnconfigured | ApiError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PushError> for ApiError {
    fn from(err: PushError) -> Self {
        match err {
            PushError::InvalidSubscription => ApiError::InvalidInput("invalid subscription".to_string()),
            PushError::NotConfigured => ApiError::ServiceUnconfigured,
            PushError::Internal(msg) => ApiError::Unexpected(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::ServiceUnconfigured => json!({
                "ok": false,
                "status": status.as_u16(),
                "error": self.to_string(),
            }),
            _ => json!({
                "ok": false,
                "error": self.to_string(),
            }),
        };

        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }

        (status, Json(body)).into_response()
    }
}
