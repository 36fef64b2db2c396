//! # Response Envelope and API Errors
//!
//! Every JSON response is `{success, data?, error?, message?}`.

use academy_core::AcademyError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Uniform response body
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Builder: attach an informational message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

/// Handler error, rendered as a failure envelope
#[derive(Debug)]
pub enum ApiError {
    Domain(AcademyError),
    /// Request body could not be read as JSON
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AcademyError> for ApiError {
    fn from(err: AcademyError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Domain(err) => {
                let code = err.status_code();
                if code >= 500 {
                    error!("Request failed: {}", err);
                } else {
                    warn!("Request rejected: {}", err);
                }
                (
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    err.public_message(),
                )
            }
            ApiError::BadRequest(detail) => {
                warn!("Malformed request body: {}", detail);
                (StatusCode::BAD_REQUEST, format!("Invalid request body: {detail}"))
            }
        };

        (status, Json(Envelope::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_skips_empty_fields() {
        let body = serde_json::to_value(Envelope::data(42)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": 42 }));

        let body = serde_json::to_value(Envelope::error("nope")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": false, "error": "nope" }));
    }

    #[test]
    fn test_status_mapping() {
        let response = ApiError::from(AcademyError::InvalidSignature).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(AcademyError::Internal("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
