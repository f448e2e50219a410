//! Unified error handling for the server.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use school_portal_core::FieldErrors;
use school_portal_core::wire::ErrorBody;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Payload failed field validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body over the configured limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(errors) => ErrorBody {
                success: false,
                message: "Validation failed".to_string(),
                errors: Some(errors),
            },
            Self::Internal(_) => ErrorBody {
                success: false,
                message: "Internal server error".to_string(),
                errors: None,
            },
            other => ErrorBody {
                success: false,
                message: other.to_string(),
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("missing field".to_string());
        assert_eq!(err.to_string(), "Bad request: missing field");
    }

    #[tokio::test]
    async fn test_validation_maps_to_422_with_fields() {
        let mut errors = FieldErrors::new();
        errors.set("email", Some("Email is invalid".to_string()));

        let (status, body) = body_of(AppError::Validation(errors)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body.success);
        assert_eq!(
            body.errors.unwrap().get("email"),
            Some("Email is invalid")
        );
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let (status, body) = body_of(AppError::Internal("db password wrong".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
    }
}
