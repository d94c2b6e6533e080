//! Error types for the Entitlement API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nexus_entitlement_core::EntitlementError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized.")]
    Unauthorized,

    #[error("Server configuration error.")]
    ServerMisconfigured,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("An error occurred during expiry check: {0}")]
    ExpiryCheckFailed(#[source] EntitlementError),

    #[error(transparent)]
    Entitlement(#[from] EntitlementError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServerMisconfigured | Self::ExpiryCheckFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Entitlement(e) => match e {
                EntitlementError::Validation(_) => StatusCode::BAD_REQUEST,
                EntitlementError::AccountNotFound => StatusCode::NOT_FOUND,
                EntitlementError::AccountExists(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::ServerMisconfigured => "SERVER_MISCONFIGURED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::ExpiryCheckFailed(_) => "EXPIRY_CHECK_FAILED",
            Self::Entitlement(e) => match e {
                EntitlementError::Validation(_) => "VALIDATION_ERROR",
                EntitlementError::AccountNotFound => "ACCOUNT_NOT_FOUND",
                EntitlementError::AccountExists(_) => "ACCOUNT_EXISTS",
                e if e.is_code_space_exhausted() => "CODE_SPACE_EXHAUSTED",
                EntitlementError::Provisioning(_) => "PROVISIONING_FAILED",
                _ => "INTERNAL_ERROR",
            },
        }
    }

    /// Message returned to the caller; store internals stay in the logs
    fn public_message(&self) -> String {
        match self {
            Self::Entitlement(e) if !e.is_client_error() && !e.is_code_space_exhausted() => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors
        if status.is_server_error() {
            tracing::error!(error = ?self, "Internal API error");
        }

        let body = ErrorResponse {
            error: self.public_message(),
            code: self.error_code(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
