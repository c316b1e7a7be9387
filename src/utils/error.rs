use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::client::ApiError;
use crate::utils::response::error as error_response;

const UPSTREAM_UNAVAILABLE: &str = "The marketplace API is unavailable.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Marketplace API rejected the request ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    /// Map a client failure, showing the server's message when it sent one
    /// and `fallback` otherwise.
    pub fn from_api(err: ApiError, fallback: &str) -> Self {
        let message = err.user_message(fallback);
        match err.status() {
            Some(401) => AppError::AuthError(message),
            Some(403) => AppError::Forbidden(message),
            Some(404) => AppError::NotFound(message),
            Some(status @ 400..=499) => AppError::Upstream { status, message },
            _ => {
                error!(error = %err, "Marketplace API call failed");
                AppError::ExternalServiceError(message)
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            AppError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Upstream { .. } => "UPSTREAM_REJECTED",
            AppError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
        }
    }

    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ExternalServiceError(msg)
            | AppError::Upstream { message: msg, .. } => msg.clone(),
        }
    }

    fn log(&self) {
        match self {
            AppError::ExternalServiceError(msg) => {
                error!(message = %msg, "Upstream failure");
            }
            other => {
                tracing::debug!(code = other.code(), message = %other.public_message(), "Request rejected");
            }
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::from_api(err, UPSTREAM_UNAVAILABLE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Internal details stay in the logs
        error_response(code, self.public_message(), None, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16, message: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn client_rejections_keep_status_and_message() {
        let err = AppError::from_api(status_error(422, Some("Code expired")), "Transfer failed.");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.public_message(), "Code expired");
        assert_eq!(err.code(), "UPSTREAM_REJECTED");
    }

    #[test]
    fn server_failures_use_the_fallback() {
        let err = AppError::from_api(status_error(500, None), "Transfer failed.");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.public_message(), "Transfer failed.");
    }

    #[test]
    fn auth_statuses_map_to_their_variants() {
        assert!(matches!(
            AppError::from(status_error(401, None)),
            AppError::AuthError(_)
        ));
        assert!(matches!(
            AppError::from(status_error(404, Some("No such ticket"))),
            AppError::NotFound(msg) if msg == "No such ticket"
        ));
    }

    #[test]
    fn transport_failures_become_bad_gateway() {
        let err = AppError::from(ApiError::InvalidBaseUrl("nowhere".into()));
        assert_eq!(err.code(), "EXTERNAL_SERVICE_ERROR");
        assert_eq!(err.public_message(), "The marketplace API is unavailable.");
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
