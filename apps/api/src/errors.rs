use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::identity::IdentityError;
use crate::llm_client::GenerateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// Provider rejected the credentials; the message is shown as is.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Not implemented")]
    NotImplemented,
}

impl From<GenerateError> for AppError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::MissingConfiguration => {
                AppError::NotConfigured(GenerateError::MissingConfiguration.to_string())
            }
            GenerateError::RequestFailed(msg) => AppError::Llm(msg),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::MissingConfiguration => {
                AppError::NotConfigured(IdentityError::MissingConfiguration.to_string())
            }
            IdentityError::Rejected(msg) => AppError::Auth(msg),
            IdentityError::Unsupported(_) => AppError::NotImplemented,
            IdentityError::RequestFailed(msg) => AppError::Upstream(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, "AUTH_FAILED", msg.clone()),
            AppError::NotConfigured(msg) => {
                tracing::warn!("Collaborator not configured: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED", msg.clone())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The identity service could not be reached".to_string(),
                )
            }
            AppError::NotImplemented => (
                StatusCode::NOT_IMPLEMENTED,
                "NOT_IMPLEMENTED",
                "This endpoint is not yet implemented".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_errors_map_to_statuses() {
        let cases = [
            (AppError::from(GenerateError::MissingConfiguration), StatusCode::SERVICE_UNAVAILABLE),
            (
                AppError::from(GenerateError::RequestFailed("quota".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::from(IdentityError::Rejected("EMAIL_NOT_FOUND".to_string())),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::from(IdentityError::Unsupported("Federated sign-in")),
                StatusCode::NOT_IMPLEMENTED,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_auth_message_is_verbatim() {
        match AppError::from(IdentityError::Rejected("EMAIL_EXISTS".to_string())) {
            AppError::Auth(msg) => assert_eq!(msg, "EMAIL_EXISTS"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
