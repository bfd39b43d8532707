//! Error-to-response mapping. Every failure renders `{success: false, message, errors?}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use kitchen_core::error::{DomainError, FieldError};
use kitchen_core::ports::AuthError;
use kitchen_shared::{ErrorResponse, FieldErrorDto};

/// Application-level error type rendered as the shared error body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Detail is logged, never sent.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(message)
            | AppError::BadRequest(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message) => ErrorResponse::new(message.clone()),
            AppError::Validation(errors) => ErrorResponse::new("Validation failed").with_errors(
                errors
                    .iter()
                    .map(|e| FieldErrorDto {
                        field: e.field.clone(),
                        message: e.message.clone(),
                    })
                    .collect(),
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::server_error()
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity } => AppError::NotFound(format!("{} not found", entity)),
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::Forbidden(message) => AppError::Forbidden(message),
            DomainError::UnsupportedMediaType(_) => {
                AppError::BadRequest("Only image files are allowed".to_string())
            }
            DomainError::PayloadTooLarge { limit } => AppError::BadRequest(format!(
                "File too large. Maximum size is {}MB",
                limit / (1024 * 1024)
            )),
            DomainError::Storage(detail) | DomainError::Internal(detail) => {
                AppError::Internal(detail)
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth | AuthError::UnknownPrincipal => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                tracing::warn!(error = %err, "Token verification failed");
                AppError::Unauthorized("Invalid token".to_string())
            }
            AuthError::Backend(detail) => AppError::Internal(detail),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
