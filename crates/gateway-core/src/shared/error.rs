//! Platform Error Types
//!
//! The crate-boundary error type. Use cases report failures through
//! `UseCaseError` inside a transaction; everything that reaches the HTTP
//! edge is converted into `PlatformError`, whose `IntoResponse` impl emits
//! the gateway's standard error envelope.

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use chrono::Utc;
use utoipa::ToSchema;

use crate::usecase::{TracingContext, UseCaseError};

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate entity: {entity_type} with {field}={value}")]
    Duplicate { entity_type: String, field: String, value: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Scope insufficient: {message}")]
    ScopeInsufficient { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid one-time code: {message}")]
    InvalidCode { message: String },

    #[error("Signup failed: {message}")]
    SignupFailed { message: String },

    #[error("Refresh failed: {message}")]
    RefreshFailed { message: String },

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Upstream identity provider unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Service key missing")]
    ServiceKeyMissing,

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound { entity_type: entity_type.into(), id: id.into() }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate { entity_type: entity_type.into(), field: field.into(), value: value.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Duplicate { entity_type: "Entity".to_string(), field: "unique".to_string(), value: message.into() }
    }

    /// The `UPPER_SNAKE` code carried in the gateway's error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Duplicate { .. } => "BAD_REQUEST",
            Self::Validation { .. } => "BAD_REQUEST",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::ScopeInsufficient { .. } => "SCOPE_INSUFFICIENT",
            Self::Database(_) => "INTERNAL_ERROR",
            Self::Json(_) => "BAD_REQUEST",
            Self::InvalidCredentials => "UNAUTHORIZED",
            Self::InvalidCode { .. } => "INVALID_CODE",
            Self::SignupFailed { .. } => "SIGNUP_FAILED",
            Self::RefreshFailed { .. } => "REFRESH_FAILED",
            Self::TokenExpired => "UNAUTHORIZED",
            Self::InvalidToken { .. } => "UNAUTHORIZED",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::ServiceKeyMissing => "SERVICE_KEY_MISSING",
            Self::RateLimited => "RATE_LIMITED",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } | Self::Validation { .. } | Self::Json(_) | Self::InvalidCode { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized { .. } | Self::InvalidCredentials | Self::TokenExpired | Self::InvalidToken { .. } => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden { .. } | Self::ScopeInsufficient { .. } => StatusCode::FORBIDDEN,
            Self::SignupFailed { .. } | Self::RefreshFailed { .. } => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable { .. } | Self::ServiceKeyMissing => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// The gateway's standard error envelope.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub timestamp: String,
    pub request_id: String,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Server faults never leak the underlying exception text into the response body.
        let message = match &self {
            Self::Database(_) | Self::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let request_id = TracingContext::current()
            .map(|ctx| ctx.correlation_id())
            .unwrap_or_else(|| crate::TsidGenerator::generate());

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

impl From<UseCaseError> for PlatformError {
    fn from(err: UseCaseError) -> Self {
        match err {
            UseCaseError::ValidationError { message, .. } => PlatformError::Validation { message },
            UseCaseError::BusinessRuleViolation { message, .. } => PlatformError::Duplicate {
                entity_type: "Entity".to_string(),
                field: "constraint".to_string(),
                value: message,
            },
            UseCaseError::NotFoundError { message, .. } => {
                PlatformError::NotFound { entity_type: "Entity".to_string(), id: message }
            }
            UseCaseError::ConcurrencyError { message, .. } => PlatformError::Internal { message },
            UseCaseError::CommitError { message, .. } => PlatformError::Internal { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        assert_eq!(PlatformError::forbidden("x").code(), "FORBIDDEN");
        assert_eq!(PlatformError::InvalidCode { message: "x".into() }.code(), "INVALID_CODE");
        assert_eq!(PlatformError::RateLimited.code(), "RATE_LIMITED");
    }

    #[test]
    fn test_internal_errors_hide_message() {
        let err = PlatformError::Internal { message: "leaky detail".to_string() };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
