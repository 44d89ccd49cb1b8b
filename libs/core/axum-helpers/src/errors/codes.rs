//! Error codes carried in every [`ErrorResponse`](super::ErrorResponse).
//!
//! Each code has a SCREAMING_SNAKE_CASE identifier for clients, an integer for
//! logs and dashboards, and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::PaymentRequired;
//! assert_eq!(code.as_str(), "PAYMENT_REQUIRED");
//! assert_eq!(code.code(), 1010);
//! ```
//!
//! Ranges:
//! - 1000-1999: client errors
//! - 2000-2999: database errors
//! - 3000-3999: upstream provider errors (payments, media, embeddings)
//! - 5000-5999: serialization errors

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors
    ValidationError,
    InvalidUuid,
    JsonExtraction,
    NotFound,
    BadRequest,
    Unauthorized,
    Forbidden,
    Conflict,
    UnprocessableEntity,
    /// Caller is authenticated but has not purchased access
    PaymentRequired,
    InternalError,
    ServiceUnavailable,

    // Database errors
    DatabaseNotFound,
    DatabaseError,
    DatabaseUnavailable,

    // Upstream providers
    UpstreamError,
    /// Webhook payload failed signature verification
    InvalidSignature,

    // Serialization
    SerdeJsonError,
}

impl ErrorCode {
    /// Identifier for programmatic handling on the client.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Integer code for structured logs.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Unauthorized => 1006,
            Self::Forbidden => 1007,
            Self::Conflict => 1008,
            Self::UnprocessableEntity => 1009,
            Self::PaymentRequired => 1010,
            Self::ServiceUnavailable => 1011,
            Self::BadRequest => 1012,

            Self::DatabaseNotFound => 2001,
            Self::DatabaseError => 2003,
            Self::DatabaseUnavailable => 2013,

            Self::UpstreamError => 3001,
            Self::InvalidSignature => 3002,

            Self::SerdeJsonError => 5001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::BadRequest => "Bad request",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Access forbidden",
            Self::Conflict => "Resource already exists",
            Self::UnprocessableEntity => "Request cannot be processed",
            Self::PaymentRequired => "Access Denied: Payment Required",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseNotFound => "Database record not found",
            Self::DatabaseError => "Database error occurred",
            Self::DatabaseUnavailable => "Database is temporarily unavailable",
            Self::UpstreamError => "An upstream provider returned an error",
            Self::InvalidSignature => "Webhook signature verification failed",
            Self::SerdeJsonError => "JSON serialization error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
