use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Webhook signature header missing, malformed, stale or not matching
    #[error("{0}")]
    Signature(String),

    #[error("Malformed webhook payload: {0}")]
    Payload(String),

    #[error("Missing metadata")]
    MissingMetadata,

    #[error("Stripe error: {0}")]
    Gateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Gateway(err.to_string())
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Signature(msg) => AppError::BadRequest(format!("Webhook Error: {}", msg)),
            PaymentError::Payload(msg) => AppError::BadRequest(msg),
            PaymentError::MissingMetadata => AppError::BadRequest("Missing metadata".to_string()),
            PaymentError::Gateway(message) => AppError::Upstream {
                provider: "stripe",
                message,
            },
            PaymentError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
