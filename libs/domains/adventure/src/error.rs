use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AdventureError {
    #[error("Video not found: {0}")]
    VideoNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AdventureResult<T> = Result<T, AdventureError>;

/// The request URL is dropped from the message before it reaches replies,
/// logs or telemetry.
impl From<reqwest::Error> for AdventureError {
    fn from(err: reqwest::Error) -> Self {
        AdventureError::Embedding(err.without_url().to_string())
    }
}

impl From<AdventureError> for AppError {
    fn from(err: AdventureError) -> Self {
        match err {
            AdventureError::VideoNotFound(id) => {
                AppError::NotFound(format!("Video {} not found", id))
            }
            AdventureError::Validation(msg) => AppError::BadRequest(msg),
            AdventureError::Embedding(message) => AppError::Upstream {
                provider: "gemini",
                message,
            },
            AdventureError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for AdventureError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
