use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ActivityResult<T> = Result<T, ActivityError>;

impl From<ActivityError> for AppError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::Validation(msg) => AppError::BadRequest(msg),
            ActivityError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ActivityError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
