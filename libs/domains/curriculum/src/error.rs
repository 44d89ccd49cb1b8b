use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("Video not found: {0}")]
    VideoNotFound(Uuid),

    #[error("No opener video is published")]
    OpenerNotFound,

    #[error("Profile not found: {0}")]
    ProfileNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CurriculumResult<T> = Result<T, CurriculumError>;

impl From<CurriculumError> for AppError {
    fn from(err: CurriculumError) -> Self {
        match err {
            CurriculumError::VideoNotFound(id) => {
                AppError::NotFound(format!("Video {} not found", id))
            }
            CurriculumError::OpenerNotFound => {
                AppError::NotFound("No opener video is published".to_string())
            }
            CurriculumError::ProfileNotFound(id) => {
                AppError::NotFound(format!("Profile {} not found", id))
            }
            CurriculumError::Validation(msg) => AppError::BadRequest(msg),
            CurriculumError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CurriculumError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
