use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Asset public id is empty")]
    EmptyPublicId,

    #[error("Invalid link lifetime: {0}")]
    InvalidTtl(String),
}

pub type MediaResult<T> = Result<T, MediaError>;
