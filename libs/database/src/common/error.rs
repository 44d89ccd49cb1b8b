/// Failures from the connectivity helpers.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Query(#[from] sea_orm::DbErr),

    /// The pool answered but the probe did not succeed
    #[error("Database not ready: {0}")]
    NotReady(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
