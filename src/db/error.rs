#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
