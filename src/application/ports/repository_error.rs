#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("record not found: {0}")]
    NotFound(String),
    /// Duplicate key, stale attempt number or illegal status change.
    #[error("write rejected: {0}")]
    ConstraintViolation(String),
    #[error("corrupt record: {0}")]
    InvalidRecord(String),
}
