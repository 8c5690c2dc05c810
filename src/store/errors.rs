//! Store errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Entity store failures. Never retried here; the HTTP layer maps them to 500.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Could not reach the store or obtain a connection
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Statement failed or returned rows of an unexpected shape
    #[error("Store query failed: {0}")]
    Query(String),

    /// Seed data rejected by the memory store loader
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
}

impl StoreError {
    /// Whether the failure is about connectivity rather than the statement
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_error_classification() {
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_unavailable());
        assert!(!StoreError::from(sqlx::Error::RowNotFound).is_unavailable());
        assert!(!StoreError::from(sqlx::Error::ColumnNotFound("b_id".to_string())).is_unavailable());
    }

    #[test]
    fn test_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Store unavailable: connection refused");
    }
}
