use thiserror::Error;

/// Audit store specific errors
#[derive(Error, Debug)]
pub enum AuditStoreError {
    /// Referenced audit record does not exist
    #[error("audit record not found: {row_key}")]
    NotFound { row_key: String },

    /// Underlying store I/O failure
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, AuditStoreError>;
