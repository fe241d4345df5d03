// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed envelope, portable key, record or bundle
    #[error("Malformed data: {0}")]
    Format(String),

    /// AEAD tag mismatch: wrong key, missing key, corruption or tampering
    #[error("Cannot decrypt: authentication tag mismatch (wrong or missing key?)")]
    Authentication,

    #[error("Refusing to encrypt empty input")]
    EmptyInput,

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Backup blob is {size} bytes, limit is {max}")]
    BackupTooLarge { size: usize, max: usize },

    #[error("Backup sink error: {0}")]
    Backup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// True when the failure means "data exists but the key can't open it",
    /// so callers can point users at key restore rather than data loss.
    pub fn is_key_problem(&self) -> bool {
        matches!(self, CoreError::Authentication)
    }

    /// Storage and sink failures may clear up on retry; data and key
    /// problems never do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::Backup(_) | CoreError::Io(_) | CoreError::Sql(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
