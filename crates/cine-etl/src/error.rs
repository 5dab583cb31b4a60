//! Error types for the ETL service

use thiserror::Error;

/// Result type alias for ETL operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Main error type for the ETL service
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("State backend error: {0}")]
    State(#[from] redis::RedisError),

    #[error("Search engine transport error: {0}")]
    SearchTransport(#[from] reqwest::Error),

    #[error("Search engine returned {status} for {operation}: {body}")]
    SearchRejected {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Bulk write to index '{index}' rejected {failed} of {total} documents")]
    BulkRejected {
        index: &'static str,
        failed: usize,
        total: usize,
    },

    #[error("Corrupt sync state under key '{key}': {reason}")]
    CorruptState { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
