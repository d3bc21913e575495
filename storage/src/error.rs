//! Storage error types.
//!
//! Used by the topic repository and by callers that need to tell a missing store from a failed query.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid database url: {0}")]
    InvalidUrl(String),
    #[error("Store closed")]
    Closed,
}
