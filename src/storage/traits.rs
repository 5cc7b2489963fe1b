//! Storage traits and error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid archive entry: {0}")]
    InvalidEntry(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Record of completed runs, keyed by the generated instant they processed
///
/// Behaves as a set of instants; the greatest one is the high-water mark.
pub trait TimestampStore {
    /// Returns every readable recorded instant, in no particular order
    fn recorded(&self) -> StorageResult<Vec<DateTime<Utc>>>;

    /// Appends a new recorded instant
    fn record(&mut self, instant: &DateTime<Utc>) -> StorageResult<()>;

    /// Returns the most recent recorded instant, if any
    fn latest(&self) -> StorageResult<Option<DateTime<Utc>>> {
        Ok(self.recorded()?.into_iter().max())
    }
}
