//! Storage traits and error types
//!
//! This module defines the trait interface for state persistence backends and
//! associated error types.

use crate::state::CrawlState;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored state at {location} is corrupt: {reason}")]
    DataCorruption { location: String, reason: String },
}

impl StorageError {
    pub(crate) fn corruption(location: &Path, reason: impl ToString) -> Self {
        Self::DataCorruption {
            location: location.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for crawl state persistence backends
///
/// A store is the only component that writes durable storage. Every `save`
/// replaces the previous snapshot as a whole and regenerates the summary
/// artifact; no history is kept.
pub trait StateStore: Send {
    /// Reads the last snapshot
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No snapshot has been written yet
    /// * `Ok(Some(state))` - The stored state
    /// * `Err(StorageError::DataCorruption)` - The stored representation is malformed
    fn load(&self) -> StorageResult<Option<CrawlState>>;

    /// Writes a complete snapshot of `state`, then the summary
    fn save(&mut self, state: &CrawlState) -> StorageResult<()>;

    /// Where the snapshot lives, for log messages
    fn location(&self) -> &Path;
}
