//! Storage module for persisting crawl state
//!
//! This module handles all durable writes for the crawler, including:
//! - The `StateStore` trait and its JSON and SQLite backends
//! - Atomic snapshot replacement
//! - The human-readable summary artifact

mod json;
mod schema;
mod sqlite;
mod summary;
mod traits;

pub use json::JsonStateStore;
pub use sqlite::SqliteStateStore;
pub use summary::{format_summary, write_summary};
pub use traits::{StateStore, StorageError, StorageResult};

use crate::config::{OutputConfig, StorageBackend};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Opens the state store selected by the output configuration
///
/// # Arguments
///
/// * `config` - The output configuration
///
/// # Returns
///
/// * `Ok(Box<dyn StateStore>)` - The opened store
/// * `Err(StorageError)` - Failed to open the backend
pub fn open_store(config: &OutputConfig) -> StorageResult<Box<dyn StateStore>> {
    let store: Box<dyn StateStore> = match config.backend {
        StorageBackend::Json => Box::new(JsonStateStore::new(
            &config.state_path,
            &config.summary_path,
        )),
        StorageBackend::Sqlite => Box::new(SqliteStateStore::new(
            &config.state_path,
            &config.summary_path,
        )?),
    };
    Ok(store)
}

/// Replaces the file at `path` with `contents` in one step
///
/// The bytes are written and synced to a sibling temp file which is then
/// renamed over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp_path = temp_path_for(path);

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp_path, path)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
