//! JSON file storage implementation
//!
//! The snapshot is a single object with `all_strings`, `visited_queries` and
//! `api_calls`, plus an optional `saved_at` timestamp. Writes go to a sibling
//! temp file that is renamed over the target, so a reader only ever sees a
//! complete snapshot.

use crate::state::{CrawlState, Query};
use crate::storage::summary::write_summary;
use crate::storage::traits::{StateStore, StorageError, StorageResult};
use crate::storage::write_atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// On-disk shape of a snapshot
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    all_strings: Vec<String>,
    visited_queries: Vec<Query>,
    api_calls: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

/// JSON file state store
pub struct JsonStateStore {
    state_path: PathBuf,
    summary_path: PathBuf,
}

impl JsonStateStore {
    /// Creates a store writing the snapshot to `state_path` and the summary to `summary_path`
    pub fn new(state_path: impl Into<PathBuf>, summary_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            summary_path: summary_path.into(),
        }
    }

    /// Timestamp of the stored snapshot, if it recorded one
    pub fn saved_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        Ok(self.read_snapshot()?.and_then(|snapshot| snapshot.saved_at))
    }

    fn read_snapshot(&self) -> StorageResult<Option<Snapshot>> {
        let content = match std::fs::read_to_string(&self.state_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(StorageError::corruption(&self.state_path, e));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::corruption(&self.state_path, e))
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> StorageResult<Option<CrawlState>> {
        Ok(self.read_snapshot()?.map(|snapshot| {
            CrawlState::from_parts(
                snapshot.visited_queries,
                snapshot.all_strings,
                snapshot.api_calls,
            )
        }))
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        let snapshot = Snapshot {
            all_strings: state.discovered().iter().cloned().collect(),
            visited_queries: state.visited().iter().cloned().collect(),
            api_calls: state.api_calls(),
            saved_at: Some(Utc::now()),
        };

        let bytes = serde_json::to_vec(&snapshot)?;
        write_atomic(&self.state_path, &bytes)?;
        write_summary(&self.summary_path, state)?;

        tracing::debug!(
            "Saved {} visited queries and {} strings to {}",
            state.visited().len(),
            state.discovered().len(),
            self.state_path.display()
        );
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.state_path
    }
}
