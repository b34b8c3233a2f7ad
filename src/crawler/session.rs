//! Crawl session: the state of one crawl plus the store it checkpoints to

use crate::state::CrawlState;
use crate::storage::{StateStore, StorageResult};

/// Owns the mutable state of a single crawl and its persistence boundary
///
/// Both the client (defensive checkpoint before a backoff wait) and the
/// traversal (periodic checkpoint) persist through `checkpoint`, so the store
/// stays the only writer of durable storage.
pub struct Session {
    state: CrawlState,
    store: Box<dyn StateStore>,
    checkpoints: u64,
}

impl Session {
    pub fn new(state: CrawlState, store: Box<dyn StateStore>) -> Self {
        Self {
            state,
            store,
            checkpoints: 0,
        }
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CrawlState {
        &mut self.state
    }

    /// Persists a complete snapshot of the current state
    pub fn checkpoint(&mut self) -> StorageResult<()> {
        self.store.save(&self.state)?;
        self.checkpoints += 1;

        tracing::info!(
            "Progress saved: {} API calls, {} strings",
            self.state.api_calls(),
            self.state.discovered().len()
        );
        Ok(())
    }

    /// Number of checkpoints written by this session
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }
}
