//! Human-readable summary artifact
//!
//! The first line states the total API call count; every following line is
//! one discovered string, sorted lexicographically.

use crate::state::CrawlState;
use crate::storage::traits::StorageResult;
use crate::storage::write_atomic;
use std::path::Path;

/// Formats the summary text for a state
pub fn format_summary(state: &CrawlState) -> String {
    let mut text = format!("Total API calls made: {}\n", state.api_calls());

    // BTreeSet iteration is already sorted
    let strings: Vec<&str> = state.discovered().iter().map(String::as_str).collect();
    text.push_str(&strings.join("\n"));

    text
}

/// Regenerates the summary file for a state
pub fn write_summary(path: &Path, state: &CrawlState) -> StorageResult<()> {
    write_atomic(path, format_summary(state).as_bytes())?;
    Ok(())
}
