//! Output module for crawl statistics and reports
//!
//! This module handles:
//! - Computing statistics from stored crawl state
//! - Printing statistics and final crawl reports
//! - Regenerating the summary artifact from stored state

pub mod stats;

pub use stats::{compute_statistics, print_report, print_statistics, CrawlStatistics};

use crate::config::OutputConfig;
use crate::storage::{open_store, write_summary};
use crate::SweepError;
use std::path::Path;

/// Loads the stored state for an output configuration and computes its statistics
///
/// # Returns
///
/// * `Ok(Some(CrawlStatistics))` - Statistics for the stored state
/// * `Ok(None)` - No state has been stored yet
/// * `Err(SweepError)` - The store could not be opened or is corrupt
pub fn load_statistics(config: &OutputConfig) -> Result<Option<CrawlStatistics>, SweepError> {
    let store = open_store(config)?;
    Ok(store.load()?.as_ref().map(compute_statistics))
}

/// Regenerates the summary file from the stored state
///
/// # Returns
///
/// * `Ok(true)` - Summary written
/// * `Ok(false)` - No state has been stored yet
pub fn export_summary(config: &OutputConfig) -> Result<bool, SweepError> {
    let store = open_store(config)?;
    let Some(state) = store.load()? else {
        return Ok(false);
    };

    write_summary(Path::new(&config.summary_path), &state)?;
    Ok(true)
}
