//! Crawler module for enumerating autocomplete suggestions
//!
//! This module contains the core crawling logic, including:
//! - Rate-limited endpoint requests with exponential backoff
//! - The prefix-expansion traversal
//! - Session checkpointing
//! - Overall crawl coordination

mod backoff;
mod client;
mod coordinator;
mod session;
mod traversal;

pub use backoff::Backoff;
pub use client::{
    build_http_client, AutocompleteResponse, FetchOutcome, RateLimitedClient, SuggestionSource,
};
pub use coordinator::{Coordinator, CrawlReport};
pub use session::Session;
pub use traversal::{expand, ExploreOutcome, Expansion, Traversal};

use crate::config::{validate_distinct_outputs, Config};
use crate::SweepError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for a single crawl. It will:
/// 1. Open the state store and resume from any saved state
/// 2. Build the rate-limited client
/// 3. Sweep the alphabet, exploring each seed
/// 4. Save final state and the summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Whether to ignore previously stored state
/// * `shutdown` - Raised to stop between queries
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (or stopped cleanly)
/// * `Err(SweepError)` - Crawl failed
pub async fn crawl(
    config: Config,
    fresh: bool,
    shutdown: Arc<AtomicBool>,
) -> Result<CrawlReport, SweepError> {
    let mut coordinator = Coordinator::new(config, fresh)?.with_shutdown(shutdown);
    coordinator.run().await
}

/// Runs independent crawls concurrently, one task per configuration
///
/// Crawls share nothing but the shutdown flag; each writes its own store.
/// Results are returned in the order of `configs`.
///
/// # Returns
///
/// * `Ok(results)` - One result per configuration
/// * `Err(SweepError)` - Two configurations write to the same file; nothing was started
pub async fn crawl_all(
    configs: Vec<Config>,
    fresh: bool,
    shutdown: Arc<AtomicBool>,
) -> Result<Vec<Result<CrawlReport, SweepError>>, SweepError> {
    validate_distinct_outputs(&configs)?;

    let handles: Vec<_> = configs
        .into_iter()
        .map(|config| tokio::spawn(crawl(config, fresh, Arc::clone(&shutdown))))
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(match handle.await {
            Ok(result) => result,
            Err(e) => Err(SweepError::from(e)),
        });
    }
    Ok(results)
}
