//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the top-level crawl loop, including:
//! - Opening the state store and loading or discarding previous state
//! - Choosing where the top-level sweep resumes
//! - Seeding one traversal per remaining alphabet symbol
//! - Final persistence and the crawl report

use crate::config::Config;
use crate::crawler::client::RateLimitedClient;
use crate::crawler::session::Session;
use crate::crawler::traversal::{ExploreOutcome, Traversal};
use crate::state::{Alphabet, CrawlState, Query};
use crate::storage::open_store;
use crate::SweepError;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Final figures for one crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Where the state snapshot was written
    pub state_path: PathBuf,

    /// Distinct strings discovered, across all runs of this crawl
    pub discovered: usize,

    /// Total API calls, across all runs of this crawl
    pub api_calls: u64,

    /// Queries submitted, across all runs of this crawl
    pub visited: usize,

    /// Wall-clock time of this run
    pub elapsed: Duration,

    /// Whether the run stopped on a shutdown request
    pub interrupted: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    client: RateLimitedClient,
    session: Session,
    alphabet: Alphabet,
    start_index: usize,
    shutdown: Option<Arc<AtomicBool>>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fresh` - Whether to ignore previously stored state
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SweepError)` - Failed to initialize, including corrupt stored state
    pub fn new(config: Config, fresh: bool) -> Result<Self, SweepError> {
        let store = open_store(&config.output)?;
        let alphabet = Alphabet::new(&config.crawl.alphabet);

        let state = if fresh {
            tracing::info!("Starting fresh crawl (ignoring previous state)");
            CrawlState::new()
        } else {
            match store.load() {
                Ok(Some(state)) => {
                    tracing::info!(
                        "Loaded progress from {}: {} API calls, {} strings",
                        store.location().display(),
                        state.api_calls(),
                        state.discovered().len()
                    );
                    state
                }
                Ok(None) => {
                    tracing::info!("No previous state found, starting new crawl");
                    CrawlState::new()
                }
                Err(e) => {
                    tracing::error!(
                        "Refusing to start over corrupt state at {}: {}",
                        store.location().display(),
                        e
                    );
                    return Err(e.into());
                }
            }
        };

        let start_index = state.resume_index(&alphabet);
        if start_index > 0 {
            tracing::info!(
                "Resuming top-level sweep at position {} of {}",
                start_index,
                alphabet.len()
            );
        }

        let client = RateLimitedClient::from_config(&config)?;

        Ok(Self {
            config,
            client,
            session: Session::new(state, store),
            alphabet,
            start_index,
            shutdown: None,
        })
    }

    /// Stops the crawl between queries once `flag` is raised
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Alphabet position the top-level sweep starts from
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn state(&self) -> &CrawlState {
        self.session.state()
    }

    /// Runs the crawl to completion (or until shutdown) and saves final state
    ///
    /// 1. Seed one query per alphabet symbol from the resume position
    /// 2. Explore each seed fully before the next
    /// 3. Save the final snapshot and summary
    pub async fn run(&mut self) -> Result<CrawlReport, SweepError> {
        let start_time = Instant::now();
        let mut interrupted = false;

        tracing::info!(
            "Starting exploration of {} from '{}'",
            self.config.endpoint.base_url,
            self.alphabet
                .symbols_from(self.start_index)
                .first()
                .map(char::to_string)
                .unwrap_or_default()
        );

        let mut traversal = Traversal::new(
            &self.client,
            &self.alphabet,
            self.config.endpoint.page_size,
            self.config.crawl.checkpoint_interval,
        );
        if let Some(flag) = &self.shutdown {
            traversal = traversal.with_shutdown(Arc::clone(flag));
        }

        for &symbol in self.alphabet.symbols_from(self.start_index) {
            tracing::info!("Exploring from '{}'", symbol);
            let seed = Query::new(symbol.to_string());

            if traversal.explore(seed, &mut self.session).await? == ExploreOutcome::Interrupted {
                interrupted = true;
                break;
            }
        }

        self.session.checkpoint()?;

        let state = self.session.state();
        let report = CrawlReport {
            state_path: self.session.store().location().to_path_buf(),
            discovered: state.discovered().len(),
            api_calls: state.api_calls(),
            visited: state.visited().len(),
            elapsed: start_time.elapsed(),
            interrupted,
        };

        if interrupted {
            tracing::warn!("Crawl interrupted after {:?}; state saved for resume", report.elapsed);
        } else {
            tracing::info!("Exploration complete in {:?}", report.elapsed);
        }

        Ok(report)
    }
}
