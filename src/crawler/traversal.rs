//! Prefix-expansion traversal
//!
//! Explores the suggestion space below a root query with an explicit work
//! stack. A query whose response is shorter than the page size is exhausted.
//! A truncated response is expanded in two parts: first the prefix one symbol
//! longer than the query taken from the greatest returned suggestion (the
//! deepest branch already known), then every sibling `query + c` for `c` from
//! that suggestion's next symbol through the end of the alphabet.

use crate::crawler::client::SuggestionSource;
use crate::crawler::session::Session;
use crate::state::{Alphabet, Query};
use crate::SweepError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How an exploration ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreOutcome {
    /// Every reachable query below the root was visited
    Completed,

    /// A shutdown was requested before the stack drained
    Interrupted,
}

/// Queries to explore after a truncated response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The deepest known branch, explored first
    pub deep: Query,

    /// Siblings from the deep branch's symbol onward, in alphabet order
    pub siblings: Vec<Query>,
}

/// Decides what to explore after `query` returned `results`
///
/// Returns `None` when the response was not truncated, or when the greatest
/// suggestion is no longer than the query and so cannot extend it.
pub fn expand(
    query: &Query,
    results: &[String],
    page_size: usize,
    alphabet: &Alphabet,
) -> Option<Expansion> {
    if results.len() < page_size {
        return None;
    }

    let last = results.iter().max()?;
    let depth = query.len();
    let next_symbol = last.chars().nth(depth)?;
    let deep = Query::prefix_of(last, depth + 1)?;

    // Unknown symbols restart the sweep at the top of the alphabet; already
    // visited siblings are then skipped by the visited check.
    let start = alphabet.position(next_symbol).unwrap_or(0);
    let siblings = alphabet
        .symbols_from(start)
        .iter()
        .map(|&symbol| query.extend(symbol))
        .collect();

    Some(Expansion { deep, siblings })
}

/// The traversal engine
pub struct Traversal<'a, S: SuggestionSource + ?Sized> {
    source: &'a S,
    alphabet: &'a Alphabet,
    page_size: usize,
    checkpoint_interval: u64,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<'a, S: SuggestionSource + ?Sized> Traversal<'a, S> {
    pub fn new(
        source: &'a S,
        alphabet: &'a Alphabet,
        page_size: usize,
        checkpoint_interval: u64,
    ) -> Self {
        Self {
            source,
            alphabet,
            page_size,
            checkpoint_interval: checkpoint_interval.max(1),
            shutdown: None,
        }
    }

    /// Stops the traversal between queries once `flag` is raised
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Explores every query reachable from `root`
    ///
    /// Each query is submitted at most once per session: the visited check
    /// runs before any network call. The session is checkpointed whenever
    /// the call counter lands on a multiple of the checkpoint interval.
    pub async fn explore(
        &self,
        root: Query,
        session: &mut Session,
    ) -> Result<ExploreOutcome, SweepError> {
        let mut stack = vec![root];

        while let Some(query) = stack.pop() {
            if self.shutdown_requested() {
                tracing::info!("Shutdown requested, stopping before '{}'", query);
                return Ok(ExploreOutcome::Interrupted);
            }

            if session.state().is_visited(&query) {
                continue;
            }
            session.state_mut().mark_visited(query.clone());

            let results = self.source.fetch(&query, session).await?;
            let added = session.state_mut().record_results(results.iter().cloned());
            tracing::debug!(
                query = %query,
                returned = results.len(),
                new = added,
                "Explored '{}'",
                query
            );

            if session.state().api_calls() % self.checkpoint_interval == 0 {
                session.checkpoint()?;
            }

            if let Some(expansion) = expand(&query, &results, self.page_size, self.alphabet) {
                tracing::trace!(
                    "'{}' truncated, diving into '{}' then {} siblings",
                    query,
                    expansion.deep,
                    expansion.siblings.len()
                );
                // Pushed in reverse so the deep branch pops first and
                // siblings pop in alphabet order after its whole subtree.
                stack.extend(expansion.siblings.into_iter().rev());
                stack.push(expansion.deep);
            }
        }

        Ok(ExploreOutcome::Completed)
    }
}
