use crate::state::{Alphabet, Query};
use std::collections::BTreeSet;

/// The unit of persistence for one crawl
///
/// Holds the visited queries, every distinct suggestion seen so far, and the
/// number of network attempts made. All three only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlState {
    visited: BTreeSet<Query>,
    discovered: BTreeSet<String>,
    api_calls: u64,
}

impl CrawlState {
    /// Creates an empty state for a first run
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a state from its persisted parts
    pub fn from_parts(
        visited: impl IntoIterator<Item = Query>,
        discovered: impl IntoIterator<Item = String>,
        api_calls: u64,
    ) -> Self {
        Self {
            visited: visited.into_iter().collect(),
            discovered: discovered.into_iter().collect(),
            api_calls,
        }
    }

    pub fn is_visited(&self, query: &Query) -> bool {
        self.visited.contains(query)
    }

    /// Marks a query as submitted
    ///
    /// Returns `false` if it had already been visited.
    pub fn mark_visited(&mut self, query: Query) -> bool {
        self.visited.insert(query)
    }

    /// Unions suggestions into the discovered set, returning how many were new
    pub fn record_results<I, S>(&mut self, results: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for value in results {
            if self.discovered.insert(value.into()) {
                added += 1;
            }
        }
        added
    }

    /// Counts one network attempt and returns the new total
    pub fn record_call(&mut self) -> u64 {
        self.api_calls += 1;
        self.api_calls
    }

    pub fn api_calls(&self) -> u64 {
        self.api_calls
    }

    pub fn visited(&self) -> &BTreeSet<Query> {
        &self.visited
    }

    pub fn discovered(&self) -> &BTreeSet<String> {
        &self.discovered
    }

    /// Alphabet position the top-level sweep resumes from
    ///
    /// One past the greatest visited single-symbol query that belongs to the
    /// alphabet, or 0 when none has been visited. Deeper queries are not
    /// consulted; they are skipped later through visited-set membership.
    pub fn resume_index(&self, alphabet: &Alphabet) -> usize {
        self.visited
            .iter()
            .filter_map(Query::single_symbol)
            .filter(|&symbol| alphabet.contains(symbol))
            .max()
            .and_then(|symbol| alphabet.position(symbol))
            .map_or(0, |position| position + 1)
    }
}
