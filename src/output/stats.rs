//! Statistics generation from crawl state
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics and final crawl reports.

use crate::crawler::CrawlReport;
use crate::state::CrawlState;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total API calls made
    pub api_calls: u64,

    /// Number of queries submitted
    pub visited_queries: usize,

    /// Number of distinct strings discovered
    pub discovered_strings: usize,

    /// Longest query submitted, in symbols
    pub max_query_depth: usize,

    /// Discovered strings grouped by their first symbol
    pub strings_by_leading_symbol: BTreeMap<char, usize>,

    /// Visited queries grouped by their first symbol
    pub queries_by_leading_symbol: BTreeMap<char, usize>,
}

impl CrawlStatistics {
    /// Average number of new strings per API call
    pub fn yield_per_call(&self) -> f64 {
        if self.api_calls == 0 {
            0.0
        } else {
            self.discovered_strings as f64 / self.api_calls as f64
        }
    }
}

/// Computes statistics for a crawl state
pub fn compute_statistics(state: &CrawlState) -> CrawlStatistics {
    let mut strings_by_leading_symbol = BTreeMap::new();
    for value in state.discovered() {
        if let Some(symbol) = value.chars().next() {
            *strings_by_leading_symbol.entry(symbol).or_insert(0) += 1;
        }
    }

    let mut queries_by_leading_symbol = BTreeMap::new();
    let mut max_query_depth = 0;
    for query in state.visited() {
        max_query_depth = max_query_depth.max(query.len());
        if let Some(symbol) = query.leading_symbol() {
            *queries_by_leading_symbol.entry(symbol).or_insert(0) += 1;
        }
    }

    CrawlStatistics {
        api_calls: state.api_calls(),
        visited_queries: state.visited().len(),
        discovered_strings: state.discovered().len(),
        max_query_depth,
        strings_by_leading_symbol,
        queries_by_leading_symbol,
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total API calls: {}", stats.api_calls);
    println!("  Queries visited: {}", stats.visited_queries);
    println!("  Unique strings: {}", stats.discovered_strings);
    println!("  Deepest query: {} symbols", stats.max_query_depth);
    println!("  Strings per call: {:.2}", stats.yield_per_call());
    println!();

    if !stats.strings_by_leading_symbol.is_empty() {
        println!("By Leading Symbol:");
        for (symbol, strings) in &stats.strings_by_leading_symbol {
            let queries = stats.queries_by_leading_symbol.get(symbol).unwrap_or(&0);
            println!("  {}: {} strings, {} queries", symbol, strings, queries);
        }
        println!();
    }
}

/// Prints the final report of a crawl
pub fn print_report(report: &CrawlReport) {
    if report.interrupted {
        println!("\nExploration interrupted ({})", report.state_path.display());
    } else {
        println!("\nExploration complete! ({})", report.state_path.display());
    }
    println!("Total unique strings found: {}", report.discovered);
    println!("Total API calls made: {}", report.api_calls);
    println!("Queries visited: {}", report.visited);
    println!("Time taken: {:.2} seconds", report.elapsed.as_secs_f64());
}
