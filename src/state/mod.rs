//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Query`: a prefix submitted to the endpoint
//! - `Alphabet`: the ordered symbols queries are built from
//! - `CrawlState`: visited queries, discovered strings and the call counter

mod crawl_state;
mod query;

// Re-export main types
pub use crawl_state::CrawlState;
pub use query::{Alphabet, Query};
