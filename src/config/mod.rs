//! Configuration module for Prefix-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use prefix_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("v1.toml")).unwrap();
//! println!("Sweeping alphabet: {}", config.crawl.alphabet);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, EndpointConfig, OutputConfig, RateLimitConfig, StorageBackend,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_distinct_outputs;
