use serde::Deserialize;

/// Main configuration structure for Prefix-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub endpoint: EndpointConfig,
    #[serde(rename = "rate-limit", default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Remote autocomplete endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Base URL; the query is appended as the `query` parameter
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of suggestions the endpoint returns per query.
    /// A response of exactly this length is treated as truncated.
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: usize,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Request pacing and throttling behavior
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Delay after every attempt, successful or not (milliseconds)
    #[serde(rename = "min-interval-ms", default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Wait after the first consecutive HTTP 429 (milliseconds)
    #[serde(rename = "backoff-initial-ms", default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,

    /// Upper bound on the doubling backoff (milliseconds)
    #[serde(rename = "backoff-max-ms", default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

/// Traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Symbols a query may be built from, in sweep order
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// Persist state whenever the call counter is a multiple of this value
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: u64,
}

/// Where crawl state and the summary are written
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Persistence backend for crawl state
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the state snapshot (JSON file or SQLite database)
    #[serde(rename = "state-path")]
    pub state_path: String,

    /// Path to the human-readable summary
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

/// Supported state persistence backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            checkpoint_interval: default_checkpoint_interval(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PrefixSweep".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_min_interval_ms() -> u64 {
    600
}

fn default_backoff_initial_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

fn default_alphabet() -> String {
    "abcdefghijklmnopqrstuvwxyz".to_string()
}

fn default_checkpoint_interval() -> u64 {
    10
}
