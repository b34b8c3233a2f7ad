//! Rate-limited autocomplete client
//!
//! This module handles every request the crawler sends, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Appending the query to the endpoint URL
//! - A fixed pause after every attempt to stay under the request ceiling
//! - Exponential backoff and retry on HTTP 429
//! - Mapping every other failure to an empty suggestion list

use crate::config::Config;
use crate::crawler::backoff::Backoff;
use crate::crawler::session::Session;
use crate::state::Query;
use crate::SweepError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Anything that can answer a query with an ordered list of suggestions
///
/// Implementations count every network attempt on the session's call counter
/// and may checkpoint through the session.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch(&self, query: &Query, session: &mut Session) -> Result<Vec<String>, SweepError>;
}

/// Response body returned by the endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<String>,
}

/// Result of a single attempt
#[derive(Debug)]
pub enum FetchOutcome {
    /// The endpoint answered with suggestions
    Suggestions(AutocompleteResponse),

    /// HTTP 429
    RateLimited,

    /// Transport error, non-2xx status or unreadable body
    Failed {
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client used for endpoint requests
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_millis(config.endpoint.request_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client that paces, retries and counts endpoint calls
pub struct RateLimitedClient {
    http: Client,
    base_url: Url,
    min_interval: Duration,
    backoff: Backoff,
}

impl RateLimitedClient {
    pub fn new(http: Client, base_url: Url, min_interval: Duration, backoff: Backoff) -> Self {
        Self {
            http,
            base_url,
            min_interval,
            backoff,
        }
    }

    /// Creates a client from the crawler configuration
    pub fn from_config(config: &Config) -> Result<Self, SweepError> {
        Ok(Self::new(
            build_http_client(config)?,
            Url::parse(&config.endpoint.base_url)?,
            Duration::from_millis(config.rate_limit.min_interval_ms),
            Backoff::from_config(&config.rate_limit),
        ))
    }

    /// Request URL for a query: the base endpoint with `query=<prefix>` appended
    pub fn query_url(&self, query: &Query) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("query", query.as_str());
        url
    }

    /// Sends one request and classifies the response
    ///
    /// # Classification
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | 2xx with JSON body | Suggestions |
    /// | HTTP 429 | RateLimited |
    /// | Other status | Failed |
    /// | Timeout / connection error | Failed |
    /// | Body is not the expected JSON | Failed |
    pub async fn fetch_once(&self, query: &Query) -> FetchOutcome {
        let response = match self.http.get(self.query_url(query)).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    format!("Connection failed: {}", e)
                } else {
                    e.to_string()
                };
                return FetchOutcome::Failed { error };
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return FetchOutcome::RateLimited;
        }

        if !status.is_success() {
            return FetchOutcome::Failed {
                error: format!("HTTP {}", status),
            };
        }

        match response.json::<AutocompleteResponse>().await {
            Ok(body) => FetchOutcome::Suggestions(body),
            Err(e) => FetchOutcome::Failed {
                error: format!("Invalid response body: {}", e),
            },
        }
    }
}

#[async_trait]
impl SuggestionSource for RateLimitedClient {
    /// Fetches suggestions for `query`, retrying through rate limits
    ///
    /// Every attempt increments the call counter and is followed by the
    /// configured minimum interval. A rate-limited attempt also checkpoints
    /// the session before waiting out the backoff; the query is then retried
    /// until it succeeds or fails for another reason.
    async fn fetch(&self, query: &Query, session: &mut Session) -> Result<Vec<String>, SweepError> {
        let mut backoff = self.backoff.clone();

        loop {
            let outcome = self.fetch_once(query).await;
            session.state_mut().record_call();

            let results = match outcome {
                FetchOutcome::Suggestions(body) => {
                    tracing::debug!(
                        query = %query,
                        count = body.count,
                        "Query '{}': {} results",
                        query,
                        body.results.len()
                    );
                    Some(body.results)
                }
                FetchOutcome::Failed { error } => {
                    tracing::warn!(query = %query, "Error calling API for query '{}': {}", query, error);
                    Some(Vec::new())
                }
                FetchOutcome::RateLimited => {
                    session.checkpoint()?;
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        query = %query,
                        "Rate limit exceeded (hit {}), waiting {:?} before retry",
                        backoff.consecutive(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    None
                }
            };

            tokio::time::sleep(self.min_interval).await;

            if let Some(results) = results {
                return Ok(results);
            }
        }
    }
}
