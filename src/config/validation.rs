use crate::config::types::{
    Config, CrawlConfig, EndpointConfig, OutputConfig, RateLimitConfig, UserAgentConfig,
};
use crate::ConfigError;
use std::collections::{HashMap, HashSet};
use std::path::{Component, PathBuf};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_endpoint_config(&config.endpoint)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates that concurrent crawls write to disjoint files
///
/// Every state and summary path must belong to exactly one crawl; two crawls
/// sharing a file would overwrite each other's snapshots.
pub fn validate_distinct_outputs(configs: &[Config]) -> Result<(), ConfigError> {
    let mut owners: HashMap<PathBuf, usize> = HashMap::new();

    for (index, config) in configs.iter().enumerate() {
        for path in [&config.output.state_path, &config.output.summary_path] {
            if let Some(&other) = owners.get(&normalized(path)) {
                if other != index {
                    return Err(ConfigError::Validation(format!(
                        "crawls {} and {} both write to '{}'",
                        other + 1,
                        index + 1,
                        path
                    )));
                }
            }
            owners.insert(normalized(path), index);
        }
    }

    Ok(())
}

/// Drops `.` components so `./a.json` and `a.json` compare equal
fn normalized(path: &str) -> PathBuf {
    PathBuf::from(path)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Validates the endpoint configuration
fn validate_endpoint_config(config: &EndpointConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.page_size == 0 {
        return Err(ConfigError::Validation(
            "page_size must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates pacing and backoff settings
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.backoff_initial_ms == 0 {
        return Err(ConfigError::Validation(
            "backoff_initial_ms must be >= 1".to_string(),
        ));
    }

    if config.backoff_initial_ms > config.backoff_max_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_initial_ms ({}) cannot exceed backoff_max_ms ({})",
            config.backoff_initial_ms, config.backoff_max_ms
        )));
    }

    Ok(())
}

/// Validates the alphabet and checkpoint cadence
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.alphabet.is_empty() {
        return Err(ConfigError::Validation(
            "alphabet cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for symbol in config.alphabet.chars() {
        if !seen.insert(symbol) {
            return Err(ConfigError::Validation(format!(
                "alphabet contains duplicate symbol '{}'",
                symbol
            )));
        }
    }

    if config.checkpoint_interval == 0 {
        return Err(ConfigError::Validation(
            "checkpoint_interval must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.state_path.is_empty() {
        return Err(ConfigError::Validation(
            "state_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    if config.state_path == config.summary_path {
        return Err(ConfigError::Validation(format!(
            "state_path and summary_path must differ, both are '{}'",
            config.state_path
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}
