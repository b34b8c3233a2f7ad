//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the autocomplete endpoint and
//! exercise the client, traversal and persistence end-to-end.

use prefix_sweep::config::{
    Config, CrawlConfig, EndpointConfig, OutputConfig, RateLimitConfig, StorageBackend,
    UserAgentConfig,
};
use prefix_sweep::crawler::{crawl_all, Coordinator, RateLimitedClient, Session, SuggestionSource};
use prefix_sweep::state::{CrawlState, Query};
use prefix_sweep::storage::{JsonStateStore, SqliteStateStore, StateStore};
use prefix_sweep::SweepError;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const ENDPOINT_PATH: &str = "/v1/autocomplete";

/// Serves sorted prefix matches from a fixed word list, truncated to a page
struct Autocomplete {
    words: Vec<String>,
    page_size: usize,
}

impl Autocomplete {
    fn new(words: &[&str], page_size: usize) -> Self {
        let mut words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        words.sort();
        Self { words, page_size }
    }
}

impl Respond for Autocomplete {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "query")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        let results: Vec<&String> = self
            .words
            .iter()
            .filter(|word| word.starts_with(&query))
            .take(self.page_size)
            .collect();

        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "version": "v1",
            "count": results.len(),
            "results": results,
        }))
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(
    base_url: &str,
    alphabet: &str,
    page_size: usize,
    dir: &Path,
    backend: StorageBackend,
) -> Config {
    Config {
        endpoint: EndpointConfig {
            base_url: format!("{}{}", base_url, ENDPOINT_PATH),
            page_size,
            request_timeout_ms: 2000,
        },
        rate_limit: RateLimitConfig {
            min_interval_ms: 0, // No pacing needed against the mock
            backoff_initial_ms: 1,
            backoff_max_ms: 4,
        },
        crawl: CrawlConfig {
            alphabet: alphabet.to_string(),
            checkpoint_interval: 10,
        },
        output: OutputConfig {
            backend,
            state_path: dir.join("progress.state").display().to_string(),
            summary_path: dir.join("all_strings.txt").display().to_string(),
        },
        user_agent: UserAgentConfig::default(),
    }
}

/// Queries the mock server received, in order
async fn received_queries(mock_server: &MockServer) -> Vec<String> {
    mock_server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "query")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}

fn json_session(dir: &Path) -> Session {
    let store = JsonStateStore::new(dir.join("progress.json"), dir.join("all_strings.txt"));
    Session::new(CrawlState::new(), Box::new(store))
}

const WORDS: &[&str] = &[
    "a", "aa", "aab", "ab", "aba", "abb", "abc", "ac", "b", "ba", "bb", "c", "cab", "cc",
];

#[tokio::test]
async fn test_full_crawl_discovers_every_word() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(Autocomplete::new(WORDS, 3))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), "abc", 3, dir.path(), StorageBackend::Json);

    let mut coordinator = Coordinator::new(config, true).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.discovered, WORDS.len());
    assert_eq!(report.api_calls, 11);
    assert!(!report.interrupted);

    assert_eq!(
        received_queries(&mock_server).await,
        vec!["a", "aa", "ab", "abb", "abc", "ac", "b", "bb", "bc", "c", "cc"]
    );

    // Final state and summary are on disk
    let store = JsonStateStore::new(
        dir.path().join("progress.state"),
        dir.path().join("all_strings.txt"),
    );
    let stored = store.load().unwrap().expect("final state saved");
    assert_eq!(stored.api_calls(), 11);
    assert_eq!(stored.discovered().len(), WORDS.len());

    let summary = std::fs::read_to_string(dir.path().join("all_strings.txt")).unwrap();
    let mut lines = summary.lines();
    assert_eq!(lines.next(), Some("Total API calls made: 11"));
    let mut expected: Vec<&str> = WORDS.to_vec();
    expected.sort();
    assert_eq!(lines.collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn test_full_crawl_with_sqlite_backend() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(Autocomplete::new(WORDS, 3))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        &mock_server.uri(),
        "abc",
        3,
        dir.path(),
        StorageBackend::Sqlite,
    );

    let mut coordinator = Coordinator::new(config, false).unwrap();
    let report = coordinator.run().await.unwrap();

    let store = SqliteStateStore::new(
        dir.path().join("progress.state"),
        dir.path().join("all_strings.txt"),
    )
    .unwrap();
    let stored = store.load().unwrap().expect("final state saved");

    assert_eq!(&stored, coordinator.state());
    assert_eq!(stored.api_calls(), report.api_calls);
}

#[tokio::test]
async fn test_resume_skips_completed_seeds() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(Autocomplete::new(WORDS, 3))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let previous = CrawlState::from_parts(
        ["a", "aa"].map(Query::from),
        ["a", "aa", "aab"].map(String::from),
        2,
    );
    JsonStateStore::new(
        dir.path().join("progress.state"),
        dir.path().join("all_strings.txt"),
    )
    .save(&previous)
    .unwrap();

    let config = create_test_config(&mock_server.uri(), "abc", 3, dir.path(), StorageBackend::Json);
    let mut coordinator = Coordinator::new(config, false).unwrap();
    assert_eq!(coordinator.start_index(), 1);

    let report = coordinator.run().await.unwrap();

    assert_eq!(
        received_queries(&mock_server).await,
        vec!["b", "bb", "bc", "c", "cc"]
    );
    assert_eq!(report.api_calls, 7);
    assert!(coordinator.state().discovered().contains("aab"));
    assert!(coordinator.state().discovered().contains("cab"));
}

#[tokio::test]
async fn test_rate_limit_retries_and_checkpoints() {
    let mock_server = MockServer::start().await;

    // Two throttled responses, then a normal one
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .and(query_param("query", "q"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .and(query_param("query", "q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 2,
            "results": ["quail", "queen"],
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), "q", 10, dir.path(), StorageBackend::Json);
    let client = RateLimitedClient::from_config(&config).unwrap();
    let mut session = json_session(dir.path());

    let results = client.fetch(&Query::new("q"), &mut session).await.unwrap();

    assert_eq!(results, vec!["quail", "queen"]);
    assert_eq!(session.state().api_calls(), 3);
    assert_eq!(session.checkpoints(), 2);
    assert!(dir.path().join("progress.json").exists());
}

#[tokio::test]
async fn test_rate_limit_backoff_waits_between_retries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 0,
            "results": [],
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config =
        create_test_config(&mock_server.uri(), "q", 10, dir.path(), StorageBackend::Json);
    config.rate_limit.backoff_initial_ms = 20;
    config.rate_limit.backoff_max_ms = 40;
    let client = RateLimitedClient::from_config(&config).unwrap();
    let mut session = json_session(dir.path());

    let started = Instant::now();
    client.fetch(&Query::new("q"), &mut session).await.unwrap();

    // 20ms + 40ms + 40ms (capped)
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(session.state().api_calls(), 4);
}

#[tokio::test]
async fn test_server_error_yields_no_suggestions() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), "x", 10, dir.path(), StorageBackend::Json);
    let client = RateLimitedClient::from_config(&config).unwrap();
    let mut session = json_session(dir.path());

    let results = client.fetch(&Query::new("x"), &mut session).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(session.state().api_calls(), 1);
    assert_eq!(session.checkpoints(), 0);
    assert_eq!(received_queries(&mock_server).await, vec!["x"]);
}

#[tokio::test]
async fn test_connection_failure_yields_no_suggestions() {
    // Reserve a port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        &format!("http://{}", addr),
        "x",
        10,
        dir.path(),
        StorageBackend::Json,
    );
    let client = RateLimitedClient::from_config(&config).unwrap();
    let mut session = json_session(dir.path());

    let results = client.fetch(&Query::new("x"), &mut session).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(session.state().api_calls(), 1);
    assert_eq!(session.checkpoints(), 0);
}

#[tokio::test]
async fn test_malformed_body_yields_no_suggestions() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), "x", 10, dir.path(), StorageBackend::Json);
    let client = RateLimitedClient::from_config(&config).unwrap();
    let mut session = json_session(dir.path());

    let results = client.fetch(&Query::new("x"), &mut session).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(session.state().api_calls(), 1);
}

#[tokio::test]
async fn test_min_interval_paces_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(Autocomplete::new(&["xa", "xb"], 10))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config =
        create_test_config(&mock_server.uri(), "x", 10, dir.path(), StorageBackend::Json);
    config.rate_limit.min_interval_ms = 50;
    let client = RateLimitedClient::from_config(&config).unwrap();
    let mut session = json_session(dir.path());

    let started = Instant::now();
    client.fetch(&Query::new("x"), &mut session).await.unwrap();
    client.fetch(&Query::new("xa"), &mut session).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_concurrent_crawls_sharing_a_state_file_are_rejected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(Autocomplete::new(WORDS, 3))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let first = create_test_config(&mock_server.uri(), "a", 3, dir.path(), StorageBackend::Json);
    let mut second =
        create_test_config(&mock_server.uri(), "c", 3, dir.path(), StorageBackend::Json);
    second.output.summary_path = dir.path().join("c_strings.txt").display().to_string();

    let result = crawl_all(vec![first, second], false, Arc::new(AtomicBool::new(false))).await;

    assert!(matches!(result, Err(SweepError::Config(_))));
    assert!(received_queries(&mock_server).await.is_empty());
    assert!(!dir.path().join("progress.state").exists());
}

#[tokio::test]
async fn test_concurrent_crawls_with_separate_files() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(Autocomplete::new(WORDS, 3))
        .mount(&mock_server)
        .await;

    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    let configs = vec![
        create_test_config(&mock_server.uri(), "a", 3, first_dir.path(), StorageBackend::Json),
        create_test_config(&mock_server.uri(), "c", 3, second_dir.path(), StorageBackend::Json),
    ];

    let results = crawl_all(configs, false, Arc::new(AtomicBool::new(false)))
        .await
        .expect("separate files are accepted");

    let reports: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
    // Siblings are drawn from each crawl's own alphabet: "a" then "aa", "c" then "cc"
    assert_eq!(reports[0].api_calls, 2);
    assert_eq!(reports[1].api_calls, 2);

    for (dir, seed) in [(&first_dir, "a"), (&second_dir, "c")] {
        let stored = JsonStateStore::new(
            dir.path().join("progress.state"),
            dir.path().join("all_strings.txt"),
        )
        .load()
        .unwrap()
        .expect("each crawl saves its own state");
        assert_eq!(stored.api_calls(), 2);
        assert!(stored.is_visited(&Query::new(seed)));
    }
}
