//! Prefix-Sweep main entry point
//!
//! This is the command-line interface for the Prefix-Sweep autocomplete enumerator.

use anyhow::Context;
use clap::Parser;
use prefix_sweep::config::{load_config_with_hash, validate_distinct_outputs, Config};
use prefix_sweep::crawler::crawl_all;
use prefix_sweep::output::{export_summary, load_statistics, print_report, print_statistics};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Prefix-Sweep: an autocomplete enumerator
///
/// Prefix-Sweep discovers every string an autocomplete endpoint exposes by
/// querying prefixes and diving deeper whenever a response is truncated.
/// Progress is checkpointed so an interrupted crawl resumes where it stopped.
/// Several configuration files run as independent, concurrent crawls.
#[derive(Parser, Debug)]
#[command(name = "prefix-sweep")]
#[command(version)]
#[command(about = "An autocomplete enumerator", long_about = None)]
struct Cli {
    /// Paths to TOML configuration files, one crawl per file
    #[arg(value_name = "CONFIG", required = true)]
    configs: Vec<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, ignoring previous state
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from stored state and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Regenerate the summary file from stored state and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut configs = Vec::with_capacity(cli.configs.len());
    for path in &cli.configs {
        tracing::info!("Loading configuration from: {}", path.display());
        let (config, hash) = load_config_with_hash(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?;
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
        configs.push(config);
    }
    validate_distinct_outputs(&configs).context("Crawls must write to separate files")?;

    if cli.dry_run {
        configs.iter().for_each(handle_dry_run);
    } else if cli.stats {
        for config in &configs {
            handle_stats(config)?;
        }
    } else if cli.export_summary {
        for config in &configs {
            handle_export_summary(config)?;
        }
    } else {
        handle_crawl(configs, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("prefix_sweep=info,warn"),
            1 => EnvFilter::new("prefix_sweep=debug,info"),
            2 => EnvFilter::new("prefix_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Prefix-Sweep Dry Run ===\n");

    println!("Endpoint:");
    println!("  Base URL: {}", config.endpoint.base_url);
    println!("  Page size: {}", config.endpoint.page_size);
    println!("  Request timeout: {}ms", config.endpoint.request_timeout_ms);

    println!("\nRate Limit:");
    println!("  Minimum interval: {}ms", config.rate_limit.min_interval_ms);
    println!(
        "  Backoff: {}ms doubling to {}ms",
        config.rate_limit.backoff_initial_ms, config.rate_limit.backoff_max_ms
    );

    println!("\nCrawl:");
    println!(
        "  Alphabet ({} symbols): {}",
        config.crawl.alphabet.chars().count(),
        config.crawl.alphabet
    );
    println!(
        "  Checkpoint every {} calls",
        config.crawl.checkpoint_interval
    );

    println!("\nOutput:");
    println!("  Backend: {:?}", config.output.backend);
    println!("  State: {}", config.output.state_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid\n");
}

/// Handles the --stats mode: shows statistics from stored state
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("State: {}\n", config.output.state_path);

    match load_statistics(&config.output)? {
        Some(stats) => print_statistics(&stats),
        None => println!("No crawl state stored yet\n"),
    }

    Ok(())
}

/// Handles the --export-summary mode: regenerates the summary file
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    if export_summary(&config.output)? {
        println!("✓ Summary exported to: {}", config.output.summary_path);
    } else {
        println!("No crawl state stored at {}", config.output.state_path);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(configs: Vec<Config>, fresh: bool) -> anyhow::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));

    let shutdown_signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal, finishing current query");
            shutdown_signal.store(true, Ordering::SeqCst);
        }
    });

    tracing::info!("Starting {} crawl(s)", configs.len());

    let mut failures = 0;
    for result in crawl_all(configs, fresh, shutdown).await? {
        match result {
            Ok(report) => print_report(&report),
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} crawl(s) failed", failures);
    }

    Ok(())
}
