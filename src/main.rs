//! Repo-Harvest main entry point
//!
//! This is the command-line interface for the Repo-Harvest crawler.

use anyhow::Context;
use clap::Parser;
use repo_harvest::config::{load_config_with_hash, Config};
use repo_harvest::crawler::{finish_sink, run_crawl};
use repo_harvest::output::{print_statistics, XmlFileSink};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Repo-Harvest: a repository listing crawler
///
/// Walks every page of a repository listing, visits each non-empty
/// repository, and writes languages and commit counts to an XML feed.
#[derive(Parser, Debug)]
#[command(name = "repo-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Crawls a repository listing into an XML feed", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write items here instead of the configured items-path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    let items_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.items_path));

    if cli.dry_run {
        handle_dry_run(&config, &items_path);
        return Ok(());
    }

    handle_crawl(&config, items_path).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("repo_harvest=info,warn"),
            1 => EnvFilter::new("repo_harvest=debug,info"),
            2 => EnvFilter::new("repo_harvest=trace,debug"),
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
fn handle_dry_run(config: &Config, items_path: &Path) {
    println!("=== Repo-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Download delay: {}ms", config.crawler.download_delay);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    match config.crawler.deadline {
        Some(deadline) => println!("  Deadline: {}s", deadline),
        None => println!("  Deadline: none"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.identity);

    println!("\nOutput:");
    println!("  Items: {}", items_path.display());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, items_path: PathBuf) -> anyhow::Result<()> {
    let mut sink = XmlFileSink::new(&items_path);

    let outcome = match config.crawler.deadline {
        Some(seconds) => {
            let limit = Duration::from_secs(seconds);
            let result = tokio::time::timeout(limit, run_crawl(config, &mut sink)).await;
            match result {
                Ok(result) => Some(result),
                Err(_) => {
                    tracing::warn!(
                        "Deadline of {}s reached; keeping {} finished items",
                        seconds,
                        sink.len()
                    );
                    None
                }
            }
        }
        None => Some(run_crawl(config, &mut sink).await),
    };

    if sink.is_empty() {
        tracing::warn!("No items collected for {}", sink.path().display());
    }

    // Items already accepted are written even if the crawl was cut short
    finish_sink(&mut sink, outcome.as_ref())
        .with_context(|| format!("failed to write {}", items_path.display()))?;

    match outcome {
        Some(Ok(stats)) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Some(Err(e)) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
        None => Ok(()),
    }
}
