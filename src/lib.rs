//! Repo-Harvest: a two-phase repository listing crawler
//!
//! This crate walks a paginated listing of repositories, emits empty
//! repositories straight from the listing, and visits the detail page of every
//! other repository to recover its languages and commit count.

pub mod config;
pub mod crawler;
pub mod item;
pub mod output;
pub mod parser;

use thiserror::Error;

/// Main error type for Repo-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch the first listing page {url}: {source}")]
    FatalStart {
        url: String,
        source: crawler::FetchError,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Repo-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, FetchError, Fetcher, HttpFetcher};
pub use item::{EntityResult, Item};
pub use output::{CrawlStatistics, ItemSink, XmlFileSink};
