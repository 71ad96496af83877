//! Crawler module for fetching and orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a crawl-wide request delay
//! - The frontier of pending listing and detail fetches
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;

pub use coordinator::{finish_sink, run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{CrawlTask, Frontier, Phase};
