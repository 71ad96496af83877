//! Crawl statistics
//!
//! Counters collected by the coordinator while a crawl runs, and a printer
//! for the CLI.

use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl ended; None while still running
    pub finished_at: Option<DateTime<Utc>>,

    /// Listing pages fetched successfully
    pub listing_pages: u64,

    /// Detail pages fetched successfully
    pub detail_pages: u64,

    /// Items handed to the sink
    pub items_emitted: u64,

    /// Emitted items that came straight from the listing as empty
    pub empty_items: u64,

    /// Listing pages on which no repository entries matched
    pub listings_without_entities: u64,

    /// Items whose commit count fell back to the default
    pub commits_defaulted: u64,

    /// Listing fetches that failed (their entities are lost)
    pub failed_listings: u64,

    /// Detail fetches that failed (that one item is lost)
    pub failed_details: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listing_pages: 0,
            detail_pages: 0,
            items_emitted: 0,
            empty_items: 0,
            listings_without_entities: 0,
            commits_defaulted: 0,
            failed_listings: 0,
            failed_details: 0,
        }
    }

    /// Marks the crawl as finished now
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Total number of fetch failures across both phases
    pub fn failed_fetches(&self) -> u64 {
        self.failed_listings + self.failed_details
    }

    /// Wall-clock duration of the crawl, if it has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!("  Duration: {} seconds", duration);
    }
    println!();

    println!("Pages:");
    println!("  Listing pages fetched: {}", stats.listing_pages);
    println!("  Detail pages fetched: {}", stats.detail_pages);
    println!(
        "  Listing pages without entries: {}",
        stats.listings_without_entities
    );
    println!();

    println!("Items:");
    println!("  Emitted: {}", stats.items_emitted);
    println!("  Empty repositories: {}", stats.empty_items);
    println!("  Commit count defaulted: {}", stats.commits_defaulted);
    println!();

    if stats.failed_fetches() > 0 {
        println!("Failures:");
        println!("  Listing fetches: {}", stats.failed_listings);
        println!("  Detail fetches: {}", stats.failed_details);
        println!();
    }
}
