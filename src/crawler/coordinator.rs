//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives the two crawl phases:
//! - Fetching listing pages and following their pagination links
//! - Emitting empty repositories directly from the listing
//! - Fetching one detail page per non-empty repository and emitting the
//!   completed item
//!
//! The coordinator is the only writer of items and of the sink. Fetches run
//! cooperatively on the caller's task, bounded by the configured number of
//! in-flight requests; the fetcher enforces the request delay.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{FetchError, Fetcher, HttpFetcher};
use crate::crawler::frontier::{CrawlTask, Frontier, Phase};
use crate::item::Item;
use crate::output::{CrawlStatistics, ItemSink};
use crate::parser::{parse_detail_with_count, parse_listing, ListingPage};
use crate::HarvestError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use url::Url;

/// A fetched and parsed page, ready to be merged into the crawl
enum Outcome {
    Listing {
        number: u32,
        url: Url,
        listing: ListingPage,
    },
    Detail {
        item: Item,
        commits_defaulted: bool,
    },
}

/// A task whose fetch failed
struct Failure {
    task: CrawlTask,
    error: FetchError,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Arc<dyn Fetcher>,
    start_url: Url,
    max_in_flight: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Resolves URLs to page content
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The start URL does not parse
    pub fn new(config: &CrawlerConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, HarvestError> {
        Ok(Self {
            fetcher,
            start_url: Url::parse(&config.start_url)?,
            max_in_flight: config.max_concurrent_requests.max(1) as usize,
        })
    }

    /// Runs the crawl until both queues are exhausted
    ///
    /// Only a failure to fetch the first listing page is returned as an error.
    /// Any later fetch failure drops that one branch, is logged, and the crawl
    /// carries on. Every item completed before an error or cancellation has
    /// already been handed to `sink`.
    pub async fn run(&self, sink: &mut dyn ItemSink) -> Result<CrawlStatistics, HarvestError> {
        tracing::info!("Starting crawl at {}", self.start_url);

        let mut stats = CrawlStatistics::new();
        let mut frontier = Frontier::new();
        frontier.mark_listing_seen(&self.start_url);

        let start = CrawlTask::listing(self.start_url.clone(), 1);
        let outcome = execute(self.fetcher.as_ref(), start)
            .await
            .map_err(|failure| HarvestError::FatalStart {
                url: failure.task.url.to_string(),
                source: failure.error,
            })?;
        self.absorb(outcome, &mut frontier, sink, &mut stats)?;

        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.max_in_flight {
                match frontier.pop() {
                    Some(task) => in_flight.push(execute(self.fetcher.as_ref(), task)),
                    None => break,
                }
            }

            let Some(result) = in_flight.next().await else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            match result {
                Ok(outcome) => self.absorb(outcome, &mut frontier, sink, &mut stats)?,
                Err(failure) => record_failure(failure, &mut stats),
            }

            tracing::trace!(
                "{} in flight, {} tasks queued ({} listing, {} detail)",
                in_flight.len(),
                frontier.len(),
                frontier.pending_listings(),
                frontier.pending_details()
            );
        }

        stats.finish();
        tracing::info!(
            "Crawl completed: {} items from {} listing pages ({} fetch failures)",
            stats.items_emitted,
            stats.listing_pages,
            stats.failed_fetches()
        );

        Ok(stats)
    }

    /// Merges one parsed page into the crawl state
    fn absorb(
        &self,
        outcome: Outcome,
        frontier: &mut Frontier,
        sink: &mut dyn ItemSink,
        stats: &mut CrawlStatistics,
    ) -> Result<(), HarvestError> {
        match outcome {
            Outcome::Listing {
                number,
                url,
                listing,
            } => {
                stats.listing_pages += 1;
                frontier.mark_listing_seen(&url);
                if listing.is_malformed() {
                    stats.listings_without_entities += 1;
                }

                tracing::info!(
                    "Listing page {} ({}): {} repositories",
                    number,
                    url,
                    listing.entities.len()
                );

                for entity in listing.entities {
                    if entity.is_empty {
                        stats.empty_items += 1;
                        emit(entity.item, sink, stats)?;
                        continue;
                    }

                    let item_url = entity.item.url.clone();
                    match CrawlTask::detail(entity.item) {
                        Some(task) => {
                            frontier.push(task);
                        }
                        None => tracing::warn!("Dropping repository with unusable URL {}", item_url),
                    }
                }

                if let Some(next) = listing.next_page {
                    let label = next.to_string();
                    if frontier.push(CrawlTask::listing(next, number + 1)) {
                        tracing::debug!("Queueing listing page {}: {}", number + 1, label);
                    } else {
                        tracing::warn!(
                            "Listing page {} links back to already seen {}, stopping pagination",
                            number,
                            label
                        );
                    }
                }
            }

            Outcome::Detail {
                item,
                commits_defaulted,
            } => {
                stats.detail_pages += 1;
                if commits_defaulted {
                    stats.commits_defaulted += 1;
                }
                emit(item, sink, stats)?;
            }
        }

        Ok(())
    }
}

/// Fetches a task's page and parses it for its phase
async fn execute(fetcher: &dyn Fetcher, task: CrawlTask) -> Result<Outcome, Failure> {
    tracing::debug!("Fetching {} page {}", task.kind(), task.url);

    let page = match fetcher.fetch(&task.url).await {
        Ok(page) => page,
        Err(error) => return Err(Failure { task, error }),
    };

    let outcome = match task.phase {
        Phase::Listing { page: number } => Outcome::Listing {
            number,
            listing: parse_listing(&page.body, &page.final_url),
            url: page.final_url,
        },
        Phase::Detail { item } => {
            let (item, commits) = parse_detail_with_count(&page.body, &page.final_url, item);
            Outcome::Detail {
                item,
                commits_defaulted: commits.strategy.is_none(),
            }
        }
    };

    Ok(outcome)
}

/// Hands a terminal item to the sink
fn emit(
    item: Item,
    sink: &mut dyn ItemSink,
    stats: &mut CrawlStatistics,
) -> Result<(), HarvestError> {
    debug_assert!(item.is_terminal(), "emitting unfinished item {}", item.url);

    tracing::debug!("Emitting {}", item.url);
    sink.accept(item)?;
    stats.items_emitted += 1;

    if stats.items_emitted % 10 == 0 {
        tracing::info!("Progress: {} items emitted", stats.items_emitted);
    }

    Ok(())
}

/// Logs a failed fetch; only that task's branch is lost
fn record_failure(failure: Failure, stats: &mut CrawlStatistics) {
    match failure.task.phase {
        Phase::Listing { page } => {
            stats.failed_listings += 1;
            tracing::warn!(
                "Listing page {} failed, its repositories are skipped: {}",
                page,
                failure.error
            );
        }
        Phase::Detail { item } => {
            stats.failed_details += 1;
            tracing::warn!("Detail page for {} failed: {}", item.url, failure.error);
        }
    }
}

/// Runs a complete crawl over HTTP
///
/// Builds an [`HttpFetcher`] from the configuration, crawls from the
/// configured start URL, and emits every finished item into `sink`. The sink
/// is not finished here; the caller decides when to flush it.
///
/// # Example
///
/// ```no_run
/// use repo_harvest::config::load_config;
/// use repo_harvest::crawler::run_crawl;
/// use repo_harvest::output::{ItemSink, XmlFileSink};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawler.toml"))?;
/// let mut sink = XmlFileSink::new(&config.output.items_path);
/// run_crawl(&config, &mut sink).await?;
/// sink.finish()?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    sink: &mut dyn ItemSink,
) -> Result<CrawlStatistics, HarvestError> {
    let fetcher = HttpFetcher::new(&config.fetcher_config())?;
    let coordinator = Coordinator::new(&config.crawler, Arc::new(fetcher))?;
    coordinator.run(sink).await
}

/// Finishes the sink after a crawl unless nothing was crawled at all
///
/// `outcome` is None when the crawl was cut short. The sink is left
/// unfinished after [`HarvestError::FatalStart`], so an earlier output is not
/// replaced by an empty one. Returns whether the sink was finished.
pub fn finish_sink(
    sink: &mut dyn ItemSink,
    outcome: Option<&Result<CrawlStatistics, HarvestError>>,
) -> Result<bool, HarvestError> {
    if let Some(Err(HarvestError::FatalStart { url, .. })) = outcome {
        tracing::warn!("Nothing crawled from {}, leaving previous output untouched", url);
        return Ok(false);
    }

    sink.finish()?;
    Ok(true)
}
