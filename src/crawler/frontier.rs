//! Frontier of pending fetch tasks
//!
//! The frontier keeps two queues: listing pages still to fetch, and detail
//! pages still to fetch. A detail task carries the partial item it will
//! complete, so nothing about an item lives outside its task while the fetch
//! is pending.
//!
//! Listing URLs are remembered for the lifetime of the frontier and a listing
//! is queued at most once. Detail tasks are never de-duplicated.

use crate::item::Item;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// What a fetched page will be used for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// A listing page; `page` counts from 1 along the pagination chain
    Listing { page: u32 },

    /// The detail page of a partial, non-empty item
    Detail { item: Item },
}

/// A single pending fetch and the context needed to resume after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub phase: Phase,
}

impl CrawlTask {
    pub fn listing(url: Url, page: u32) -> Self {
        Self {
            url,
            phase: Phase::Listing { page },
        }
    }

    /// Creates a detail task for a partial item
    ///
    /// Returns None if the item's URL cannot be parsed.
    pub fn detail(item: Item) -> Option<Self> {
        let url = Url::parse(&item.url).ok()?;
        Some(Self {
            url,
            phase: Phase::Detail { item },
        })
    }

    /// Short label for log lines
    pub fn kind(&self) -> &'static str {
        match self.phase {
            Phase::Listing { .. } => "listing",
            Phase::Detail { .. } => "detail",
        }
    }
}

/// The two work queues of a crawl
#[derive(Debug, Default)]
pub struct Frontier {
    listings: VecDeque<CrawlTask>,
    details: VecDeque<CrawlTask>,
    seen_listings: HashSet<Url>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to the queue for its phase
    ///
    /// Returns false, and drops the task, when it is a listing page that has
    /// already been seen.
    pub fn push(&mut self, task: CrawlTask) -> bool {
        match task.phase {
            Phase::Listing { .. } => {
                if !self.mark_listing_seen(&task.url) {
                    return false;
                }
                self.listings.push_back(task);
            }
            Phase::Detail { .. } => self.details.push_back(task),
        }
        true
    }

    /// Records a listing URL that was fetched without going through the queue
    ///
    /// Returns false if it was already known.
    pub fn mark_listing_seen(&mut self, url: &Url) -> bool {
        self.seen_listings.insert(url.clone())
    }

    /// Takes the next task, preferring listing pages so pagination keeps moving
    pub fn pop(&mut self) -> Option<CrawlTask> {
        self.listings
            .pop_front()
            .or_else(|| self.details.pop_front())
    }

    pub fn len(&self) -> usize {
        self.listings.len() + self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty() && self.details.is_empty()
    }

    pub fn pending_listings(&self) -> usize {
        self.listings.len()
    }

    pub fn pending_details(&self) -> usize {
        self.details.len()
    }
}
