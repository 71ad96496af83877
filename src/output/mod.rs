//! Output module for finished items and crawl reports
//!
//! This module handles:
//! - The `ItemSink` interface the crawler emits finished items into
//! - Writing items to the XML feed file
//! - Recording crawl statistics

pub mod stats;
mod traits;
mod xml;

pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{ItemSink, OutputError, OutputResult};
pub use xml::{format_items_xml, XmlFileSink, ITEM_ELEMENT, ROOT_ELEMENT};
