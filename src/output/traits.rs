//! Item sink trait and output errors
//!
//! A sink receives every finished item exactly once, in whatever order the
//! crawl completes them.

use crate::item::Item;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Durable destination for finished items
pub trait ItemSink {
    /// Accepts one terminal item
    fn accept(&mut self, item: Item) -> OutputResult<()>;

    /// Flushes everything accepted so far
    ///
    /// Called once when the crawl ends, including when it was cut short by a
    /// deadline.
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

impl ItemSink for Vec<Item> {
    fn accept(&mut self, item: Item) -> OutputResult<()> {
        self.push(item);
        Ok(())
    }
}
