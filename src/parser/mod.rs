//! Page parsers for the two crawl phases
//!
//! - `listing`: repository stubs and the next-page link from a listing page
//! - `detail`: languages and commit count from a repository page
//! - `page`: the document query primitives both parsers are built on
//!
//! Parsers are pure: they take page content and return values, and never
//! touch the network or shared state.

pub mod detail;
pub mod listing;
pub mod page;

pub use detail::{
    extract_commits, parse_detail, parse_detail_with_count, CommitCount, COMMIT_STRATEGIES,
    DEFAULT_COMMITS,
};
pub use listing::{parse_listing, ListingPage, EMPTY_MARKER};
pub use page::PageReader;
