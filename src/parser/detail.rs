//! Repository detail page parser
//!
//! Completes a partial [`Item`] with the languages and commit count shown on
//! its detail page. The commit count is rendered in several different shapes
//! depending on the page layout, so it is recovered through an ordered chain
//! of extraction strategies.

use crate::item::Item;
use crate::parser::page::{first_digits, own_text, PageReader};
use scraper::ElementRef;
use url::Url;

const LANGUAGE_SELECTOR: &str = r#"li.d-inline[itemprop="keywords"] meta"#;
const PRIMARY_COMMITS_SELECTOR: &str = r#"a.Link--primary[href*="/commits/"] strong"#;
const COMMIT_LINK_SELECTOR: &str = r#"a[href*="/commits/"]"#;

/// Commit count used when every strategy comes up empty
///
/// Indistinguishable from a repository that really has no commits.
pub const DEFAULT_COMMITS: u64 = 0;

/// One way of reading the commit count off a detail page
pub struct CommitStrategy {
    pub name: &'static str,
    pub extract: fn(&PageReader) -> Option<u64>,
}

/// Commit strategies in the order they are tried
pub const COMMIT_STRATEGIES: &[CommitStrategy] = &[
    CommitStrategy {
        name: "primary-link-text",
        extract: primary_link_text,
    },
    CommitStrategy {
        name: "link-aria-label",
        extract: link_aria_label,
    },
    CommitStrategy {
        name: "sibling-span-text",
        extract: sibling_span_text,
    },
];

/// Result of running the commit strategies over a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitCount {
    pub value: u64,
    /// Name of the strategy that produced the value; `None` means defaulted
    pub strategy: Option<&'static str>,
}

/// Parses a detail page and returns the completed item
///
/// This is the only place a non-empty item gains its detail fields; the
/// returned item always carries a commit count.
pub fn parse_detail(html: &str, page_url: &Url, item: Item) -> Item {
    parse_detail_with_count(html, page_url, item).0
}

/// Like [`parse_detail`], also reporting how the commit count was obtained
pub fn parse_detail_with_count(html: &str, page_url: &Url, mut item: Item) -> (Item, CommitCount) {
    let page = PageReader::parse(html, page_url);

    item.languages = extract_languages(&page);

    let commits = extract_commits(&page);
    match commits.strategy {
        Some(strategy) => tracing::debug!(
            "{}: {} commits via {}",
            item.url,
            commits.value,
            strategy
        ),
        None => tracing::debug!(
            "{}: no commit count found, defaulting to {}",
            item.url,
            DEFAULT_COMMITS
        ),
    }
    item.commits = Some(commits.value);

    (item, commits)
}

/// Reads the declared languages, or None if the page lists none
pub fn extract_languages(page: &PageReader) -> Option<Vec<String>> {
    let languages: Vec<String> = page
        .attrs(LANGUAGE_SELECTOR, "content")
        .into_iter()
        .map(|language| language.trim().to_string())
        .filter(|language| !language.is_empty())
        .collect();

    if languages.is_empty() {
        None
    } else {
        Some(languages)
    }
}

/// Runs the commit strategies in order, falling back to [`DEFAULT_COMMITS`]
pub fn extract_commits(page: &PageReader) -> CommitCount {
    COMMIT_STRATEGIES
        .iter()
        .find_map(|strategy| {
            (strategy.extract)(page).map(|value| CommitCount {
                value,
                strategy: Some(strategy.name),
            })
        })
        .unwrap_or(CommitCount {
            value: DEFAULT_COMMITS,
            strategy: None,
        })
}

/// Bold count inside the primary commit-history link
fn primary_link_text(page: &PageReader) -> Option<u64> {
    page.select(PRIMARY_COMMITS_SELECTOR)
        .iter()
        .find_map(|strong| parse_count(&own_text(strong)))
}

/// First number in an accessible label on any commit-history link
fn link_aria_label(page: &PageReader) -> Option<u64> {
    let labels = page.attrs(COMMIT_LINK_SELECTOR, "aria-label");
    first_digits(labels).and_then(|digits| parse_count(&digits))
}

/// First preceding sibling span, in document order, of a span whose own
/// text mentions "commits"
///
/// With several spans before the label this is the farthest one from it,
/// not the adjacent one.
fn sibling_span_text(page: &PageReader) -> Option<u64> {
    page.select("span")
        .iter()
        .filter(|span| own_text(span).contains("commits"))
        .find_map(|span| {
            span.prev_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|sibling| sibling.value().name() == "span")
                .last()
                .and_then(|sibling| parse_count(&own_text(&sibling)))
        })
}

/// Parses a rendered count such as "1,024" or " 12 "
fn parse_count(text: &str) -> Option<u64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse().ok()
}
