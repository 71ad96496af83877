//! Repository listing page parser
//!
//! Turns one page of the repository listing into partial items plus the link
//! to the next listing page, if any.

use crate::item::{EntityResult, Item};
use crate::parser::page::{attr_in, full_text, text_in, PageReader};
use url::Url;

const ENTITY_SELECTOR: &str = r#"div[data-turbo-frame="repo-list-turbo-frame"] li"#;
const NAME_SELECTOR: &str = r#"a[itemprop="name codeRepository"]"#;
const DESCRIPTION_SELECTOR: &str = r#"p[itemprop="description"]"#;
const TIMESTAMP_SELECTOR: &str = "relative-time";
const NEXT_PAGE_SELECTOR: &str = r#"a[data-test-selector="pagination-next"]"#;

/// Text the listing shows for repositories without any commits
pub const EMPTY_MARKER: &str = "This repository is empty";

/// Everything extracted from one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub entities: Vec<EntityResult>,
    pub next_page: Option<Url>,
}

impl ListingPage {
    /// Returns true if the page matched no repository entries at all
    pub fn is_malformed(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Parses a listing page served from `base_url`
///
/// A page with no repository entries is not an error: it yields no entities,
/// logs a warning, and still reports its next-page link.
pub fn parse_listing(html: &str, base_url: &Url) -> ListingPage {
    let page = PageReader::parse(html, base_url);

    let nodes = page.select(ENTITY_SELECTOR);
    if nodes.is_empty() {
        tracing::warn!("No repositories found on {}; check listing selectors", base_url);
    }

    let entities = nodes
        .iter()
        .filter_map(|node| {
            let href = attr_in(node, NAME_SELECTOR, "href");
            let Some(url) = href.as_deref().and_then(|href| page.resolve(href)) else {
                tracing::debug!("Skipping listing entry without a repository link");
                return None;
            };

            let is_empty = full_text(node).contains(EMPTY_MARKER);

            let mut about = text_in(node, DESCRIPTION_SELECTOR)
                .map(|text| text.trim().to_string())
                .unwrap_or_default();

            if about.is_empty() && !is_empty {
                about = text_in(node, NAME_SELECTOR)
                    .map(|name| name.trim().to_string())
                    .unwrap_or_default();
            }

            let last_updated = attr_in(node, TIMESTAMP_SELECTOR, "datetime");

            Some(EntityResult::new(Item::listed(
                url.to_string(),
                about,
                last_updated,
                is_empty,
            )))
        })
        .collect();

    let next_page = page
        .first_attr(NEXT_PAGE_SELECTOR, "href")
        .and_then(|href| page.resolve(&href));

    ListingPage {
        entities,
        next_page,
    }
}
