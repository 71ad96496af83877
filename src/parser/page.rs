//! Document query primitives over a parsed HTML page
//!
//! A [`PageReader`] owns one parsed document together with the URL it was
//! served from. Every lookup returns an empty/`None` result when nothing
//! matches; a missing node is never an error at this level.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// A parsed page plus the base URL used to resolve its links
pub struct PageReader {
    document: Html,
    base_url: Url,
}

impl PageReader {
    /// Parses HTML content served from `base_url`
    pub fn parse(html: &str, base_url: &Url) -> Self {
        Self {
            document: Html::parse_document(html),
            base_url: base_url.clone(),
        }
    }

    /// Selects all elements matching a CSS selector, in document order
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match selector(css) {
            Some(selector) => self.document.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    /// Reads an attribute from every matching element that carries it
    pub fn attrs(&self, css: &str, attr: &str) -> Vec<String> {
        self.select(css)
            .into_iter()
            .filter_map(|element| element.value().attr(attr).map(str::to_string))
            .collect()
    }

    /// Reads an attribute from the first matching element that carries it
    pub fn first_attr(&self, css: &str, attr: &str) -> Option<String> {
        self.attrs(css, attr).into_iter().next()
    }

    /// Resolves a link against the page URL
    ///
    /// Returns None for empty or fragment-only hrefs, unparseable links and
    /// anything that does not resolve to http(s).
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();

        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        match self.base_url.join(href) {
            Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
                Some(absolute)
            }
            _ => None,
        }
    }
}

/// Parses a CSS selector, logging and swallowing invalid ones
fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Invalid selector {:?}: {}", css, e);
            None
        }
    }
}

/// Selects descendants of `element` matching a CSS selector
pub fn select_in<'a>(element: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(selector) => element.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// Reads an attribute from the first descendant of `element` that carries it
pub fn attr_in(element: &ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_in(element, css)
        .into_iter()
        .find_map(|child| child.value().attr(attr).map(str::to_string))
}

/// Reads the full text of the first descendant of `element` matching `css`
pub fn text_in(element: &ElementRef<'_>, css: &str) -> Option<String> {
    select_in(element, css)
        .into_iter()
        .next()
        .map(|child| full_text(&child))
}

/// All text beneath an element, concatenated
pub fn full_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Only the text nodes that are direct children of an element
pub fn own_text(element: &ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect()
}

/// Returns the first run of ASCII digits found in any of `values`
pub fn first_digits<I, S>(values: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values.into_iter().find_map(|value| {
        DIGITS
            .find(value.as_ref())
            .map(|found| found.as_str().to_string())
    })
}
