//! Repository item model
//!
//! An [`Item`] is created partially by the listing parser and completed at most
//! once by the detail parser. Items whose listing entry is marked empty are
//! complete the moment they are parsed.

/// One repository discovered by the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Absolute repository URL, resolved against the listing page
    pub url: String,

    /// Description, or the display name when the description is blank
    pub about: String,

    /// Last-updated timestamp exactly as the listing renders it
    pub last_updated: Option<String>,

    /// Declared languages in page order; `None` until the detail phase finds any
    pub languages: Option<Vec<String>>,

    /// Commit count; always `Some` once a non-empty item has been completed
    pub commits: Option<u64>,

    /// Whether the listing marked this repository as empty
    pub is_empty: bool,
}

impl Item {
    /// Creates a partial item as seen on a listing page
    pub fn listed(
        url: impl Into<String>,
        about: impl Into<String>,
        last_updated: Option<String>,
        is_empty: bool,
    ) -> Self {
        Self {
            url: url.into(),
            about: about.into(),
            last_updated,
            languages: None,
            commits: None,
            is_empty,
        }
    }

    /// Returns true if no further fields will ever be filled in
    ///
    /// Empty items are terminal from the start. Other items become terminal
    /// when the detail phase records a commit count.
    pub fn is_terminal(&self) -> bool {
        self.is_empty || self.commits.is_some()
    }
}

/// One entity parsed from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityResult {
    pub item: Item,
    pub is_empty: bool,
}

impl EntityResult {
    pub fn new(item: Item) -> Self {
        let is_empty = item.is_empty;
        Self { item, is_empty }
    }
}
