//! XML feed output
//!
//! Items are buffered as they arrive and written as one document when the
//! sink is finished. Each run overwrites the previous file.

use crate::item::Item;
use crate::output::traits::{ItemSink, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Root element of the feed document
pub const ROOT_ELEMENT: &str = "repositories";

/// Element wrapping each item
pub const ITEM_ELEMENT: &str = "repository";

/// Sink that writes all accepted items to an XML file on finish
pub struct XmlFileSink {
    path: PathBuf,
    items: Vec<Item>,
}

impl XmlFileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            items: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of items accepted so far
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemSink for XmlFileSink {
    fn accept(&mut self, item: Item) -> OutputResult<()> {
        self.items.push(item);
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        let xml = format_items_xml(&self.items);

        let mut file = File::create(&self.path)?;
        file.write_all(xml.as_bytes())?;
        file.flush()?;

        tracing::info!(
            "Wrote {} items to {}",
            self.items.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Formats items as a UTF-8 XML feed document
///
/// Fields that are absent on an item are left out of its element.
pub fn format_items_xml(items: &[Item]) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str(&format!("<{}>\n", ROOT_ELEMENT));

    for item in items {
        xml.push_str(&format!("  <{}>\n", ITEM_ELEMENT));
        push_field(&mut xml, "url", &item.url);
        push_field(&mut xml, "about", &item.about);
        if let Some(last_updated) = &item.last_updated {
            push_field(&mut xml, "last_updated", last_updated);
        }
        if let Some(languages) = &item.languages {
            xml.push_str("    <languages>");
            for language in languages {
                xml.push_str(&format!(
                    "<value>{}</value>",
                    html_escape::encode_text(language)
                ));
            }
            xml.push_str("</languages>\n");
        }
        if let Some(commits) = item.commits {
            push_field(&mut xml, "commits", &commits.to_string());
        }
        xml.push_str(&format!("  </{}>\n", ITEM_ELEMENT));
    }

    xml.push_str(&format!("</{}>\n", ROOT_ELEMENT));
    xml
}

fn push_field(xml: &mut String, name: &str, value: &str) {
    xml.push_str(&format!(
        "    <{name}>{}</{name}>\n",
        html_escape::encode_text(value)
    ));
}
