//! The wiki aggregate
//!
//! One [`Document`] holds everything: settings, the navigation forest and the
//! page map. It is the unit of load, save, import and export, and its JSON
//! shape is the persisted wire contract:
//!
//! ```json
//! {"version": "1.0", "settings": {…}, "navigation": […], "pages": {"faq": {…}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::block::count_blocks;
use super::nav::{self, NavNode};
use super::page::PageDocument;
use super::seed;
use super::settings::Settings;

/// Version written into new documents
pub const DOCUMENT_VERSION: &str = "1.0";

/// Root aggregate of a wiki
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    pub settings: Settings,
    pub navigation: Vec<NavNode>,
    /// Pages keyed by `meta.slug`
    pub pages: BTreeMap<String, PageDocument>,
}

impl Document {
    /// Creates an empty document with the given settings
    pub fn new(settings: Settings) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            settings,
            navigation: Vec::new(),
            pages: BTreeMap::new(),
        }
    }

    /// The default document written to an empty backend
    pub fn seed() -> Self {
        seed::document()
    }

    pub fn page(&self, slug: &str) -> Option<&PageDocument> {
        self.pages.get(slug)
    }

    /// Total blocks across all pages, sections included
    pub fn block_count(&self) -> usize {
        self.pages.values().map(|p| count_blocks(&p.blocks)).sum()
    }

    pub fn nav_count(&self) -> usize {
        nav::count(&self.navigation)
    }

    /// Page-node slugs with no matching page
    pub fn dangling_slugs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_dangling(&self.navigation, &self.pages, &mut out);
        out
    }

    /// Serializes to indented JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn collect_dangling<'a>(
    nodes: &'a [NavNode],
    pages: &BTreeMap<String, PageDocument>,
    out: &mut Vec<&'a str>,
) {
    for node in nodes {
        if let Some(slug) = node.slug() {
            if !pages.contains_key(slug) {
                out.push(slug);
            }
        }
        if let Some(children) = node.children() {
            collect_dangling(children, pages, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema;

    #[test]
    fn seed_passes_validation() {
        let value = serde_json::to_value(Document::seed()).unwrap();
        schema::validate(&value).unwrap();
    }

    #[test]
    fn seed_keys_match_slugs() {
        let doc = Document::seed();
        assert!(!doc.pages.is_empty());
        for (key, page) in &doc.pages {
            assert_eq!(key, page.slug());
        }
        assert!(doc.page(&doc.settings.default_slug).is_some());
    }

    #[test]
    fn seed_has_a_disabled_dangling_entry() {
        let doc = Document::seed();
        assert_eq!(doc.dangling_slugs(), vec!["plugins/cq-debug"]);
    }

    #[test]
    fn top_level_keys() {
        let value = serde_json::to_value(Document::seed()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["navigation", "pages", "settings", "version"]);
        assert_eq!(value["version"], DOCUMENT_VERSION);
    }

    #[test]
    fn counts() {
        let doc = Document::seed();
        assert_eq!(doc.nav_count(), 10);
        assert!(doc.block_count() > doc.pages.len());
    }
}
