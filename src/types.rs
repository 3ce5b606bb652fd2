//! Core types for retrofeed

use serde::{Deserialize, Serialize};

/// Session-unique identifier of a canonical item
pub type ItemId = String;

/// Title used when the upstream provides none
pub const UNTITLED_ITEM: &str = "Untitled Archive.org Item";

/// Marker substring identifying placeholder artwork
const PLACEHOLDER_MARKER: &str = "placeholder";

/// Display-ready record produced by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalItem {
    /// `archive-{identifier}`, re-suffixed when a fallback item is reused
    pub id: ItemId,
    /// Never empty
    pub title: String,
    /// Within [1970, current year] when present
    pub year: Option<i32>,
    /// Absolute image URL
    pub image_url: String,
    /// Absolute URL of the upstream detail page
    pub archive_url: String,
    /// Secondary-reference search URL derived from the title
    pub reference_url: String,
    /// Plain text, word-truncated
    pub description: String,
}

impl CanonicalItem {
    /// Whether the item may be shown: a real image, a title and a detail link
    pub fn is_displayable(&self) -> bool {
        !self.image_url.is_empty()
            && !self.image_url.contains(PLACEHOLDER_MARKER)
            && !self.title.is_empty()
            && !self.archive_url.is_empty()
    }

    /// Copy of this item under a different id
    pub fn with_id(&self, id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}

/// Partial item scraped from a single detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub title: String,
    pub year: Option<i32>,
    /// Absolute image URL, when the page exposes one
    pub image_url: Option<String>,
    pub description: String,
    pub reference_url: String,
}

/// One page of results from the query surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<CanonicalItem>,
    pub total: usize,
}

impl SearchPage {
    pub fn new(items: Vec<CanonicalItem>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}
