//! Per-session de-duplication of emitted items

use std::collections::HashSet;

use crate::types::{CanonicalItem, ItemId};

/// Tracks the ids emitted during one session; first-seen wins
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashSet<ItemId>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an item for display.
    ///
    /// Returns false for an id already admitted this session or an item
    /// without an image; otherwise records the id.
    pub fn admit(&mut self, item: &CanonicalItem) -> bool {
        if item.image_url.is_empty() {
            return false;
        }
        self.seen.insert(item.id.clone())
    }

    /// Keep only the admissible items of `items`, in order
    pub fn admit_all(&mut self, items: Vec<CanonicalItem>) -> Vec<CanonicalItem> {
        items.into_iter().filter(|item| self.admit(item)).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Forget every admitted id
    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
