//! Search term rotation
//!
//! Cycles a fixed catalog of query terms so consecutive fetches hit different
//! parts of the archive. Every term is used once before any term repeats.

use std::collections::HashSet;

/// Cycles query terms without immediate repetition
#[derive(Debug, Clone)]
pub struct SearchTermRotator {
    terms: Vec<String>,
    /// Index of the term returned last
    index: usize,
    /// Indices used in the current cycle
    used: HashSet<usize>,
}

impl SearchTermRotator {
    /// Create a rotator over `terms`; returns `None` for an empty catalog
    pub fn new(terms: Vec<String>) -> Option<Self> {
        if terms.is_empty() {
            return None;
        }
        Some(Self {
            terms,
            index: 0,
            used: HashSet::new(),
        })
    }

    /// Next unused term, starting a new cycle once all have been returned
    pub fn next_term(&mut self) -> &str {
        let count = self.terms.len();
        if self.used.len() >= count {
            self.used.clear();
        }

        loop {
            self.index = (self.index + 1) % count;
            if self.used.insert(self.index) {
                break;
            }
        }

        &self.terms[self.index]
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
