//! Pagination driver configuration

use serde::{Deserialize, Serialize};

/// Retro-computing query catalog cycled by the term rotator
pub const DEFAULT_SEARCH_TERMS: &[&str] = &[
    "vintage computer",
    "retro computing",
    "classic computer",
    "8-bit computer",
    "16-bit computer",
    "microcomputer",
    "home computer 1980s",
    "personal computer history",
    "early computing",
    "computer museum",
    "apple ii",
    "commodore 64",
    "atari computer",
    "ibm pc",
    "amiga computer",
    "trs-80",
    "sinclair spectrum",
    "macintosh classic",
    "altair 8800",
    "osborne computer",
    "kaypro computer",
    "tandy computer",
    "acorn computer",
    "zx spectrum",
    "vic-20",
    "apple lisa",
    "next computer",
    "ibm pc xt",
    "ibm pc at",
    "compaq portable",
    "commodore pet",
    "ti-99/4a",
    "msx computer",
    "bbc micro",
    "amstrad cpc",
    "dragon 32",
    "oric computer",
    "sharp x68000",
    "pc jr",
    "atari st",
];

/// Feed (pagination driver) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Retries with a fresh term after an empty page, before falling back
    pub max_retries: u32,
    /// Prefetch the next page after every pull
    pub prefetch: bool,
    /// Serve the bundled fallback set when retries are exhausted
    pub fallback_enabled: bool,
    /// Query catalog for the term rotator
    pub search_terms: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            prefetch: true,
            fallback_enabled: true,
            search_terms: DEFAULT_SEARCH_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}
