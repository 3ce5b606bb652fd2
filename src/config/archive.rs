//! Upstream archive access configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::DEFAULT_USER_AGENT;

/// Internet Archive access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Base URL of the archive (search, metadata, download and image services)
    pub base_url: String,
    /// Secondary-reference search template; `{}` is replaced by the encoded query
    pub wikipedia_search_url: String,
    /// User agent sent with every upstream request
    pub user_agent: String,
    /// Hits requested per search page
    pub rows: u32,
    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
    /// Maximum concurrent metadata lookups within one page
    pub enrich_concurrency: usize,
    /// Word limit applied to item descriptions
    pub description_word_limit: usize,
    /// Query used by the HTTP search route when none is given
    pub default_query: String,
    /// Hosts whose detail pages may be scraped (subdomains included)
    pub detail_hosts: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: "https://archive.org".to_string(),
            wikipedia_search_url: "https://en.wikipedia.org/wiki/Special:Search?search={}"
                .to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rows: 10,
            request_timeout_secs: 15,
            connect_timeout_secs: 10,
            enrich_concurrency: 4,
            description_word_limit: 100,
            default_query: "vintage computer".to_string(),
            detail_hosts: vec!["archive.org".to_string()],
        }
    }
}

impl ArchiveConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Whether `host` is one of the allowed detail hosts or a subdomain of one
    pub fn is_detail_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.detail_hosts.iter().any(|allowed| {
            let allowed = allowed.to_ascii_lowercase();
            host == allowed || host.ends_with(&format!(".{}", allowed))
        })
    }
}
