//! Configuration for retrofeed

mod archive;
mod feed;
mod http;
mod logging;

pub use archive::ArchiveConfig;
pub use feed::{FeedConfig, DEFAULT_SEARCH_TERMS};
pub use http::HttpConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default user agent sent with every upstream request
pub const DEFAULT_USER_AGENT: &str = concat!(
    "retrofeed/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/retrofeed)"
);

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream archive access
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Pagination driver behaviour
    #[serde(default)]
    pub feed: FeedConfig,
    /// HTTP API server
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate all configuration fields.
    ///
    /// Collects every problem and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Archive validation
        match url::Url::parse(&self.archive.base_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            Ok(u) => errors.push(format!(
                "archive.base_url must use http or https, got '{}'",
                u.scheme()
            )),
            Err(e) => errors.push(format!("archive.base_url is not a valid URL: {}", e)),
        }
        if !self.archive.wikipedia_search_url.contains("{}") {
            errors.push("archive.wikipedia_search_url must contain a '{}' placeholder".to_string());
        }
        if self.archive.user_agent.trim().is_empty() {
            errors.push("archive.user_agent must not be empty".to_string());
        }
        if self.archive.rows == 0 {
            errors.push("archive.rows must be positive".to_string());
        }
        if self.archive.rows > 100 {
            errors.push("archive.rows must be <= 100".to_string());
        }
        if self.archive.request_timeout_secs == 0 {
            errors.push("archive.request_timeout_secs must be positive".to_string());
        }
        if self.archive.connect_timeout_secs == 0 {
            errors.push("archive.connect_timeout_secs must be positive".to_string());
        }
        if self.archive.enrich_concurrency == 0 {
            errors.push("archive.enrich_concurrency must be positive".to_string());
        }
        if self.archive.description_word_limit == 0 {
            errors.push("archive.description_word_limit must be positive".to_string());
        }
        if self.archive.default_query.trim().is_empty() {
            errors.push("archive.default_query must not be empty".to_string());
        }

        // Feed validation
        if self.feed.search_terms.is_empty() {
            errors.push("feed.search_terms must contain at least one term".to_string());
        }
        if self.feed.search_terms.iter().any(|t| t.trim().is_empty()) {
            errors.push("feed.search_terms must not contain blank terms".to_string());
        }

        // HTTP validation
        if let Some(port_str) = self.http.listen_addr.rsplit(':').next() {
            if let Ok(port) = port_str.parse::<u32>() {
                if port == 0 || port > 65535 {
                    errors.push(format!(
                        "HTTP listen port must be between 1 and 65535, got {}",
                        port
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> Config {
        Config::default()
    }

    // ========================================================================
    // Config::validate – happy path
    // ========================================================================

    #[test]
    fn default_config_passes_validation() {
        let cfg = valid_config();
        assert!(cfg.validate().is_ok(), "default config should be valid");
    }

    // ========================================================================
    // Config::validate – archive errors
    // ========================================================================

    #[test]
    fn validate_rejects_non_http_base_url() {
        let mut cfg = valid_config();
        cfg.archive.base_url = "ftp://archive.org".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(
            err.to_string().contains("archive.base_url must use http or https"),
            "unexpected error message: {}",
            err
        );
    }

    #[test]
    fn validate_rejects_unparsable_base_url() {
        let mut cfg = valid_config();
        cfg.archive.base_url = "not a url".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("archive.base_url is not a valid URL"));
    }

    #[test]
    fn validate_rejects_reference_template_without_placeholder() {
        let mut cfg = valid_config();
        cfg.archive.wikipedia_search_url = "https://en.wikipedia.org/".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn validate_rejects_zero_rows() {
        let mut cfg = valid_config();
        cfg.archive.rows = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("archive.rows must be positive"));
    }

    #[test]
    fn validate_rejects_oversized_rows() {
        let mut cfg = valid_config();
        cfg.archive.rows = 500;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("archive.rows must be <= 100"));
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let mut cfg = valid_config();
        cfg.archive.request_timeout_secs = 0;
        cfg.archive.connect_timeout_secs = 0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("request_timeout_secs"));
        assert!(msg.contains("connect_timeout_secs"));
    }

    #[test]
    fn validate_rejects_zero_enrich_concurrency() {
        let mut cfg = valid_config();
        cfg.archive.enrich_concurrency = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("enrich_concurrency must be positive"));
    }

    // ========================================================================
    // Config::validate – feed errors
    // ========================================================================

    #[test]
    fn validate_rejects_empty_term_catalog() {
        let mut cfg = valid_config();
        cfg.feed.search_terms.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("feed.search_terms must contain at least one term"));
    }

    #[test]
    fn validate_rejects_blank_term() {
        let mut cfg = valid_config();
        cfg.feed.search_terms.push("   ".to_string());
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("blank terms"));
    }

    // ========================================================================
    // Config::validate – HTTP port errors
    // ========================================================================

    #[test]
    fn validate_rejects_http_port_zero() {
        let mut cfg = valid_config();
        cfg.http.listen_addr = "0.0.0.0:0".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("HTTP listen port must be between 1 and 65535"));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.archive.rows = 0;
        cfg.feed.search_terms.clear();
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("archive.rows"));
        assert!(msg.contains("feed.search_terms"));
    }

    // ========================================================================
    // Config::load
    // ========================================================================

    #[test]
    fn load_fills_missing_sections_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[archive]
rows = 20

[feed]
max_retries = 1
"#
        )
        .unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.archive.rows, 20);
        assert_eq!(cfg.archive.base_url, "https://archive.org");
        assert_eq!(cfg.feed.max_retries, 1);
        assert!(cfg.feed.prefetch);
        assert_eq!(cfg.feed.search_terms.len(), DEFAULT_SEARCH_TERMS.len());
        assert_eq!(cfg.logging.level, LogLevel::Info);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[archive]\nrows = 0\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("archive.rows must be positive"));
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(cfg.archive.rows, ArchiveConfig::default().rows);
    }

    #[test]
    fn default_user_agent_names_the_client() {
        assert!(DEFAULT_USER_AGENT.starts_with("retrofeed/"));
    }
}
