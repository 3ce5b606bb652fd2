//! Upstream archive client
//!
//! One request per call against the Internet Archive:
//! - advanced search (paginated hits)
//! - per-item metadata (file listings)
//! - detail pages (HTML)
//!
//! The transport sits behind [`ArchiveSource`] so the rest of the pipeline can
//! run against any implementation.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::ArchiveConfig;

/// Fields requested from the search endpoint
const SEARCH_FIELDS: &[&str] = &["identifier", "title", "description", "mediatype", "date", "year"];

/// Media categories a search is narrowed to
const SEARCH_MEDIATYPES: &[&str] = &["image", "texts"];

/// Popularity sort applied to every search
const SEARCH_SORT: &str = "downloads desc";

/// Errors from the upstream service
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed upstream response: {0}")]
    Decode(String),
    #[error("Failed to build upstream URL: {0}")]
    InvalidUrl(String),
}

/// One raw record from the search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchHit {
    #[serde(default, deserialize_with = "text_field")]
    pub identifier: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub mediatype: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub date: Option<String>,
}

/// Per-item metadata document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetadataRecord {
    #[serde(default)]
    pub metadata: RawMetadataFields,
    #[serde(default)]
    pub files: Vec<RawFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetadataFields {
    #[serde(default, deserialize_with = "text_field")]
    pub identifier: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub date: Option<String>,
}

/// One file of an item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFile {
    #[serde(default, deserialize_with = "text_field")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub md5: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    response: Option<SearchBody>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default, rename = "numFound")]
    num_found: u64,
    #[serde(default)]
    docs: Vec<RawSearchHit>,
}

/// Upstream fields arrive as strings, numbers or arrays of strings.
///
/// Strings pass through, numbers become their decimal text, arrays yield their
/// first string element; anything else is treated as absent.
fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_text))
}

fn value_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Array(items) => items.into_iter().find_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        }),
        _ => None,
    }
}

/// Source of raw archive data
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// One page of hits for `term`; empty when nothing matches
    async fn search(&self, term: &str, page: u32) -> Result<Vec<RawSearchHit>, UpstreamError>;

    /// Metadata and file listing of one item
    async fn metadata(&self, identifier: &str) -> Result<RawMetadataRecord, UpstreamError>;

    /// Raw HTML of a detail page
    async fn detail_page(&self, url: &Url) -> Result<String, UpstreamError>;
}

/// reqwest-backed [`ArchiveSource`]
pub struct ArchiveClient {
    http: reqwest::Client,
    config: ArchiveConfig,
}

impl ArchiveClient {
    /// Create a new client
    pub fn new(config: ArchiveConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { http, config })
    }

    /// Get configuration
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Advanced-search URL for one page of `term`
    pub fn search_url(&self, term: &str, page: u32) -> Result<Url, UpstreamError> {
        let mediatypes = SEARCH_MEDIATYPES
            .iter()
            .map(|m| format!("mediatype:{}", m))
            .collect::<Vec<_>>()
            .join(" OR ");

        let mut params: Vec<(&str, String)> = vec![("q", format!("{} AND ({})", term, mediatypes))];
        params.extend(SEARCH_FIELDS.iter().map(|f| ("fl[]", f.to_string())));
        params.push(("rows", self.config.rows.to_string()));
        params.push(("page", page.to_string()));
        params.push(("output", "json".to_string()));
        params.push(("sort[]", SEARCH_SORT.to_string()));

        Url::parse_with_params(&format!("{}/advancedsearch.php", self.config.base()), &params)
            .map_err(|e| UpstreamError::InvalidUrl(e.to_string()))
    }

    /// Metadata URL for one item
    pub fn metadata_url(&self, identifier: &str) -> Result<Url, UpstreamError> {
        Url::parse(&format!(
            "{}/metadata/{}",
            self.config.base(),
            urlencoding::encode(identifier)
        ))
        .map_err(|e| UpstreamError::InvalidUrl(e.to_string()))
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, UpstreamError> {
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        let response = self.get(url).await?;
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    fn classify(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout(self.config.request_timeout())
        } else {
            UpstreamError::Http(error)
        }
    }
}

#[async_trait]
impl ArchiveSource for ArchiveClient {
    async fn search(&self, term: &str, page: u32) -> Result<Vec<RawSearchHit>, UpstreamError> {
        let url = self.search_url(term, page)?;
        let envelope: SearchEnvelope = self.get_json(url).await?;
        let body = envelope.response.unwrap_or_default();
        tracing::debug!(
            "Search '{}' page {}: {} hits of {} found",
            term,
            page,
            body.docs.len(),
            body.num_found
        );
        Ok(body.docs)
    }

    async fn metadata(&self, identifier: &str) -> Result<RawMetadataRecord, UpstreamError> {
        let url = self.metadata_url(identifier)?;
        self.get_json(url).await
    }

    async fn detail_page(&self, url: &Url) -> Result<String, UpstreamError> {
        let response = self.get(url.clone()).await?;
        response.text().await.map_err(|e| self.classify(e))
    }
}
