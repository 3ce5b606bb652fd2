//! Query surface over the archive pipeline
//!
//! One-shot operations used by the HTTP API and the CLI: a single search page
//! and a single detail-page lookup. Neither touches a feed session.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::archive::{ArchiveClient, ArchiveSource, ItemDetailFetcher, ItemEnricher, UpstreamError};
use crate::config::ArchiveConfig;
use crate::types::{CanonicalItem, ItemDetails, SearchPage};

/// Broad class of a [`ServiceError`], used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    UpstreamFailure,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::UpstreamFailure => "UPSTREAM_FAILURE",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidRequest(_) => ErrorKind::BadRequest,
            ServiceError::Upstream(_) => ErrorKind::UpstreamFailure,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Stateless search and detail lookups
pub struct ArchiveService {
    source: Arc<dyn ArchiveSource>,
    enricher: ItemEnricher,
    details: ItemDetailFetcher,
    config: ArchiveConfig,
}

impl ArchiveService {
    pub fn new(source: Arc<dyn ArchiveSource>, config: ArchiveConfig) -> Self {
        Self {
            enricher: ItemEnricher::new(Arc::clone(&source), config.clone()),
            details: ItemDetailFetcher::new(Arc::clone(&source), config.clone()),
            source,
            config,
        }
    }

    /// Build a service backed by a live [`ArchiveClient`]
    pub fn from_config(config: ArchiveConfig) -> Result<Self, ServiceError> {
        let client = ArchiveClient::new(config.clone())
            .map_err(|e| ServiceError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// The transport behind this service
    pub fn source(&self) -> Arc<dyn ArchiveSource> {
        Arc::clone(&self.source)
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// One page of enriched, displayable results for `query`
    pub async fn search(&self, query: &str, page: u32) -> Result<SearchPage, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::InvalidRequest("query must not be empty".to_string()));
        }
        if page == 0 {
            return Err(ServiceError::InvalidRequest("page starts at 1".to_string()));
        }

        let hits = self.source.search(query, page).await?;
        debug!("Search '{}' page {} returned {} hits", query, page, hits.len());

        let items: Vec<CanonicalItem> = self
            .enricher
            .enrich_all(hits)
            .await
            .into_iter()
            .filter(CanonicalItem::is_displayable)
            .collect();

        Ok(SearchPage::new(items))
    }

    /// Scrape one detail page; `Ok(None)` when it cannot be fetched
    pub async fn item_details(&self, url: &str) -> Result<Option<ItemDetails>, ServiceError> {
        let page_url = self.validate_detail_url(url)?;
        Ok(self.details.fetch_details(&page_url).await)
    }

    fn validate_detail_url(&self, url: &str) -> Result<Url, ServiceError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ServiceError::InvalidRequest("URL parameter is required".to_string()));
        }

        let parsed = Url::parse(url)
            .map_err(|e| ServiceError::InvalidRequest(format!("invalid URL '{}': {}", url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ServiceError::InvalidRequest(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        match parsed.host_str() {
            Some(host) if self.config.is_detail_host(host) => Ok(parsed),
            Some(host) => Err(ServiceError::InvalidRequest(format!(
                "host '{}' is not an archive detail host",
                host
            ))),
            None => Err(ServiceError::InvalidRequest("URL has no host".to_string())),
        }
    }
}
