//! HTTP API Request Handlers
//!
//! Handlers that map HTTP requests to the archive service and the shared feed.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::archive::{PaginationDriver, PipelineError};
use crate::service::{ArchiveService, ErrorKind, ServiceError};

use super::types::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ArchiveService>,
    /// Server-held feed session
    pub feed: Arc<Mutex<PaginationDriver>>,
    /// Query used when a search request carries none
    pub default_query: String,
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// One page of archive search results
pub async fn archive_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| state.default_query.clone());

    let page = match params.page.as_deref().map(str::trim) {
        None | Some("") => 1,
        Some(raw) => match raw.parse::<u32>() {
            Ok(page) => page,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request(format!("Invalid page '{}'", raw))),
                )
                    .into_response();
            }
        },
    };

    debug!("HTTP search request: query={}, page={}", query, page);

    match state.service.search(&query, page).await {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => service_error(e),
    }
}

/// Details scraped from one archive item page
pub async fn archive_item(
    State(state): State<AppState>,
    Query(params): Query<ItemParams>,
) -> Response {
    let Some(url) = params.url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("URL parameter is required")),
        )
            .into_response();
    };

    debug!("HTTP item request: {}", url);

    match state.service.item_details(&url).await {
        Ok(Some(details)) => (StatusCode::OK, Json(details)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Failed to fetch item page")),
        )
            .into_response(),
        Err(e) => service_error(e),
    }
}

/// Next page of the shared feed
pub async fn feed_next(State(state): State<AppState>) -> Response {
    let mut driver = state.feed.lock().await;
    match driver.next_page().await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => pipeline_error(e),
    }
}

/// Restart the shared feed and return its first page
pub async fn feed_refresh(State(state): State<AppState>) -> Response {
    let mut driver = state.feed.lock().await;
    match driver.refresh().await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => pipeline_error(e),
    }
}

/// Message shown to the caller for failures it did not cause.
/// The full error only goes to the log.
const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to fetch from the Internet Archive";
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

fn error_response(kind: ErrorKind, detail: Option<String>) -> Response {
    let body = match kind {
        ErrorKind::BadRequest => {
            ErrorResponse::bad_request(detail.unwrap_or_else(|| "Bad request".to_string()))
        }
        ErrorKind::UpstreamFailure => ErrorResponse::upstream_failure(UPSTREAM_FAILURE_MESSAGE),
        ErrorKind::Internal => ErrorResponse::internal_error(INTERNAL_ERROR_MESSAGE),
    };
    (status_for(kind), Json(body)).into_response()
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::UpstreamFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn service_error(e: ServiceError) -> Response {
    match e {
        // the caller's own input, safe to echo
        ServiceError::InvalidRequest(reason) => {
            warn!("Rejected request: {}", reason);
            error_response(ErrorKind::BadRequest, Some(reason))
        }
        other => {
            error!("Request failed: {}", other);
            error_response(other.kind(), None)
        }
    }
}

fn pipeline_error(e: PipelineError) -> Response {
    error!("Feed request failed: {}", e);
    let kind = match &e {
        PipelineError::Exhausted { .. } => ErrorKind::UpstreamFailure,
        _ => ErrorKind::Internal,
    };
    error_response(kind, None)
}
