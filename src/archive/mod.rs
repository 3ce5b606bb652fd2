//! Archive acquisition pipeline
//!
//! Fetches vintage-computing items from the Internet Archive and normalizes
//! them into [`CanonicalItem`](crate::types::CanonicalItem)s.
//!
//! Key components:
//! - `SearchTermRotator`: cycles the query catalog without immediate repeats
//! - `ArchiveClient`: search, metadata and detail-page requests
//! - `ItemEnricher`: raw hit + metadata to canonical item
//! - `ItemDetailFetcher`: scrapes a single detail page
//! - `DedupFilter`: per-session emitted-id set
//! - `FallbackSet`: bundled known-good items
//! - `PaginationDriver`: retry, fallback and prefetch around all of the above

pub mod client;
pub mod dedup;
pub mod detail;
pub mod enricher;
pub mod fallback;
pub mod pagination;
pub mod rotator;
pub mod text;

pub use client::{ArchiveClient, ArchiveSource, RawMetadataRecord, RawSearchHit, UpstreamError};
pub use dedup::DedupFilter;
pub use detail::ItemDetailFetcher;
pub use enricher::ItemEnricher;
pub use fallback::FallbackSet;
pub use pagination::{DriverState, FeedPage, PaginationDriver, PipelineError};
pub use rotator::SearchTermRotator;
