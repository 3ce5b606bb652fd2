//! retrofeed: vintage-computing artifacts from the Internet Archive
//!
//! An acquisition and normalization pipeline over archive.org, featuring:
//! - Paginated search with a rotating catalog of retro-computing queries
//! - Per-item metadata enrichment to resolve a displayable image
//! - Heuristic year extraction and markup cleanup of free-text fields
//! - Session de-duplication, retry-on-empty and a bundled fallback set
//! - One-page prefetch for an endless feed
//! - An axum HTTP API and a clap CLI on top

pub mod archive;
pub mod config;
pub mod server;
pub mod service;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
