//! HTTP API Server Module
//!
//! Exposes the archive search, item lookup and a server-held feed session
//! over a small JSON API.

pub mod handlers;
pub mod routes;
#[allow(clippy::module_inception)]
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use server::HttpServer;
