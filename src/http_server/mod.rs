//! # orgdir HTTP Server Module
//!
//! Combines the organization routes with auth, request logging and CORS
//! into a single Axum server.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/metrics` - Counter snapshot
//! - `/organizations/*` - Directory queries (API key required)

pub mod auth;
pub mod config;
pub mod observability_routes;
pub mod observe;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
