//! orgdir - read-only directory of organizations, buildings and activities
//!
//! Name, building, activity, radius and rectangle searches plus a detail
//! lookup, served over HTTP behind an API key.

pub mod cli;
pub mod config;
pub mod geo;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod query;
pub mod rest_api;
pub mod store;
