//! # Organization REST API
//!
//! Read-only endpoints over the organization directory. Every request is
//! validated into a typed filter, translated into an [`OrganizationQuery`],
//! executed by the store and mapped to a response shape.
//!
//! [`OrganizationQuery`]: crate::query::OrganizationQuery

pub mod errors;
pub mod filter;
pub mod handler;
pub mod parser;
pub mod response;
pub mod server;

pub use errors::{ErrorResponse, RestError, RestResult, ValidationError};
pub use filter::{
    ActivityFilter, BuildingFilter, NameFilter, OrganizationId, RadiusFilter, RectangleFilter,
};
pub use handler::OrganizationHandler;
pub use response::{BuildingResponse, MappingError, OrganizationDetail, OrganizationSummary};
pub use server::organization_routes;
