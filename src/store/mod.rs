//! # Entity Store
//!
//! Read access to organizations, buildings and activities. The REST layer
//! only sees [`OrganizationStore`]; the backing engine is picked at boot.

mod errors;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::model::{Organization, OrganizationRecord};
use crate::query::OrganizationQuery;

pub use errors::{StoreError, StoreResult};
pub use memory::{Dataset, MemoryOrganizationStore, OrganizationSeed};
pub use postgres::PgOrganizationStore;

/// Read-only organization store
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Organizations matching the plan, ordered by id
    async fn list_organizations(&self, query: &OrganizationQuery)
        -> StoreResult<Vec<Organization>>;

    /// One organization with building, phones and activities, or `None`
    async fn organization_detail(&self, id: i64) -> StoreResult<Option<OrganizationRecord>>;
}
