//! Query translation for organization lookups
//!
//! A validated filter becomes an [`OrganizationQuery`]. The plan is
//! backend-neutral: the Postgres store renders it with [`OrganizationQuery::to_sql`],
//! the memory store evaluates it with [`OrganizationQuery::matches`]. Both
//! must agree on every predicate.
//!
//! # Conventions
//!
//! - Name matching is a case-insensitive substring match.
//! - Radius distances are haversine meters on a sphere of
//!   [`EARTH_RADIUS_M`](crate::geo::EARTH_RADIUS_M).
//! - Rectangle bounds are inclusive on both axes.
//! - List results are ordered by organization id, ascending.

mod sql;

pub use sql::{escape_like, BindValue, SqlQuery, DETAIL_ACTIVITIES_SQL, DETAIL_SQL};

use crate::geo::{BoundingBox, Circle};
use crate::model::{Building, Organization};
use crate::rest_api::filter::{
    ActivityFilter, BuildingFilter, NameFilter, RadiusFilter, RectangleFilter,
};

/// Plan for one organization list query
#[derive(Debug, Clone, PartialEq)]
pub enum OrganizationQuery {
    /// Case-insensitive substring on name; `None` selects everything
    ByName(Option<String>),
    /// Equality on building id
    ByBuilding(i64),
    /// Linked to the activity through the association table
    ByActivity(i64),
    /// Building within a circle
    WithinRadius(Circle),
    /// Building inside a box
    WithinRectangle(BoundingBox),
}

impl OrganizationQuery {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            OrganizationQuery::ByName(_) => "name",
            OrganizationQuery::ByBuilding(_) => "building",
            OrganizationQuery::ByActivity(_) => "activity",
            OrganizationQuery::WithinRadius(_) => "radius",
            OrganizationQuery::WithinRectangle(_) => "rectangle",
        }
    }

    /// Whether evaluating this plan needs the organization's building
    pub fn needs_building(&self) -> bool {
        matches!(
            self,
            OrganizationQuery::WithinRadius(_) | OrganizationQuery::WithinRectangle(_)
        )
    }

    /// Evaluate the plan against one organization.
    ///
    /// `building` is the organization's resolved building and
    /// `activity_ids` its linked activities. Geo predicates never match an
    /// organization without a building.
    pub fn matches(
        &self,
        organization: &Organization,
        building: Option<&Building>,
        activity_ids: &[i64],
    ) -> bool {
        match self {
            OrganizationQuery::ByName(None) => true,
            OrganizationQuery::ByName(Some(fragment)) => organization
                .name
                .to_lowercase()
                .contains(&fragment.to_lowercase()),
            OrganizationQuery::ByBuilding(id) => organization.building_id == *id,
            OrganizationQuery::ByActivity(id) => activity_ids.contains(id),
            OrganizationQuery::WithinRadius(circle) => {
                building.is_some_and(|b| circle.contains(&b.location()))
            }
            OrganizationQuery::WithinRectangle(bbox) => {
                building.is_some_and(|b| bbox.contains(&b.location()))
            }
        }
    }
}

impl From<NameFilter> for OrganizationQuery {
    fn from(filter: NameFilter) -> Self {
        OrganizationQuery::ByName(filter.name)
    }
}

impl From<BuildingFilter> for OrganizationQuery {
    fn from(filter: BuildingFilter) -> Self {
        OrganizationQuery::ByBuilding(filter.building_id)
    }
}

impl From<ActivityFilter> for OrganizationQuery {
    fn from(filter: ActivityFilter) -> Self {
        OrganizationQuery::ByActivity(filter.activity_id)
    }
}

impl From<RadiusFilter> for OrganizationQuery {
    fn from(filter: RadiusFilter) -> Self {
        OrganizationQuery::WithinRadius(filter.circle())
    }
}

impl From<RectangleFilter> for OrganizationQuery {
    fn from(filter: RectangleFilter) -> Self {
        OrganizationQuery::WithinRectangle(filter.bounds)
    }
}
