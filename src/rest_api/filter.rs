//! # Filter Objects
//!
//! Validated, typed parameters for each organization endpoint. Values of
//! these types only come out of `parser`, so every field already satisfies
//! its constraint.

use crate::geo::{BoundingBox, Circle, Coordinate};

/// Optional case-insensitive name fragment. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameFilter {
    pub name: Option<String>,
}

/// Organizations housed in one building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingFilter {
    pub building_id: i64,
}

/// Organizations linked to one activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityFilter {
    pub activity_id: i64,
}

/// Organizations whose building lies within `radius_m` meters of `center`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusFilter {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl RadiusFilter {
    pub fn circle(&self) -> Circle {
        Circle {
            center: self.center,
            radius_m: self.radius_m,
        }
    }
}

/// Organizations whose building lies inside an inclusive lat/lon box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleFilter {
    pub bounds: BoundingBox,
}

/// Primary key of an organization for the detail lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationId(pub i64);
