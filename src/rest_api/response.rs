//! # Response Mapping
//!
//! External response shapes and the mapping from store records. Only the
//! fields listed here ever leave the service.

use serde::Serialize;
use thiserror::Error;

use crate::model::{Building, Organization, OrganizationRecord};

/// Stored data broke an integrity invariant. Not recoverable per request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// Organization row without a resolvable building
    #[error("Organization {organization_id} has no building {building_id}")]
    MissingBuilding {
        organization_id: i64,
        building_id: i64,
    },

    /// Joined building row does not match the organization's foreign key
    #[error("Organization {organization_id} references building {expected}, got {actual}")]
    BuildingMismatch {
        organization_id: i64,
        expected: i64,
        actual: i64,
    },
}

/// Organization as returned by every list endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationSummary {
    pub id: i64,
    pub name: String,
    pub building_id: i64,
}

impl From<Organization> for OrganizationSummary {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            building_id: org.building_id,
        }
    }
}

/// Building as embedded in the detail response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingResponse {
    pub id: i64,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Building> for BuildingResponse {
    fn from(b: Building) -> Self {
        Self {
            id: b.id,
            address: b.address,
            latitude: b.latitude,
            longitude: b.longitude,
        }
    }
}

/// Organization with building, phones and activity labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationDetail {
    pub id: i64,
    pub name: String,
    pub building_id: i64,
    pub building: BuildingResponse,
    pub phone_numbers: Vec<String>,
    pub activities: Vec<String>,
}

impl TryFrom<OrganizationRecord> for OrganizationDetail {
    type Error = MappingError;

    fn try_from(record: OrganizationRecord) -> Result<Self, Self::Error> {
        let building = record.building.ok_or(MappingError::MissingBuilding {
            organization_id: record.id,
            building_id: record.building_id,
        })?;

        if building.id != record.building_id {
            return Err(MappingError::BuildingMismatch {
                organization_id: record.id,
                expected: record.building_id,
                actual: building.id,
            });
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            building_id: record.building_id,
            building: building.into(),
            phone_numbers: record.phone_numbers,
            activities: record.activities.into_iter().map(|a| a.name).collect(),
        })
    }
}

/// Map a list of store rows to summaries, keeping order
pub fn summaries(organizations: Vec<Organization>) -> Vec<OrganizationSummary> {
    organizations.into_iter().map(Into::into).collect()
}
