//! # Memory Store
//!
//! Fixture-backed store for tests and local development. The dataset is
//! validated once on load and never mutated afterwards, so reads need no
//! locking.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Activity, Building, Organization, OrganizationRecord};
use crate::query::OrganizationQuery;

use super::errors::{StoreError, StoreResult};
use super::OrganizationStore;

/// Organization as written in a fixture file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSeed {
    pub id: i64,
    pub name: String,
    pub building_id: i64,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    /// Linked activities, in insertion order
    #[serde(default)]
    pub activity_ids: Vec<i64>,
}

/// Complete fixture: all three entity sets plus the links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub organizations: Vec<OrganizationSeed>,
}

impl Dataset {
    /// Read a dataset from a JSON file
    pub fn from_json_file(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidDataset(format!("failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| StoreError::InvalidDataset(format!("invalid fixture JSON: {}", e)))
    }
}

#[derive(Debug)]
struct Inner {
    buildings: HashMap<i64, Building>,
    activities: HashMap<i64, Activity>,
    /// Keyed by id so iteration yields the fixed id order
    organizations: BTreeMap<i64, OrganizationSeed>,
}

/// In-memory [`OrganizationStore`]
#[derive(Debug, Clone)]
pub struct MemoryOrganizationStore {
    inner: Arc<Inner>,
}

impl MemoryOrganizationStore {
    /// Build a store from a dataset, checking referential integrity
    pub fn from_dataset(dataset: Dataset) -> StoreResult<Self> {
        let mut buildings = HashMap::new();
        for building in dataset.buildings {
            if !building.location().is_valid() {
                return Err(StoreError::InvalidDataset(format!(
                    "building {} has coordinates out of range ({}, {})",
                    building.id, building.latitude, building.longitude
                )));
            }
            if buildings.insert(building.id, building.clone()).is_some() {
                return Err(duplicate("building", building.id));
            }
        }

        let mut activities = HashMap::new();
        for activity in dataset.activities {
            if activities.insert(activity.id, activity.clone()).is_some() {
                return Err(duplicate("activity", activity.id));
            }
        }
        for activity in activities.values() {
            if let Some(parent) = activity.parent_id {
                if !activities.contains_key(&parent) {
                    return Err(StoreError::InvalidDataset(format!(
                        "activity {} references unknown parent {}",
                        activity.id, parent
                    )));
                }
            }
        }

        let mut organizations = BTreeMap::new();
        for org in dataset.organizations {
            if !buildings.contains_key(&org.building_id) {
                return Err(StoreError::InvalidDataset(format!(
                    "organization {} references unknown building {}",
                    org.id, org.building_id
                )));
            }

            let mut seen = HashSet::new();
            for activity_id in &org.activity_ids {
                if !activities.contains_key(activity_id) {
                    return Err(StoreError::InvalidDataset(format!(
                        "organization {} references unknown activity {}",
                        org.id, activity_id
                    )));
                }
                if !seen.insert(*activity_id) {
                    return Err(StoreError::InvalidDataset(format!(
                        "organization {} links activity {} twice",
                        org.id, activity_id
                    )));
                }
            }

            let id = org.id;
            if organizations.insert(id, org).is_some() {
                return Err(duplicate("organization", id));
            }
        }

        Ok(Self {
            inner: Arc::new(Inner {
                buildings,
                activities,
                organizations,
            }),
        })
    }

    /// Load and validate a JSON fixture
    pub fn from_json_file(path: &Path) -> StoreResult<Self> {
        Self::from_dataset(Dataset::from_json_file(path)?)
    }

    /// Number of organizations held
    pub fn len(&self) -> usize {
        self.inner.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.organizations.is_empty()
    }
}

fn duplicate(entity: &str, id: i64) -> StoreError {
    StoreError::InvalidDataset(format!("duplicate {} id {}", entity, id))
}

#[async_trait]
impl OrganizationStore for MemoryOrganizationStore {
    async fn list_organizations(
        &self,
        query: &OrganizationQuery,
    ) -> StoreResult<Vec<Organization>> {
        let inner = &self.inner;

        Ok(inner
            .organizations
            .values()
            .filter_map(|seed| {
                let org = Organization {
                    id: seed.id,
                    name: seed.name.clone(),
                    building_id: seed.building_id,
                };
                let building = if query.needs_building() {
                    inner.buildings.get(&seed.building_id)
                } else {
                    None
                };
                query
                    .matches(&org, building, &seed.activity_ids)
                    .then_some(org)
            })
            .collect())
    }

    async fn organization_detail(&self, id: i64) -> StoreResult<Option<OrganizationRecord>> {
        let inner = &self.inner;

        let Some(seed) = inner.organizations.get(&id) else {
            return Ok(None);
        };

        let activities = seed
            .activity_ids
            .iter()
            .filter_map(|activity_id| inner.activities.get(activity_id).cloned())
            .collect();

        Ok(Some(OrganizationRecord {
            id: seed.id,
            name: seed.name.clone(),
            building_id: seed.building_id,
            building: inner.buildings.get(&seed.building_id).cloned(),
            phone_numbers: seed.phone_numbers.clone(),
            activities,
        }))
    }
}
