//! # Entity Model
//!
//! Store-side entities. These are what the store hands back; the HTTP
//! shapes live in `rest_api::response`.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A building with a point location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: i64,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Building {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// An activity label. Activities may nest under a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Organization row as returned by list queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub building_id: i64,
}

/// Fully materialized organization for the detail lookup.
///
/// `building` is optional only because the store reads it through an
/// outer join; a record without one is an integrity fault caught by the
/// response mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationRecord {
    pub id: i64,
    pub name: String,
    pub building_id: i64,
    pub building: Option<Building>,
    pub phone_numbers: Vec<String>,
    /// Linked activities in association insertion order
    pub activities: Vec<Activity>,
}
