//! # Query Parameter Parser
//!
//! Turns raw query-string maps and path segments into filter objects.
//! Unknown keys are ignored. Nothing here touches the store.

use std::collections::HashMap;
use std::str::FromStr;

use crate::geo::{is_valid_latitude, is_valid_longitude, BoundingBox, Coordinate};

use super::errors::ValidationError;
use super::filter::{
    ActivityFilter, BuildingFilter, NameFilter, OrganizationId, RadiusFilter, RectangleFilter,
};

type ParseResult<T> = Result<T, ValidationError>;

const LATITUDE_RANGE: &str = "between -90 and 90";
const LONGITUDE_RANGE: &str = "between -180 and 180";

impl NameFilter {
    /// Parse `?name=`; blank means no filter
    pub fn parse(params: &HashMap<String, String>) -> ParseResult<Self> {
        let name = params
            .get("name")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Self { name })
    }
}

impl BuildingFilter {
    pub fn parse(building_id: &str) -> ParseResult<Self> {
        Ok(Self {
            building_id: parse_positive_id("building_id", building_id)?,
        })
    }
}

impl ActivityFilter {
    pub fn parse(activity_id: &str) -> ParseResult<Self> {
        Ok(Self {
            activity_id: parse_positive_id("activity_id", activity_id)?,
        })
    }
}

impl OrganizationId {
    pub fn parse(organization_id: &str) -> ParseResult<Self> {
        parse_positive_id("organization_id", organization_id).map(OrganizationId)
    }
}

impl RadiusFilter {
    /// Parse `latitude`, `longitude` and `radius` (meters)
    pub fn parse(params: &HashMap<String, String>) -> ParseResult<Self> {
        let latitude = parse_latitude(params, "latitude")?;
        let longitude = parse_longitude(params, "longitude")?;
        let radius_m: f64 = parse_required(params, "radius", "number")?;

        if radius_m <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "radius",
                value: radius_m.to_string(),
                constraint: "a positive number of meters",
            });
        }

        Ok(Self {
            center: Coordinate::new(latitude, longitude),
            radius_m,
        })
    }
}

impl RectangleFilter {
    /// Parse `min_latitude`, `max_latitude`, `min_longitude`, `max_longitude`
    pub fn parse(params: &HashMap<String, String>) -> ParseResult<Self> {
        let min_latitude = parse_latitude(params, "min_latitude")?;
        let max_latitude = parse_latitude(params, "max_latitude")?;
        let min_longitude = parse_longitude(params, "min_longitude")?;
        let max_longitude = parse_longitude(params, "max_longitude")?;

        if min_latitude > max_latitude {
            return Err(ValidationError::InvertedRange {
                axis: "latitude",
                min: min_latitude,
                max: max_latitude,
            });
        }
        if min_longitude > max_longitude {
            return Err(ValidationError::InvertedRange {
                axis: "longitude",
                min: min_longitude,
                max: max_longitude,
            });
        }

        Ok(Self {
            bounds: BoundingBox {
                min_latitude,
                max_latitude,
                min_longitude,
                max_longitude,
            },
        })
    }
}

/// Parse a required value of type `T`
fn parse_required<T: FromStr + ParsedNumber>(
    params: &HashMap<String, String>,
    field: &'static str,
    expected: &'static str,
) -> ParseResult<T> {
    let raw = params
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::Missing(field))?;

    parse_value(field, raw, expected)
}

fn parse_value<T: FromStr + ParsedNumber>(
    field: &'static str,
    raw: &str,
    expected: &'static str,
) -> ParseResult<T> {
    match raw.parse::<T>() {
        Ok(v) if v.is_finite_value() => Ok(v),
        _ => Err(ValidationError::WrongType {
            field,
            expected,
            value: raw.to_string(),
        }),
    }
}

fn parse_latitude(params: &HashMap<String, String>, field: &'static str) -> ParseResult<f64> {
    let value: f64 = parse_required(params, field, "number")?;
    if !is_valid_latitude(value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            constraint: LATITUDE_RANGE,
        });
    }
    Ok(value)
}

fn parse_longitude(params: &HashMap<String, String>, field: &'static str) -> ParseResult<f64> {
    let value: f64 = parse_required(params, field, "number")?;
    if !is_valid_longitude(value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            constraint: LONGITUDE_RANGE,
        });
    }
    Ok(value)
}

/// Parse a path segment as a positive integer id
fn parse_positive_id(field: &'static str, raw: &str) -> ParseResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Missing(field));
    }

    let id: i64 = parse_value(field, raw, "integer")?;
    if id <= 0 {
        return Err(ValidationError::OutOfRange {
            field,
            value: id.to_string(),
            constraint: "a positive integer",
        });
    }
    Ok(id)
}

/// Rejects NaN and infinities that `f64::from_str` happily accepts
trait ParsedNumber {
    fn is_finite_value(&self) -> bool;
}

impl ParsedNumber for f64 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl ParsedNumber for i64 {
    fn is_finite_value(&self) -> bool {
        true
    }
}
