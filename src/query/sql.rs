//! SQL rendering for organization query plans (PostgreSQL dialect)

use crate::geo::EARTH_RADIUS_M;

use super::OrganizationQuery;

/// A positional bind parameter
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Parameterized statement with `$n` placeholders, binds in order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

const SELECT_ORGANIZATIONS: &str = "SELECT o.id, o.name, o.building_id FROM organizations o";
const ORDER_BY_ID: &str = "ORDER BY o.id";

/// Organization with its building, for the detail lookup. `$1` is the id.
pub const DETAIL_SQL: &str = "SELECT o.id, o.name, o.building_id, o.phone_numbers, \
     b.id AS b_id, b.address AS b_address, b.latitude AS b_latitude, b.longitude AS b_longitude \
     FROM organizations o \
     LEFT JOIN buildings b ON b.id = o.building_id \
     WHERE o.id = $1";

/// Linked activities of one organization in insertion order. `$1` is the id.
pub const DETAIL_ACTIVITIES_SQL: &str = "SELECT a.id, a.name, a.parent_id \
     FROM organization_activities oa \
     JOIN activities a ON a.id = oa.activity_id \
     WHERE oa.organization_id = $1 \
     ORDER BY oa.id";

impl OrganizationQuery {
    /// Render the plan as a single SELECT returning `(id, name, building_id)`
    pub fn to_sql(&self) -> SqlQuery {
        match self {
            OrganizationQuery::ByName(None) => SqlQuery {
                sql: format!("{} {}", SELECT_ORGANIZATIONS, ORDER_BY_ID),
                binds: vec![],
            },
            OrganizationQuery::ByName(Some(fragment)) => SqlQuery {
                sql: format!(
                    "{} WHERE o.name ILIKE $1 ESCAPE '\\' {}",
                    SELECT_ORGANIZATIONS, ORDER_BY_ID
                ),
                binds: vec![BindValue::Text(format!("%{}%", escape_like(fragment)))],
            },
            OrganizationQuery::ByBuilding(building_id) => SqlQuery {
                sql: format!(
                    "{} WHERE o.building_id = $1 {}",
                    SELECT_ORGANIZATIONS, ORDER_BY_ID
                ),
                binds: vec![BindValue::Int(*building_id)],
            },
            OrganizationQuery::ByActivity(activity_id) => SqlQuery {
                sql: format!(
                    "{} JOIN organization_activities oa ON oa.organization_id = o.id \
                     WHERE oa.activity_id = $1 {}",
                    SELECT_ORGANIZATIONS, ORDER_BY_ID
                ),
                binds: vec![BindValue::Int(*activity_id)],
            },
            OrganizationQuery::WithinRadius(circle) => SqlQuery {
                sql: format!(
                    "{} JOIN buildings b ON b.id = o.building_id WHERE {} <= $3 {}",
                    SELECT_ORGANIZATIONS,
                    haversine_sql("$1", "$2"),
                    ORDER_BY_ID
                ),
                binds: vec![
                    BindValue::Float(circle.center.latitude),
                    BindValue::Float(circle.center.longitude),
                    BindValue::Float(circle.radius_m),
                ],
            },
            OrganizationQuery::WithinRectangle(bbox) => SqlQuery {
                sql: format!(
                    "{} JOIN buildings b ON b.id = o.building_id \
                     WHERE b.latitude BETWEEN $1 AND $2 \
                     AND b.longitude BETWEEN $3 AND $4 {}",
                    SELECT_ORGANIZATIONS, ORDER_BY_ID
                ),
                binds: vec![
                    BindValue::Float(bbox.min_latitude),
                    BindValue::Float(bbox.max_latitude),
                    BindValue::Float(bbox.min_longitude),
                    BindValue::Float(bbox.max_longitude),
                ],
            },
        }
    }
}

/// Haversine distance in meters from `b.latitude/b.longitude` to the bound center.
/// Mirrors `geo::haversine_distance_m`, including the clamp on the inner term.
fn haversine_sql(lat: &str, lon: &str) -> String {
    format!(
        "({radius} * 2 * ASIN(SQRT(LEAST(1.0, \
         POWER(SIN(RADIANS(b.latitude - {lat}) / 2), 2) \
         + COS(RADIANS({lat})) * COS(RADIANS(b.latitude)) \
         * POWER(SIN(RADIANS(b.longitude - {lon}) / 2), 2)))))",
        radius = EARTH_RADIUS_M,
        lat = lat,
        lon = lon,
    )
}

/// Escape `LIKE` metacharacters so user input matches literally
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{BoundingBox, Circle, Coordinate};

    #[test]
    fn test_unfiltered_name_query() {
        let q = OrganizationQuery::ByName(None).to_sql();
        assert_eq!(
            q.sql,
            "SELECT o.id, o.name, o.building_id FROM organizations o ORDER BY o.id"
        );
        assert!(q.binds.is_empty());
    }

    #[test]
    fn test_name_query_escapes_pattern() {
        let q = OrganizationQuery::ByName(Some("50%_off".to_string())).to_sql();
        assert!(q.sql.contains("o.name ILIKE $1"));
        assert_eq!(q.binds, vec![BindValue::Text("%50\\%\\_off%".to_string())]);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("%_"), "\\%\\_");
    }

    #[test]
    fn test_activity_query_joins_association() {
        let q = OrganizationQuery::ByActivity(7).to_sql();
        assert!(q.sql.contains("JOIN organization_activities oa"));
        assert!(q.sql.contains("oa.activity_id = $1"));
        assert!(q.sql.ends_with("ORDER BY o.id"));
        assert_eq!(q.binds, vec![BindValue::Int(7)]);
    }

    #[test]
    fn test_radius_query_binds_center_and_radius() {
        let q = OrganizationQuery::WithinRadius(Circle {
            center: Coordinate::new(55.75, 37.62),
            radius_m: 250.0,
        })
        .to_sql();
        assert!(q.sql.contains("JOIN buildings b"));
        assert!(q.sql.contains("6371008.8 * 2 * ASIN"));
        assert!(q.sql.contains("<= $3"));
        assert_eq!(
            q.binds,
            vec![
                BindValue::Float(55.75),
                BindValue::Float(37.62),
                BindValue::Float(250.0)
            ]
        );
    }

    #[test]
    fn test_rectangle_query_is_inclusive() {
        let q = OrganizationQuery::WithinRectangle(BoundingBox {
            min_latitude: 55.0,
            max_latitude: 56.0,
            min_longitude: 37.0,
            max_longitude: 38.0,
        })
        .to_sql();
        assert!(q.sql.contains("b.latitude BETWEEN $1 AND $2"));
        assert!(q.sql.contains("b.longitude BETWEEN $3 AND $4"));
        assert_eq!(q.binds.len(), 4);
    }

    #[test]
    fn test_detail_statements() {
        assert!(DETAIL_SQL.contains("LEFT JOIN buildings b"));
        assert!(DETAIL_ACTIVITIES_SQL.ends_with("ORDER BY oa.id"));
    }
}
