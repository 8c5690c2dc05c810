//! PostgreSQL Organization Store
//!
//! Pooled `sqlx` store. Every call borrows one pooled connection for its
//! whole duration and returns it on drop, whatever the outcome.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::config::DatabaseConfig;
use crate::model::{Activity, Building, Organization, OrganizationRecord};
use crate::observability::{log_event_with_fields, Event};
use crate::query::{BindValue, OrganizationQuery, DETAIL_ACTIVITIES_SQL, DETAIL_SQL};

use super::errors::StoreResult;
use super::OrganizationStore;

/// Schema bootstrap, applied in order. Every statement is idempotent.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS buildings (
        id BIGSERIAL PRIMARY KEY,
        address TEXT NOT NULL,
        latitude DOUBLE PRECISION NOT NULL CHECK (latitude BETWEEN -90 AND 90),
        longitude DOUBLE PRECISION NOT NULL CHECK (longitude BETWEEN -180 AND 180)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS activities (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        parent_id BIGINT NULL REFERENCES activities(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS organizations (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        building_id BIGINT NOT NULL REFERENCES buildings(id),
        phone_numbers TEXT[] NOT NULL DEFAULT '{}'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS organization_activities (
        id BIGSERIAL PRIMARY KEY,
        organization_id BIGINT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
        activity_id BIGINT NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
        UNIQUE (organization_id, activity_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_organizations_building_id ON organizations(building_id)",
    "CREATE INDEX IF NOT EXISTS idx_organization_activities_activity_id ON organization_activities(activity_id)",
    "CREATE INDEX IF NOT EXISTS idx_buildings_location ON buildings(latitude, longitude)",
];

/// PostgreSQL-backed [`OrganizationStore`]
#[derive(Debug, Clone)]
pub struct PgOrganizationStore {
    pool: PgPool,
}

impl PgOrganizationStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration and check it with one round trip
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        log_event_with_fields(
            Event::StoreConnected,
            &[
                ("backend", "postgres"),
                ("max_connections", &config.max_connections.to_string()),
                ("url", &config.redacted_url()),
            ],
        );

        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist
    pub async fn init_schema(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        log_event_with_fields(
            Event::SchemaInitialized,
            &[("statements", &SCHEMA_STATEMENTS.len().to_string())],
        );
        Ok(())
    }
}

fn organization_from_row(row: &PgRow) -> Result<Organization, sqlx::Error> {
    Ok(Organization {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        building_id: row.try_get("building_id")?,
    })
}

/// Building columns come from an outer join, so each may be NULL
fn building_from_row(row: &PgRow) -> Result<Option<Building>, sqlx::Error> {
    let id: Option<i64> = row.try_get("b_id")?;
    let address: Option<String> = row.try_get("b_address")?;
    let latitude: Option<f64> = row.try_get("b_latitude")?;
    let longitude: Option<f64> = row.try_get("b_longitude")?;

    Ok(match (id, address, latitude, longitude) {
        (Some(id), Some(address), Some(latitude), Some(longitude)) => Some(Building {
            id,
            address,
            latitude,
            longitude,
        }),
        _ => None,
    })
}

fn activity_from_row(row: &PgRow) -> Result<Activity, sqlx::Error> {
    Ok(Activity {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        parent_id: row.try_get("parent_id")?,
    })
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    async fn list_organizations(
        &self,
        query: &OrganizationQuery,
    ) -> StoreResult<Vec<Organization>> {
        let plan = query.to_sql();

        let mut statement = sqlx::query(&plan.sql);
        for bind in &plan.binds {
            statement = match bind {
                BindValue::Int(v) => statement.bind(*v),
                BindValue::Float(v) => statement.bind(*v),
                BindValue::Text(v) => statement.bind(v.as_str()),
            };
        }

        let rows = statement.fetch_all(&self.pool).await?;
        let organizations = rows
            .iter()
            .map(organization_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(organizations)
    }

    async fn organization_detail(&self, id: i64) -> StoreResult<Option<OrganizationRecord>> {
        // Both statements run on the same session
        let mut conn = self.pool.acquire().await?;

        let Some(row) = sqlx::query(DETAIL_SQL)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        let organization = organization_from_row(&row)?;
        let building = building_from_row(&row)?;
        let phone_numbers: Vec<String> = row.try_get("phone_numbers")?;

        let activities = sqlx::query(DETAIL_ACTIVITIES_SQL)
            .bind(id)
            .fetch_all(&mut *conn)
            .await?
            .iter()
            .map(activity_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrganizationRecord {
            id: organization.id,
            name: organization.name,
            building_id: organization.building_id,
            building,
            phone_numbers,
            activities,
        }))
    }
}
