//! PostgreSQL Store Tests
//!
//! Runs the SQL store against a live database and checks it answers every
//! query exactly like the memory store over the same fixture:
//! - Schema bootstrap is idempotent
//! - SQL haversine agrees with `geo::haversine_distance_m`
//! - Detail keeps phone and activity insertion order
//!
//! Needs `DATABASE_URL` pointing at a disposable database. Run with
//! `cargo test --test postgres_store -- --ignored`.

use std::path::PathBuf;

use orgdir::geo::{BoundingBox, Circle, Coordinate};
use orgdir::query::OrganizationQuery;
use orgdir::store::{
    Dataset, MemoryOrganizationStore, OrganizationStore, PgOrganizationStore,
};
use sqlx::PgPool;

// =============================================================================
// Helper Functions
// =============================================================================

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/directory.json")
}

/// Connect, bootstrap the schema twice and load the fixture.
/// `None` when no database is configured.
async fn setup_stores() -> Option<(PgOrganizationStore, MemoryOrganizationStore)> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPool::connect(&url).await.unwrap();

    let pg = PgOrganizationStore::new(pool.clone());
    pg.init_schema().await.unwrap();
    pg.init_schema().await.unwrap();

    let dataset = Dataset::from_json_file(&fixture_path()).unwrap();
    seed(&pool, &dataset).await;

    let memory = MemoryOrganizationStore::from_dataset(dataset).unwrap();
    Some((pg, memory))
}

async fn seed(pool: &PgPool, dataset: &Dataset) {
    let mut tx = pool.begin().await.unwrap();

    sqlx::query(
        "TRUNCATE organization_activities, organizations, activities, buildings \
         RESTART IDENTITY CASCADE",
    )
    .execute(&mut *tx)
    .await
    .unwrap();

    for b in &dataset.buildings {
        sqlx::query("INSERT INTO buildings (id, address, latitude, longitude) VALUES ($1, $2, $3, $4)")
            .bind(b.id)
            .bind(&b.address)
            .bind(b.latitude)
            .bind(b.longitude)
            .execute(&mut *tx)
            .await
            .unwrap();
    }

    for a in &dataset.activities {
        sqlx::query("INSERT INTO activities (id, name, parent_id) VALUES ($1, $2, $3)")
            .bind(a.id)
            .bind(&a.name)
            .bind(a.parent_id)
            .execute(&mut *tx)
            .await
            .unwrap();
    }

    for o in &dataset.organizations {
        sqlx::query(
            "INSERT INTO organizations (id, name, building_id, phone_numbers) VALUES ($1, $2, $3, $4)",
        )
        .bind(o.id)
        .bind(&o.name)
        .bind(o.building_id)
        .bind(&o.phone_numbers)
        .execute(&mut *tx)
        .await
        .unwrap();

        for activity_id in &o.activity_ids {
            sqlx::query(
                "INSERT INTO organization_activities (organization_id, activity_id) VALUES ($1, $2)",
            )
            .bind(o.id)
            .bind(*activity_id)
            .execute(&mut *tx)
            .await
            .unwrap();
        }
    }

    tx.commit().await.unwrap();
}

fn queries() -> Vec<OrganizationQuery> {
    let moscow = Coordinate::new(55.75, 37.62);
    vec![
        OrganizationQuery::ByName(None),
        OrganizationQuery::ByName(Some("TRUCK".to_string())),
        OrganizationQuery::ByName(Some("%".to_string())),
        OrganizationQuery::ByBuilding(1),
        OrganizationQuery::ByBuilding(999),
        OrganizationQuery::ByActivity(3),
        OrganizationQuery::ByActivity(1),
        OrganizationQuery::WithinRadius(Circle { center: moscow, radius_m: 1.0 }),
        OrganizationQuery::WithinRadius(Circle {
            center: Coordinate::new(0.0, 0.0),
            radius_m: 1.0,
        }),
        OrganizationQuery::WithinRadius(Circle { center: moscow, radius_m: 600_000.0 }),
        OrganizationQuery::WithinRadius(Circle { center: moscow, radius_m: 700_000.0 }),
        OrganizationQuery::WithinRectangle(BoundingBox {
            min_latitude: 55.0,
            max_latitude: 56.0,
            min_longitude: 37.0,
            max_longitude: 38.0,
        }),
        OrganizationQuery::WithinRectangle(BoundingBox {
            min_latitude: 10.0,
            max_latitude: 10.0,
            min_longitude: 10.0,
            max_longitude: 10.0,
        }),
    ]
}

fn ids(rows: &[orgdir::model::Organization]) -> Vec<i64> {
    rows.iter().map(|o| o.id).collect()
}

// =============================================================================
// Store Agreement Tests
// =============================================================================

/// Every list query returns the same ids, in the same order, from both stores.
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_matches_memory_store() {
    let Some((pg, memory)) = setup_stores().await else {
        return;
    };

    for query in queries() {
        let expected = memory.list_organizations(&query).await.unwrap();
        let actual = pg.list_organizations(&query).await.unwrap();
        assert_eq!(ids(&actual), ids(&expected), "query {:?}", query);
        assert_eq!(actual, expected, "query {:?}", query);
    }
}

/// Known answers, independent of the memory store.
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_geo_answers() {
    let Some((pg, _)) = setup_stores().await else {
        return;
    };

    let moscow = Coordinate::new(55.75, 37.62);
    let near = pg
        .list_organizations(&OrganizationQuery::WithinRadius(Circle {
            center: moscow,
            radius_m: 1.0,
        }))
        .await
        .unwrap();
    assert_eq!(ids(&near), vec![1, 2]);

    let far = pg
        .list_organizations(&OrganizationQuery::WithinRadius(Circle {
            center: moscow,
            radius_m: 700_000.0,
        }))
        .await
        .unwrap();
    assert_eq!(ids(&far), vec![1, 2, 4]);
}

// =============================================================================
// Detail Tests
// =============================================================================

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_detail_matches_memory_store() {
    let Some((pg, memory)) = setup_stores().await else {
        return;
    };

    for id in [1, 4, 999] {
        let expected = memory.organization_detail(id).await.unwrap();
        let actual = pg.organization_detail(id).await.unwrap();
        assert_eq!(actual, expected, "organization {}", id);
    }

    let record = pg.organization_detail(1).await.unwrap().unwrap();
    assert_eq!(
        record.phone_numbers,
        vec!["2-222-222", "3-333-333", "8-923-666-13-13"]
    );
    let names: Vec<_> = record.activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Meat products", "Dairy products"]);
}
