//! Postgres tests. Need `DATABASE_URL` (from the environment or `.env`);
//! run with `cargo test -- --ignored`.

use std::{env, time::Duration};

use geo_capture::{
    config::DatabaseConfig,
    database::{Database, LocationStore},
    models::NewLocation,
};
use sqlx::postgres::PgPoolOptions;

fn database_config() -> DatabaseConfig {
    dotenvy::dotenv().ok();
    let url = env::var("DATABASE_URL").expect("Environment variable DATABASE_URL required");

    DatabaseConfig {
        url,
        max_connections: 5,
        acquire_timeout: Duration::from_secs(5),
    }
}

async fn setup_test_db() -> Database {
    Database::connect(&database_config())
        .await
        .expect("Failed to connect to database")
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_location() {
    let config = database_config();
    let db = setup_test_db().await;

    let location = NewLocation {
        lat: 37.7749,
        lng: -122.4194,
        accuracy: Some(15.2),
        user_agent: Some("Mozilla/5.0".to_string()),
    };

    let stored = db
        .create_location(location.clone())
        .await
        .expect("Failed to insert location");
    assert!(stored.id > 0);

    // Verify the insertion
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.url)
        .await
        .expect("Failed to connect to database");
    let row: (f64, f64, Option<f64>, Option<String>) =
        sqlx::query_as("SELECT lat, lng, accuracy, user_agent FROM locations WHERE id = $1")
            .bind(stored.id)
            .fetch_one(&pool)
            .await
            .expect("Failed to retrieve location");

    assert_eq!(row.0, location.lat);
    assert_eq!(row.1, location.lng);
    assert_eq!(row.2, location.accuracy);
    assert_eq!(row.3, location.user_agent);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_location_without_optional_fields() {
    let db = setup_test_db().await;

    let first = db
        .create_location(NewLocation {
            lat: 60.192059,
            lng: 24.945831,
            accuracy: None,
            user_agent: None,
        })
        .await
        .unwrap();
    let second = db
        .create_location(NewLocation {
            lat: 61.866617,
            lng: 28.886522,
            accuracy: None,
            user_agent: None,
        })
        .await
        .unwrap();

    assert!(second.id > first.id);
    assert_eq!(first.accuracy, None);
    assert_eq!(first.user_agent, None);
    assert_eq!(second.lat, 61.866617);
}
