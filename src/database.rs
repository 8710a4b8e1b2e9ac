// src/database.rs
use std::future::Future;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, info};

use crate::{
    config::DatabaseConfig,
    errors::GeoCaptureError,
    models::{Location, NewLocation},
};

mod models;

use models::LocationRow;

/// Storage for captured locations.
///
/// The ingestion endpoint only ever creates records; there is no update or
/// delete path.
pub trait LocationStore: Clone + Send + Sync + 'static {
    fn create_location(
        &self,
        location: NewLocation,
    ) -> impl Future<Output = Result<Location, GeoCaptureError>> + Send;
}

/// Postgres-backed location store.
///
/// Construct once per process and clone it into request handlers; clones
/// share the same connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database described by `config` and apply migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, GeoCaptureError> {
        info!(
            "Connecting to database: max_connections={}, acquire_timeout={:?}",
            config.max_connections, config.acquire_timeout
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

        Self::new(pool).await
    }

    /// Wrap an existing pool, applying migrations
    pub async fn new(pool: PgPool) -> Result<Self, GeoCaptureError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .inspect_err(|e| error!("Failed to run migrations: {}", e))?;

        Ok(Self { pool })
    }

    /// Insert a location, returning the stored record
    async fn insert_location(&self, location: NewLocation) -> Result<Location, GeoCaptureError> {
        let row: LocationRow = sqlx::query_as(
            "INSERT INTO locations (lat, lng, accuracy, user_agent)
             VALUES ($1, $2, $3, $4)
             RETURNING id, lat, lng, accuracy, user_agent, created_at",
        )
        .bind(location.lat)
        .bind(location.lng)
        .bind(location.accuracy)
        .bind(location.user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}

impl LocationStore for Database {
    fn create_location(
        &self,
        location: NewLocation,
    ) -> impl Future<Output = Result<Location, GeoCaptureError>> + Send {
        self.insert_location(location)
    }
}
