//! Geolocation capture server

use geo_capture::{config::AppConfig, database::Database, errors::GeoCaptureError, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), GeoCaptureError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    #[cfg(feature = "dotenv")]
    let _ = dotenvy::dotenv().inspect_err(|e| info!("No .env file loaded: {}", e));

    // DATABASE_URL is required; the process stops here without it
    let config = AppConfig::load()?;

    // One pool per process, shared by every request
    let db = Database::connect(&config.database).await?;

    info!("Starting server...");
    server::serve(&config, db).await
}
