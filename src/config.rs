//! Application configuration

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use serde_with::serde_as;

use crate::errors::GeoCaptureError;

const ENV_PREFIX: &str = "GEOCAPTURE";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub acquire_timeout: Duration,
}

/// Settings handed to the capture page
#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    /// Where the visitor is sent after a successful capture
    pub redirect_url: String,
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub maximum_age: Duration,
    pub high_accuracy: bool,
}

impl AppConfig {
    /// Load configuration from defaults, `config/default` and the environment.
    ///
    /// `DATABASE_URL` takes precedence over `GEOCAPTURE__DATABASE__URL`.
    pub fn load() -> Result<Self, GeoCaptureError> {
        Self::from_sources(Self::environment(), env::var("DATABASE_URL").ok())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn from_sources(
        environment: Environment,
        database_url: Option<String>,
    ) -> Result<Self, GeoCaptureError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("database.max_connections", 5_i64)?
            .set_default("database.acquire_timeout", 5_i64)?
            .set_default(
                "capture.redirect_url",
                "https://www.google.com/search?q=mern+full+stack+developer+roadmap",
            )?
            .set_default("capture.timeout", 15_000_i64)?
            .set_default("capture.maximum_age", 0_i64)?
            .set_default("capture.high_accuracy", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(environment)
            .set_override_option("database.url", database_url)?
            .build()?;

        if config.get_string("database.url").is_err() {
            return Err(GeoCaptureError::MissingDatabaseUrl);
        }

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<(), GeoCaptureError> {
        self.database.validate()?;
        self.capture.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, GeoCaptureError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| GeoCaptureError::ConfigurationError {
                message: format!("Invalid listen address: {}", e),
            })
    }
}

impl DatabaseConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), GeoCaptureError> {
        if self.url.trim().is_empty() {
            return Err(GeoCaptureError::MissingDatabaseUrl);
        }
        if self.max_connections == 0 {
            return Err(GeoCaptureError::ConfigurationError {
                message: "Database max_connections must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), GeoCaptureError> {
        if self.redirect_url.trim().is_empty() {
            return Err(GeoCaptureError::ConfigurationError {
                message: "Redirect URL cannot be empty".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(GeoCaptureError::ConfigurationError {
                message: "Capture timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
