//! Errors for geo-capture
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoCaptureError {
    #[error("Configuration error")]
    ConfigError(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("Database migration error")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error")]
    SerdeError(#[from] serde_json::Error),

    #[error("Template error")]
    TemplateError(#[from] handlebars::TemplateError),

    #[error("Template render error")]
    RenderError(#[from] handlebars::RenderError),
}

/// Errors returned by the ingestion endpoint
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors from saving a capture through the ingestion endpoint
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Request to ingestion endpoint failed")]
    Request(#[from] reqwest::Error),

    #[error("Ingestion endpoint rejected the location ({status}): {message}")]
    Rejected { status: u16, message: String },
}
