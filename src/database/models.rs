// src/database/models.rs
use chrono::{DateTime, Utc};

use crate::models::Location;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LocationRow {
    id: i32,
    lat: f64,
    lng: f64,
    accuracy: Option<f64>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            lat: row.lat,
            lng: row.lng,
            accuracy: row.accuracy,
            user_agent: row.user_agent,
            created_at: row.created_at,
        }
    }
}
