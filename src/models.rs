//! Data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiError;

pub const COORDINATES_NOT_NUMBERS: &str = "lat and lng must be numbers";
pub const ACCURACY_NOT_NUMBER: &str = "accuracy must be a number or null";

/// A single position reading as sent by the capture page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in WGS84 decimal degrees
    pub lat: f64,
    /// Longitude in WGS84 decimal degrees
    pub lng: f64,
    /// Accuracy radius in meters, if the device reported one
    pub accuracy: Option<f64>,
}

/// Validate an ingestion request body.
///
/// `lat` and `lng` must be JSON numbers. `accuracy` may be a number, `null`
/// or missing altogether; the latter two both become `None`. A body that is
/// not an object has no fields, so it fails the coordinate check.
impl TryFrom<Value> for Coordinates {
    type Error = ApiError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let lat = body.get("lat").and_then(Value::as_f64);
        let lng = body.get("lng").and_then(Value::as_f64);
        let (Some(lat), Some(lng)) = (lat, lng) else {
            return Err(ApiError::InvalidArgument(COORDINATES_NOT_NUMBERS.to_string()));
        };

        let accuracy = match body.get("accuracy") {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                value
                    .as_f64()
                    .ok_or_else(|| ApiError::InvalidArgument(ACCURACY_NOT_NUMBER.to_string()))?,
            ),
        };

        Ok(Self { lat, lng, accuracy })
    }
}

/// A validated location waiting to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
    pub user_agent: Option<String>,
}

impl NewLocation {
    pub fn new(coordinates: Coordinates, user_agent: Option<String>) -> Self {
        Self {
            lat: coordinates.lat,
            lng: coordinates.lng,
            accuracy: coordinates.accuracy,
            user_agent,
        }
    }
}

/// Stored location record
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: i32,
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response body of a successful ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSaved {
    pub success: bool,
    pub id: i32,
}

impl From<&Location> for LocationSaved {
    fn from(location: &Location) -> Self {
        Self {
            success: true,
            id: location.id,
        }
    }
}
