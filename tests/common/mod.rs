#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use geo_capture::{
    config::CaptureConfig,
    database::LocationStore,
    errors::GeoCaptureError,
    models::{Location, NewLocation},
};

/// Store keeping records in memory, ids start from 1
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<Location>>>,
}

impl MemoryStore {
    pub fn records(&self) -> Vec<Location> {
        self.records.lock().unwrap().clone()
    }
}

impl LocationStore for MemoryStore {
    async fn create_location(&self, location: NewLocation) -> Result<Location, GeoCaptureError> {
        let mut records = self.records.lock().unwrap();
        let record = Location {
            id: records.len() as i32 + 1,
            lat: location.lat,
            lng: location.lng,
            accuracy: location.accuracy,
            user_agent: location.user_agent,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }
}

/// Store whose every insert fails
#[derive(Clone, Default)]
pub struct FailingStore {
    attempts: Arc<Mutex<usize>>,
}

impl FailingStore {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl LocationStore for FailingStore {
    async fn create_location(&self, _location: NewLocation) -> Result<Location, GeoCaptureError> {
        *self.attempts.lock().unwrap() += 1;
        Err(GeoCaptureError::DatabaseError(sqlx::Error::PoolTimedOut))
    }
}

pub fn capture_config() -> CaptureConfig {
    CaptureConfig {
        redirect_url: "https://www.google.com/search?q=mern+full+stack+developer+roadmap"
            .to_string(),
        timeout: Duration::from_millis(15_000),
        maximum_age: Duration::ZERO,
        high_accuracy: true,
    }
}
