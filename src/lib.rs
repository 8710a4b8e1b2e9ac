//! Geolocation capture service
//!
//! Serves a page that asks the visitor for their position, stores the reading
//! through `POST /api/location` and sends the visitor on to a configured URL.

pub mod capture;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod presentation;
pub mod server;
