//! Geolocation capture flow
//!
//! Models what the capture page does in the browser: request a position with
//! a bounded timeout, report failures as one of four categories, hand a
//! successful reading to the ingestion endpoint without waiting for it, and
//! navigate away.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::{sync::Mutex, task::JoinHandle, time};
use tracing::{debug, error, info, warn};

use crate::{
    config::CaptureConfig,
    errors::IngestionError,
    models::{Coordinates, LocationSaved},
};

pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported by this browser.";

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position that may be returned, zero forces a fresh fix
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(15_000),
            maximum_age: Duration::ZERO,
        }
    }
}

impl From<&CaptureConfig> for PositionOptions {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            enable_high_accuracy: config.high_accuracy,
            timeout: config.timeout,
            maximum_age: config.maximum_age,
        }
    }
}

/// Why a position request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unknown,
}

impl GeolocationError {
    /// Map a W3C `GeolocationPositionError.code`
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    /// Text shown to the visitor
    pub fn message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "You denied location permission. Please allow location access in your browser settings and tap Try Again."
            }
            Self::PositionUnavailable => "Position unavailable. Try enabling GPS / location.",
            Self::Timeout => "Location request timed out. Please try again.",
            Self::Unknown => "An unknown error occurred.",
        }
    }
}

/// Source of device positions
pub trait GeolocationProvider: Send + Sync {
    /// Whether positions can be requested at all
    fn is_supported(&self) -> bool {
        true
    }

    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

/// Client for the ingestion endpoint
pub trait IngestionClient: Send + Sync + 'static {
    fn save_location(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<i32, IngestionError>> + Send;
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

/// Posts captures to `{base_url}/api/location`
#[derive(Debug, Clone)]
pub struct HttpIngestionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIngestionClient {
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/location", base_url.trim_end_matches('/')),
        }
    }
}

impl IngestionClient for HttpIngestionClient {
    async fn save_location(&self, coordinates: Coordinates) -> Result<i32, IngestionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&coordinates)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IngestionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let saved: LocationSaved = response.json().await?;
        Ok(saved.id)
    }
}

/// What the capture page currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureState {
    pub location: Option<Coordinates>,
    pub loading: bool,
    pub error: Option<String>,
    pub permission_denied: bool,
    pub saved_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Automatic attempt when the page loads
    Load,
    /// The visitor pressed the button
    Manual,
}

#[derive(Debug)]
pub enum CaptureOutcome {
    /// Position captured and navigation issued. The handle resolves once the
    /// ingestion call has finished; nothing waits on it.
    Captured {
        coordinates: Coordinates,
        ingestion: JoinHandle<()>,
    },
    Failed(GeolocationError),
    Unsupported,
    /// A capture was already in flight
    Busy,
}

/// Page state plus the attempt counter guarding late ingestion results
#[derive(Debug, Default)]
struct Shared {
    view: CaptureState,
    /// Bumped by every attempt that resets the page
    generation: u64,
}

pub struct CaptureController<G, I, N> {
    geolocation: G,
    ingestion: Arc<I>,
    navigator: N,
    options: PositionOptions,
    redirect_url: String,
    state: Arc<Mutex<Shared>>,
}

impl<G, I, N> CaptureController<G, I, N>
where
    G: GeolocationProvider,
    I: IngestionClient,
    N: Navigator,
{
    pub fn new(
        geolocation: G,
        ingestion: I,
        navigator: N,
        options: PositionOptions,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            geolocation,
            ingestion: Arc::new(ingestion),
            navigator,
            options,
            redirect_url: redirect_url.into(),
            state: Arc::new(Mutex::new(Shared::default())),
        }
    }

    pub fn from_config(geolocation: G, ingestion: I, navigator: N, config: &CaptureConfig) -> Self {
        Self::new(
            geolocation,
            ingestion,
            navigator,
            PositionOptions::from(config),
            config.redirect_url.clone(),
        )
    }

    pub async fn state(&self) -> CaptureState {
        self.state.lock().await.view.clone()
    }

    /// Run one capture attempt
    pub async fn trigger(&self, trigger: Trigger) -> CaptureOutcome {
        let generation = {
            let mut shared = self.state.lock().await;
            if shared.view.loading {
                return CaptureOutcome::Busy;
            }

            if !self.geolocation.is_supported() {
                shared.view.error = Some(UNSUPPORTED_MESSAGE.to_string());
                return CaptureOutcome::Unsupported;
            }

            shared.generation += 1;
            let state = &mut shared.view;
            state.loading = true;
            state.error = None;
            state.permission_denied = false;
            state.saved_id = None;
            shared.generation
        };

        info!("Requesting position ({:?})", trigger);
        let result = match time::timeout(
            self.options.timeout,
            self.geolocation.current_position(&self.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GeolocationError::Timeout),
        };

        let mut shared = self.state.lock().await;
        let state = &mut shared.view;
        state.loading = false;

        match result {
            Ok(coordinates) => {
                state.location = Some(coordinates);
                drop(shared);
                info!("Accuracy (m): {:?}", coordinates.accuracy);

                let ingestion = self.spawn_ingestion(coordinates, generation);
                self.navigator.navigate(&self.redirect_url);

                CaptureOutcome::Captured {
                    coordinates,
                    ingestion,
                }
            }
            Err(e) => {
                warn!("Position request failed: {:?}", e);
                if e == GeolocationError::PermissionDenied {
                    state.permission_denied = true;
                }
                state.error = Some(e.message().to_string());
                CaptureOutcome::Failed(e)
            }
        }
    }

    /// Save in the background. The id is only recorded while no newer
    /// attempt has reset the page.
    fn spawn_ingestion(&self, coordinates: Coordinates, generation: u64) -> JoinHandle<()> {
        let ingestion = Arc::clone(&self.ingestion);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            match ingestion.save_location(coordinates).await {
                Ok(id) => {
                    let mut shared = state.lock().await;
                    if shared.generation == generation {
                        shared.view.saved_id = Some(id);
                    } else {
                        debug!("Location {} saved after a newer attempt started", id);
                    }
                }
                Err(e) => error!("Error saving location: {}", e),
            }
        })
    }
}
