//! HTTP server: capture page and location ingestion endpoint

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::USER_AGENT, HeaderMap},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    config::{AppConfig, CaptureConfig},
    database::LocationStore,
    errors::{ApiError, GeoCaptureError},
    models::{Coordinates, LocationSaved, NewLocation},
    presentation::PageRenderer,
};

/// Shared handler state. Cloned per request; the store shares one pool.
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub capture: Arc<CaptureConfig>,
    pub pages: Arc<PageRenderer>,
}

impl<S: LocationStore> AppState<S> {
    pub fn new(store: S, capture: CaptureConfig) -> Result<Self, GeoCaptureError> {
        Ok(Self {
            store,
            capture: Arc::new(capture),
            pages: Arc::new(PageRenderer::new()?),
        })
    }
}

pub fn router<S: LocationStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(index_handler::<S>))
        .route("/api/location", post(create_location_handler::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM
pub async fn serve<S: LocationStore>(config: &AppConfig, store: S) -> Result<(), GeoCaptureError> {
    let address = config.server.socket_addr()?;
    info!("Binding to {address}");

    let listener = TcpListener::bind(address).await?;
    info!("Server running on {}", listener.local_addr()?);

    let app = router(AppState::new(store, config.capture.clone())?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn index_handler<S: LocationStore>(
    State(state): State<AppState<S>>,
) -> Result<Html<String>, ApiError> {
    let page = state.pages.render_page(&state.capture).map_err(|e| {
        error!("Error rendering page: {:?}", e);
        ApiError::Internal
    })?;
    Ok(Html(page))
}

async fn create_location_handler<S: LocationStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LocationSaved>, ApiError> {
    // Unreadable and `null` bodies are server errors, not validation failures
    let body: Value = serde_json::from_slice(&body).map_err(|e| {
        error!("Error saving location: {}", e);
        ApiError::Internal
    })?;
    if body.is_null() {
        error!("Error saving location: request body is null");
        return Err(ApiError::Internal);
    }
    let coordinates = Coordinates::try_from(body)?;

    let user_agent = headers
        .get(USER_AGENT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let location = state
        .store
        .create_location(NewLocation::new(coordinates, user_agent))
        .await
        .map_err(|e| {
            error!("Error saving location: {:?}", e);
            ApiError::Internal
        })?;

    info!("Saved location {}", location.id);
    Ok(Json(LocationSaved::from(&location)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
