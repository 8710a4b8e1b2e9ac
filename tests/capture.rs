mod common;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;

use common::{capture_config, FailingStore, MemoryStore};
use geo_capture::{
    capture::{
        CaptureController, CaptureOutcome, GeolocationError, GeolocationProvider,
        HttpIngestionClient, IngestionClient, Navigator, PositionOptions, Trigger,
    },
    database::LocationStore,
    errors::IngestionError,
    models::Coordinates,
    server::{router, AppState},
};

const SAN_FRANCISCO: Coordinates = Coordinates {
    lat: 37.7749,
    lng: -122.4194,
    accuracy: Some(15.2),
};

struct Device(Result<Coordinates, GeolocationError>);

impl GeolocationProvider for Device {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        assert!(options.enable_high_accuracy);
        self.0
    }
}

#[derive(Clone, Default)]
struct Browser(Arc<Mutex<Vec<String>>>);

impl Navigator for Browser {
    fn navigate(&self, url: &str) {
        self.0.lock().unwrap().push(url.to_string());
    }
}

fn ingestion_client(address: SocketAddr) -> HttpIngestionClient {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpIngestionClient::with_client(client, &format!("http://{address}/"))
}

async fn spawn_server<S: LocationStore>(store: S) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = router(AppState::new(store, capture_config()).unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

#[tokio::test]
async fn test_capture_is_saved_and_redirects() {
    let store = MemoryStore::default();
    let address = spawn_server(store.clone()).await;
    let browser = Browser::default();
    let config = capture_config();

    let controller = CaptureController::from_config(
        Device(Ok(SAN_FRANCISCO)),
        ingestion_client(address),
        browser.clone(),
        &config,
    );

    let CaptureOutcome::Captured { ingestion, .. } = controller.trigger(Trigger::Load).await else {
        panic!("expected a capture");
    };
    ingestion.await.unwrap();

    assert_eq!(*browser.0.lock().unwrap(), vec![config.redirect_url.clone()]);
    assert_eq!(controller.state().await.saved_id, Some(1));

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].lat, SAN_FRANCISCO.lat);
    assert_eq!(records[0].lng, SAN_FRANCISCO.lng);
    assert_eq!(records[0].accuracy, SAN_FRANCISCO.accuracy);
}

#[tokio::test]
async fn test_redirects_even_when_save_fails() {
    let store = FailingStore::default();
    let address = spawn_server(store.clone()).await;
    let browser = Browser::default();

    let controller = CaptureController::from_config(
        Device(Ok(SAN_FRANCISCO)),
        ingestion_client(address),
        browser.clone(),
        &capture_config(),
    );

    let CaptureOutcome::Captured { ingestion, .. } = controller.trigger(Trigger::Load).await else {
        panic!("expected a capture");
    };
    ingestion.await.unwrap();

    assert_eq!(browser.0.lock().unwrap().len(), 1);
    assert_eq!(store.attempts(), 1);

    let state = controller.state().await;
    assert_eq!(state.saved_id, None);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_permission_denied_never_reaches_server() {
    let store = MemoryStore::default();
    let address = spawn_server(store.clone()).await;
    let browser = Browser::default();

    let controller = CaptureController::from_config(
        Device(Err(GeolocationError::PermissionDenied)),
        ingestion_client(address),
        browser.clone(),
        &capture_config(),
    );

    let outcome = controller.trigger(Trigger::Load).await;

    assert!(matches!(
        outcome,
        CaptureOutcome::Failed(GeolocationError::PermissionDenied)
    ));
    assert!(controller.state().await.permission_denied);
    assert!(browser.0.lock().unwrap().is_empty());
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_client_reports_rejection() {
    let address = spawn_server(FailingStore::default()).await;
    let client = ingestion_client(address);

    let result = client.save_location(SAN_FRANCISCO).await;

    match result {
        Err(IngestionError::Rejected { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("Internal server error"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}
