//! Capture page rendering
//!
//! The page is rendered with every section present; the embedded script
//! toggles the same elements as the browser capture progresses.

use handlebars::Handlebars;
use serde::Serialize;

use crate::{
    capture::{CaptureState, GeolocationError, UNSUPPORTED_MESSAGE},
    config::CaptureConfig,
    errors::GeoCaptureError,
    models::Coordinates,
};

const PAGE_TEMPLATE: &str = include_str!("../assets/index.hbs");
const STATUS_TEMPLATE: &str = include_str!("../assets/status.hbs");
const CAPTURE_SCRIPT: &str = include_str!("../assets/capture.js");
const SAVED_LINK: &str = "https://google.com";

/// Settings and messages the page script reads on load
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageSettings<'a> {
    redirect_url: &'a str,
    timeout_ms: u64,
    maximum_age_ms: u64,
    high_accuracy: bool,
    messages: Messages,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Messages {
    permission_denied: &'static str,
    position_unavailable: &'static str,
    timeout: &'static str,
    unknown: &'static str,
    unsupported: &'static str,
}

impl<'a> From<&'a CaptureConfig> for PageSettings<'a> {
    fn from(config: &'a CaptureConfig) -> Self {
        Self {
            redirect_url: &config.redirect_url,
            timeout_ms: u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
            maximum_age_ms: u64::try_from(config.maximum_age.as_millis()).unwrap_or(u64::MAX),
            high_accuracy: config.high_accuracy,
            messages: Messages {
                permission_denied: GeolocationError::PermissionDenied.message(),
                position_unavailable: GeolocationError::PositionUnavailable.message(),
                timeout: GeolocationError::Timeout.message(),
                unknown: GeolocationError::Unknown.message(),
                unsupported: UNSUPPORTED_MESSAGE,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    status: String,
    settings: String,
    script: &'a str,
}

/// Template context for the status sections
#[derive(Debug, Serialize)]
struct StatusView<'a> {
    loading: bool,
    permission_denied: bool,
    show_error: bool,
    error: Option<&'a str>,
    saved: bool,
    saved_link: &'static str,
    location: Option<LocationView>,
    fetching: bool,
}

#[derive(Debug, Serialize)]
struct LocationView {
    lat: f64,
    lng: f64,
    /// Whole meters
    accuracy: Option<String>,
    map_embed_url: String,
    map_url: String,
}

impl<'a> From<&'a CaptureState> for StatusView<'a> {
    fn from(state: &'a CaptureState) -> Self {
        Self {
            loading: state.loading,
            permission_denied: state.permission_denied,
            show_error: state.error.is_some() && !state.permission_denied,
            error: state.error.as_deref(),
            saved: state.saved_id.is_some(),
            saved_link: SAVED_LINK,
            location: state.location.as_ref().map(LocationView::from),
            fetching: state.location.is_none()
                && !state.loading
                && state.error.is_none()
                && !state.permission_denied,
        }
    }
}

impl From<&Coordinates> for LocationView {
    fn from(coordinates: &Coordinates) -> Self {
        Self {
            lat: coordinates.lat,
            lng: coordinates.lng,
            accuracy: coordinates.accuracy.map(|a| format!("{:.0}", a.round())),
            map_embed_url: map_embed_url(coordinates),
            map_url: map_url(coordinates),
        }
    }
}

/// Handlebars registry holding the page templates. Build once and share.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, GeoCaptureError> {
        let mut registry = Handlebars::new();
        registry.register_template_string("page", PAGE_TEMPLATE)?;
        registry.register_template_string("status", STATUS_TEMPLATE)?;
        Ok(Self { registry })
    }

    /// Full HTML document for `GET /`, showing the state before the first capture
    pub fn render_page(&self, config: &CaptureConfig) -> Result<String, GeoCaptureError> {
        // Raw JSON inside <script>; `<` is escaped so the data cannot close the tag
        let settings =
            serde_json::to_string(&PageSettings::from(config))?.replace('<', "\\u003c");

        let view = PageView {
            status: self.render_status(&CaptureState::default())?,
            settings,
            script: CAPTURE_SCRIPT,
        };
        Ok(self.registry.render("page", &view)?)
    }

    /// Render the status sections for `state`
    pub fn render_status(&self, state: &CaptureState) -> Result<String, GeoCaptureError> {
        Ok(self.registry.render("status", &StatusView::from(state))?)
    }
}

/// Embeddable map centred on `coordinates`
pub fn map_embed_url(coordinates: &Coordinates) -> String {
    format!(
        "https://www.google.com/maps?q={},{}&z=18&output=embed",
        coordinates.lat, coordinates.lng
    )
}

pub fn map_url(coordinates: &Coordinates) -> String {
    format!(
        "https://www.google.com/maps?q={},{}",
        coordinates.lat, coordinates.lng
    )
}
