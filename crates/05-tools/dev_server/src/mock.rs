//! Stand-in for the remote alert service: poster assets and the JSON feed.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use overlay_core::feed::{self, AlertMessage, AlertRecord, ACTUAL_STATE};
use overlay_core::{Catalog, ImageSize};
use parking_lot::RwLock;
use serde_json::json;
use tracing::info;

/// Served for every poster size while an alert is active.
const PLACEHOLDER_POSTER: &[u8] = include_bytes!("../assets/placeholder-poster.png");

/// Alert feed shared by all handlers.
#[derive(Clone, Default)]
pub struct MockSource {
    records: Arc<RwLock<Vec<AlertRecord>>>,
    catalog: Arc<Catalog>,
}

impl MockSource {
    pub fn new(records: Vec<AlertRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            catalog: Arc::new(Catalog::standard()),
        }
    }

    /// Loads a feed document from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read feed {path:?}"))?;
        let records =
            feed::parse_feed(&bytes).with_context(|| format!("failed to parse feed {path:?}"))?;
        Ok(Self::new(records))
    }

    /// Whether any live alert (not a cancellation) is in the feed.
    pub fn is_active(&self) -> bool {
        self.records
            .read()
            .iter()
            .any(|r| r.is_actual() && r.kind != "Cancel")
    }

    pub fn records(&self) -> Vec<AlertRecord> {
        self.records.read().clone()
    }

    /// Adds a synthetic alert unless one is already live.
    pub fn activate(&self) {
        if self.is_active() {
            return;
        }
        self.records.write().push(demo_alert());
    }

    /// Drops every live record.
    pub fn cancel(&self) {
        self.records.write().retain(|r| !r.is_actual());
    }

    fn serves(&self, size: ImageSize) -> bool {
        self.catalog.sizes().contains(&size)
    }
}

fn demo_alert() -> AlertRecord {
    AlertRecord {
        state: ACTUAL_STATE.to_owned(),
        kind: "Alert".to_owned(),
        message: AlertMessage {
            title: Some("Testmelding".to_owned()),
            description: Some("Lokale ontwikkelserver, geen echte melding.".to_owned()),
            media: None,
            readmore_url: Some("https://www.amberalert.nl/".to_owned()),
        },
    }
}

/// Routes of the mock service.
pub fn router(source: MockSource) -> Router {
    Router::new()
        .route("/poster/:file", get(poster))
        .route("/alerts", get(alerts))
        .route("/admin/activate", post(activate))
        .route("/admin/cancel", post(cancel))
        .with_state(source)
}

/// Parses `<w>x<h>.png`.
fn parse_poster_name(file: &str) -> Option<ImageSize> {
    let (width, height) = file.strip_suffix(".png")?.split_once('x')?;
    Some(ImageSize::new(width.parse().ok()?, height.parse().ok()?))
}

async fn poster(State(source): State<MockSource>, UrlPath(file): UrlPath<String>) -> Response {
    match parse_poster_name(&file) {
        Some(size) if source.serves(size) && source.is_active() => {
            ([(header::CONTENT_TYPE, "image/png")], PLACEHOLDER_POSTER).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn alerts(State(source): State<MockSource>) -> Json<Vec<AlertRecord>> {
    Json(source.records())
}

async fn activate(State(source): State<MockSource>) -> Json<serde_json::Value> {
    source.activate();
    info!("mock alert activated");
    Json(json!({ "active": source.is_active() }))
}

async fn cancel(State(source): State<MockSource>) -> Json<serde_json::Value> {
    source.cancel();
    info!("mock alert cancelled");
    Json(json!({ "active": source.is_active() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use overlay_core::{catalog_for, Config, Viewport};
    use pretty_assertions::assert_eq;
    use url::Url;
    use tower::ServiceExt;

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[test]
    fn poster_names_parse_as_sizes() {
        assert_eq!(
            parse_poster_name("480x320.png"),
            Some(ImageSize::new(480, 320))
        );
        assert_eq!(parse_poster_name("480x320.jpg"), None);
        assert_eq!(parse_poster_name("480.png"), None);
        assert_eq!(parse_poster_name("axb.png"), None);
    }

    #[tokio::test]
    async fn posters_follow_alert_state() {
        let source = MockSource::default();
        let app = router(source.clone());

        let (status, _) = send(&app, "GET", "/poster/480x320.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "POST", "/admin/activate").await;
        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["active"], true);

        let (status, body) = send(&app, "GET", "/poster/480x320.png").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"\x89PNG"));

        // Sizes outside the catalog never exist.
        let (status, _) = send(&app, "GET", "/poster/10x10.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&app, "POST", "/admin/cancel").await;
        let (status, _) = send(&app, "GET", "/poster/1920x1080.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn widget_configured_for_this_server_reaches_its_posters() {
        let source = MockSource::default();
        let app = router(source.clone());
        let config = Config::from_attributes([("data-posterbase", "/poster/")]);
        let page = Url::parse("http://127.0.0.1:8080/index.html").unwrap();
        let catalog = catalog_for(&config, Some(&page));

        let probe = catalog.probe_url(config.test_mode, 1_700_000_000);
        assert_eq!(probe.host_str(), page.host_str());
        let uri = format!("{}?{}", probe.path(), probe.query().unwrap_or_default());

        let (status, _) = send(&app, "GET", &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        source.activate();
        let (status, _) = send(&app, "GET", &uri).await;
        assert_eq!(status, StatusCode::OK);

        let poster = catalog.poster_url(Viewport::new(1280, 720), config.test_mode);
        let (status, _) = send(&app, "GET", poster.path()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn feed_lists_records() {
        let source = MockSource::default();
        source.activate();
        source.activate();
        let app = router(source);

        let (status, body) = send(&app, "GET", "/alerts").await;
        assert_eq!(status, StatusCode::OK);
        let records = feed::active_alerts(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "Alert");
    }

    #[test]
    fn cancellation_records_do_not_serve_posters() {
        let source = MockSource::new(vec![AlertRecord {
            state: ACTUAL_STATE.to_owned(),
            kind: "Cancel".to_owned(),
            message: AlertMessage::default(),
        }]);
        assert!(!source.is_active());
    }
}
