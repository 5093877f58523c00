#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use gerobaks_api::config::ServerConfig;
use gerobaks_api::notifications::WsPresentationSink;
use gerobaks_api::router::build_app_router;
use gerobaks_api::state::AppState;
use gerobaks_api::ws::WsManager;
use gerobaks_db::{MemoryNotificationStore, NotificationStore};
use gerobaks_events::{
    DeliveryPresenter, EventBus, EventIngestor, NotificationPipeline, PresenterConfig,
    ReadStateTracker,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        presenter: PresenterConfig::default(),
        push_relay_url: None,
    }
}

/// Application state over an in-memory store, presenting to the state's
/// own `WsManager`. Must be called inside a Tokio runtime.
pub fn test_state() -> AppState {
    test_state_with_store(Arc::new(MemoryNotificationStore::new()))
}

pub fn test_state_with_store(store: Arc<dyn NotificationStore>) -> AppState {
    let config = test_config();
    let ws_manager = Arc::new(WsManager::new());

    let sink = Arc::new(WsPresentationSink::new(Arc::clone(&ws_manager)));
    let (presenter, _handle) = DeliveryPresenter::spawn(sink, config.presenter);
    let pipeline = Arc::new(NotificationPipeline::new(Arc::clone(&store), presenter));

    let event_bus = Arc::new(EventBus::default());
    tokio::spawn(EventIngestor::run(
        Arc::clone(&pipeline),
        event_bus.subscribe(),
    ));

    AppState {
        tracker: Arc::new(ReadStateTracker::new(Arc::clone(&store))),
        store,
        pipeline,
        config: Arc::new(config),
        ws_manager,
        event_bus,
    }
}

/// Build the full application router with all middleware layers.
///
/// Uses the same builder as `main.rs` so integration tests exercise the
/// production middleware stack.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_as(app: Router, uri: &str, recipient_id: i64) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-recipient-id", recipient_id.to_string())
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_as(app: Router, uri: &str, recipient_id: i64) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-recipient-id", recipient_id.to_string())
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
