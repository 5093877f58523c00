//! Route definitions for the internal `/events` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// POST   /          -> ingest_event
/// POST   /publish   -> publish_event
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(events::ingest_event))
        .route("/publish", post(events::publish_event))
}
