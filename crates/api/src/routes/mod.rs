pub mod events;
pub mod health;
pub mod notification;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket presentation surface
///
/// /notifications                       list (is_read, priority, category, limit, offset)
/// /notifications/unread-summary        unread total, per priority, red dot
/// /notifications/unread-count          unread total
/// /notifications/read-all              mark all read (POST)
/// /notifications/{id}                  get
/// /notifications/{id}/read             mark read (POST)
///
/// /events                              classify + store + present (POST)
/// /events/publish                      enqueue on the event bus (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/notifications", notification::router())
        .nest("/events", events::router())
}
