//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require the `x-recipient-id` header.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                  -> list_notifications
/// GET    /unread-summary    -> unread_summary
/// GET    /unread-count      -> unread_count
/// POST   /read-all          -> mark_all_read
/// GET    /{id}              -> get_notification
/// POST   /{id}/read         -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/unread-summary", get(notification::unread_summary))
        .route("/unread-count", get(notification::unread_count))
        .route("/read-all", post(notification::mark_all_read))
        .route("/{id}", get(notification::get_notification))
        .route("/{id}/read", post(notification::mark_read))
}
