//! Handlers for the `/notifications` resource.
//!
//! Every endpoint acts on the [`Recipient`] named by the gateway and only
//! ever sees that recipient's records.

use axum::extract::{Path, Query, State};
use axum::Json;
use gerobaks_core::error::CoreError;
use gerobaks_core::notification::Notification;
use gerobaks_core::summary::UnreadSummary;
use gerobaks_core::types::DbId;
use gerobaks_db::models::notification::NotificationFilter;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::recipient::Recipient;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// List the recipient's notifications, newest first, with optional
/// `is_read`, `priority` and `category` filters and `limit`/`offset` paging.
pub async fn list_notifications(
    recipient: Recipient,
    State(state): State<AppState>,
    Query(filter): Query<NotificationFilter>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let notifications = state
        .store
        .list_by_recipient(recipient.recipient_id, &filter)
        .await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    recipient: Recipient,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let notification = state
        .store
        .get(id)
        .await?
        .filter(|n| n.recipient_id == recipient.recipient_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }))?;

    Ok(Json(DataResponse { data: notification }))
}

/// GET /api/v1/notifications/unread-summary
///
/// Unread total, per-priority breakdown and whether the red dot is shown.
pub async fn unread_summary(
    recipient: Recipient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadSummary>>> {
    let summary = state.tracker.unread_summary(recipient.recipient_id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    recipient: Recipient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = state.tracker.unread_count(recipient.recipient_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { count },
    }))
}

// ---------------------------------------------------------------------------
// Read state
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/{id}/read
///
/// Mark one notification read and return it. Repeating the call returns
/// the record with its original `read_at`. 404 if the notification does not
/// belong to the recipient.
pub async fn mark_read(
    recipient: Recipient,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let notification = state.tracker.mark_read(recipient.recipient_id, id).await?;
    Ok(Json(DataResponse { data: notification }))
}

/// POST /api/v1/notifications/read-all
///
/// Mark all of the recipient's notifications read. Returns how many changed.
pub async fn mark_all_read(
    recipient: Recipient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = state.tracker.mark_all_read(recipient.recipient_id).await?;
    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}
