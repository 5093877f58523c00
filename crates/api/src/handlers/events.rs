//! Handlers for the internal `/events` ingest resource.
//!
//! Producers (schedule engine, truck tracking, reward engine) submit domain
//! events here. This surface is meant for service-to-service traffic behind
//! the gateway and does not take a recipient header: the recipient is part
//! of the event.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gerobaks_core::classifier::InboundEvent;
use gerobaks_core::notification::Notification;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Published {
    pub subscribers: usize,
}

/// POST /api/v1/events
///
/// Classify, store and present one event. Returns 201 with the stored
/// record, 400 if the event cannot be classified, 422 if the store rejects
/// the record.
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<Notification>>)> {
    let notification = state.pipeline.ingest(&event).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: notification }),
    ))
}

/// POST /api/v1/events/publish
///
/// Queue an event on the in-process bus and return immediately with 202.
/// Classification and storage failures are only logged.
pub async fn publish_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> (StatusCode, Json<DataResponse<Published>>) {
    let subscribers = state.event_bus.publish(event);
    (
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: Published { subscribers },
        }),
    )
}
