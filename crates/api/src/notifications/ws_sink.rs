//! WebSocket presentation sink.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Message;
use gerobaks_core::presentation::PresentationRequest;
use gerobaks_events::{PresentOutcome, PresentationFailure, PresentationSink};

use crate::ws::WsManager;

/// Pushes presentation requests to the recipient's connected clients.
///
/// A recipient with no connection, or whose connections all have
/// presentation disabled, is `Dormant`: the record is picked up by the next
/// list fetch instead.
pub struct WsPresentationSink {
    ws_manager: Arc<WsManager>,
}

impl WsPresentationSink {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }
}

#[async_trait]
impl PresentationSink for WsPresentationSink {
    async fn present(
        &self,
        request: &PresentationRequest,
    ) -> Result<PresentOutcome, PresentationFailure> {
        let frame = Message::Text(request.to_message().to_string().into());
        let sent = self
            .ws_manager
            .present_to_recipient(request.recipient_id, frame)
            .await;

        if sent == 0 {
            Ok(PresentOutcome::Dormant)
        } else {
            tracing::debug!(
                notification_id = request.notification_id,
                connections = sent,
                "Notification pushed to WebSocket clients"
            );
            Ok(PresentOutcome::Delivered)
        }
    }
}
