//! Background consumer feeding bus events into the pipeline.
//!
//! [`EventIngestor`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and runs every received event through
//! [`NotificationPipeline::ingest`](crate::NotificationPipeline::ingest).
//! Publishers on the bus get no result back, so failures end up in the log.
//! The loop exits when the bus is dropped.

use std::sync::Arc;

use gerobaks_core::classifier::InboundEvent;
use tokio::sync::broadcast;

use crate::pipeline::NotificationPipeline;

/// Background service that turns bus events into stored notifications.
pub struct EventIngestor;

impl EventIngestor {
    /// Run the ingest loop until the channel closes.
    pub async fn run(
        pipeline: Arc<NotificationPipeline>,
        mut receiver: broadcast::Receiver<InboundEvent>,
    ) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = pipeline.ingest(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            recipient_id = event.recipient_id,
                            "Failed to ingest bus event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event ingestor lagged, some events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, ingestor shutting down");
                    break;
                }
            }
        }
    }
}
