//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] lets in-process producers (the schedule engine, truck
//! tracking, the reward engine) publish [`InboundEvent`]s without waiting on
//! the pipeline. It is designed to be shared via `Arc<EventBus>`.
//!
//! Publishing is fire-and-forget: a producer that needs to know whether its
//! event was classified and stored must call
//! [`NotificationPipeline::ingest`](crate::NotificationPipeline::ingest)
//! directly instead.

use gerobaks_core::classifier::InboundEvent;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use gerobaks_core::classifier::InboundEvent;
/// use gerobaks_events::bus::EventBus;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(InboundEvent::new(1, "app_update").with_field("version", "2.1.0"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<InboundEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see the event. With no
    /// subscribers the event is dropped and a warning is logged.
    pub fn publish(&self, event: InboundEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::warn!(
                    event_type = %event.event_type,
                    recipient_id = event.recipient_id,
                    "Event published with no subscribers, dropped"
                );
                0
            }
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<InboundEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
