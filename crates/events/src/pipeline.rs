//! Event-to-record pipeline.
//!
//! [`NotificationPipeline::ingest`] is the synchronous entry point for
//! producers: classify the event, persist the record, then hand the stored
//! record to the [`DeliveryPresenter`]. The producer sees classification and
//! storage failures; presentation never fails the call.

use std::sync::Arc;

use gerobaks_core::classifier::{classify, ClassificationError, InboundEvent};
use gerobaks_core::notification::Notification;
use gerobaks_db::{NotificationStore, StoreError};

use crate::presenter::DeliveryPresenter;

/// Why an event did not produce a stored notification.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Classifier, store and presenter wired together.
pub struct NotificationPipeline {
    store: Arc<dyn NotificationStore>,
    presenter: DeliveryPresenter,
}

impl NotificationPipeline {
    pub fn new(store: Arc<dyn NotificationStore>, presenter: DeliveryPresenter) -> Self {
        Self { store, presenter }
    }

    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }

    /// Turn one inbound event into a stored, unread notification.
    ///
    /// Nothing is stored when classification fails. Presentation is only
    /// attempted after the record is durable.
    pub async fn ingest(&self, event: &InboundEvent) -> Result<Notification, PipelineError> {
        let record = classify(event).map_err(|e| {
            tracing::warn!(
                event_type = %event.event_type,
                recipient_id = event.recipient_id,
                error = %e,
                "Event rejected by classifier"
            );
            e
        })?;

        let stored = self.store.create(record).await.map_err(|e| {
            tracing::error!(
                event_type = %event.event_type,
                recipient_id = event.recipient_id,
                error = %e,
                "Failed to store notification"
            );
            e
        })?;

        tracing::info!(
            notification_id = stored.id,
            recipient_id = stored.recipient_id,
            kind = %stored.kind,
            priority = %stored.priority,
            "Notification created"
        );

        // Hand-off failures are already logged by the presenter.
        let _ = self.presenter.present(&stored);

        Ok(stored)
    }
}
