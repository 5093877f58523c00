//! Fire-and-forget on-device presentation.
//!
//! The pipeline hands each freshly stored record to [`DeliveryPresenter`],
//! which only enqueues it on a bounded channel. A [`PresenterWorker`] drains
//! the channel and calls the configured [`PresentationSink`] under a timeout.
//! Nothing that happens past the queue is reported back to the producer:
//! failures are logged and the stored record is untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gerobaks_core::notification::Notification;
use gerobaks_core::presentation::PresentationRequest;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default number of requests buffered before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default upper bound on a single sink call.
pub const DEFAULT_PRESENTATION_TIMEOUT: Duration = Duration::from_millis(2000);

// ---------------------------------------------------------------------------
// Sink seam
// ---------------------------------------------------------------------------

/// What happened to a presentation request at the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// At least one client showed (or accepted) the notification.
    Delivered,
    /// No reachable client with presentation enabled; the record waits in
    /// the store for the next list fetch.
    Dormant,
}

/// Why a presentation attempt did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresentationFailure {
    #[error("Presentation queue is full")]
    QueueFull,

    #[error("Presentation worker has stopped")]
    WorkerStopped,

    #[error("Presentation timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },

    #[error("Presentation sink failed: {0}")]
    Sink(String),
}

/// A surface able to show a notification on the recipient's device.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    async fn present(
        &self,
        request: &PresentationRequest,
    ) -> Result<PresentOutcome, PresentationFailure>;
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterConfig {
    pub queue_capacity: usize,
    pub timeout: Duration,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout: DEFAULT_PRESENTATION_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// DeliveryPresenter
// ---------------------------------------------------------------------------

/// Producer side of the presentation queue. Cheap to clone.
#[derive(Clone)]
pub struct DeliveryPresenter {
    sender: mpsc::Sender<PresentationRequest>,
}

impl DeliveryPresenter {
    /// Build a presenter and its (not yet running) worker.
    pub fn new(sink: Arc<dyn PresentationSink>, config: PresenterConfig) -> (Self, PresenterWorker) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let worker = PresenterWorker {
            sink,
            receiver,
            timeout: config.timeout,
        };
        (Self { sender }, worker)
    }

    /// Build a presenter and run its worker on the current runtime.
    ///
    /// The worker stops once every clone of the presenter is dropped and the
    /// queue has drained.
    pub fn spawn(sink: Arc<dyn PresentationSink>, config: PresenterConfig) -> (Self, JoinHandle<()>) {
        let (presenter, worker) = Self::new(sink, config);
        (presenter, tokio::spawn(worker.run()))
    }

    /// Enqueue a stored record for presentation without waiting.
    ///
    /// The returned error only describes the hand-off; callers are free to
    /// ignore it since it is already logged.
    pub fn present(&self, record: &Notification) -> Result<(), PresentationFailure> {
        let request = PresentationRequest::from(record);
        match self.sender.try_send(request) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(request)) => {
                tracing::warn!(
                    notification_id = request.notification_id,
                    recipient_id = request.recipient_id,
                    "Presentation queue full, request dropped"
                );
                Err(PresentationFailure::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(request)) => {
                tracing::warn!(
                    notification_id = request.notification_id,
                    "Presentation worker stopped, request dropped"
                );
                Err(PresentationFailure::WorkerStopped)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PresenterWorker
// ---------------------------------------------------------------------------

/// Consumer side of the presentation queue.
pub struct PresenterWorker {
    sink: Arc<dyn PresentationSink>,
    receiver: mpsc::Receiver<PresentationRequest>,
    timeout: Duration,
}

impl PresenterWorker {
    /// Present queued requests one at a time until the queue closes.
    pub async fn run(mut self) {
        while let Some(request) = self.receiver.recv().await {
            match self.present_one(&request).await {
                Ok(PresentOutcome::Delivered) => {
                    tracing::debug!(
                        notification_id = request.notification_id,
                        recipient_id = request.recipient_id,
                        "Notification presented"
                    );
                }
                Ok(PresentOutcome::Dormant) => {
                    tracing::debug!(
                        notification_id = request.notification_id,
                        recipient_id = request.recipient_id,
                        "No reachable client, notification left for next fetch"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        notification_id = request.notification_id,
                        recipient_id = request.recipient_id,
                        error = %e,
                        "Presentation failed"
                    );
                }
            }
        }
        tracing::info!("Presentation queue closed, presenter shutting down");
    }

    async fn present_one(
        &self,
        request: &PresentationRequest,
    ) -> Result<PresentOutcome, PresentationFailure> {
        match tokio::time::timeout(self.timeout, self.sink.present(request)).await {
            Ok(result) => result,
            Err(_) => Err(PresentationFailure::TimedOut {
                after_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use gerobaks_core::classifier::{classify, InboundEvent};
    use gerobaks_core::presentation::Urgency;

    use super::*;

    struct RecordingSink {
        seen: Mutex<Vec<PresentationRequest>>,
    }

    #[async_trait]
    impl PresentationSink for RecordingSink {
        async fn present(
            &self,
            request: &PresentationRequest,
        ) -> Result<PresentOutcome, PresentationFailure> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(PresentOutcome::Delivered)
        }
    }

    struct StalledSink;

    #[async_trait]
    impl PresentationSink for StalledSink {
        async fn present(
            &self,
            _request: &PresentationRequest,
        ) -> Result<PresentOutcome, PresentationFailure> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(PresentOutcome::Delivered)
        }
    }

    fn stored(id: i64) -> Notification {
        let event = InboundEvent::new(1, "truck_proximity")
            .with_field("waste_type", "Organik")
            .with_field("distance", "500m")
            .with_field("eta", "5 menit");
        Notification::from_new(id, chrono::Utc::now(), classify(&event).unwrap())
    }

    #[tokio::test]
    async fn worker_presents_queued_requests_in_order() {
        let sink = Arc::new(RecordingSink {
            seen: Mutex::new(Vec::new()),
        });
        let (presenter, handle) = DeliveryPresenter::spawn(sink.clone(), PresenterConfig::default());

        presenter.present(&stored(1)).unwrap();
        presenter.present(&stored(2)).unwrap();
        drop(presenter);
        handle.await.unwrap();

        let seen = sink.seen.lock().unwrap();
        let ids: Vec<i64> = seen.iter().map(|r| r.notification_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(seen[0].urgency, Urgency::Critical);
    }

    #[tokio::test]
    async fn full_queue_drops_the_request() {
        let config = PresenterConfig {
            queue_capacity: 1,
            ..PresenterConfig::default()
        };
        let (presenter, _worker) = DeliveryPresenter::new(Arc::new(StalledSink), config);

        presenter.present(&stored(1)).unwrap();
        assert_matches!(
            presenter.present(&stored(2)),
            Err(PresentationFailure::QueueFull)
        );
    }

    #[tokio::test]
    async fn stopped_worker_is_reported() {
        let (presenter, worker) =
            DeliveryPresenter::new(Arc::new(StalledSink), PresenterConfig::default());
        drop(worker);

        assert_matches!(
            presenter.present(&stored(1)),
            Err(PresentationFailure::WorkerStopped)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sink_times_out() {
        let config = PresenterConfig {
            queue_capacity: 4,
            timeout: Duration::from_millis(50),
        };
        let (_presenter, worker) = DeliveryPresenter::new(Arc::new(StalledSink), config);
        let request = PresentationRequest::from(&stored(1));

        assert_matches!(
            worker.present_one(&request).await,
            Err(PresentationFailure::TimedOut { after_ms: 50 })
        );
    }

    #[test]
    fn default_config_values() {
        let config = PresenterConfig::default();
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.timeout, Duration::from_millis(2000));
    }
}
