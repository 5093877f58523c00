//! Gerobaks notification pipeline.
//!
//! Wires the pure classifier from `gerobaks_core` to a
//! [`NotificationStore`](gerobaks_db::NotificationStore) and the delivery
//! presenter:
//!
//! - [`NotificationPipeline`] -- classify, persist, hand off for presentation.
//! - [`ReadStateTracker`] -- read/unread transitions and badge summaries.
//! - [`DeliveryPresenter`] / [`PresenterWorker`] -- fire-and-forget on-device
//!   presentation through a [`PresentationSink`].
//! - [`EventBus`] / [`EventIngestor`] -- in-process publish/subscribe for
//!   producers that do not need the pipeline result.

pub mod bus;
pub mod delivery;
pub mod ingest;
pub mod pipeline;
pub mod presenter;
pub mod read_state;

pub use bus::EventBus;
pub use delivery::fanout::FanoutSink;
pub use delivery::push_relay::PushRelaySink;
pub use ingest::EventIngestor;
pub use pipeline::{NotificationPipeline, PipelineError};
pub use presenter::{
    DeliveryPresenter, PresentOutcome, PresentationFailure, PresentationSink, PresenterConfig,
    PresenterWorker,
};
pub use read_state::{ReadStateError, ReadStateTracker};
