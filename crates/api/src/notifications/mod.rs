//! Presentation surfaces owned by the API server.
//!
//! [`WsPresentationSink`] shows freshly created notifications on the
//! recipient's connected clients.

pub mod ws_sink;

pub use ws_sink::WsPresentationSink;
