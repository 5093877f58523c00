//! Presentation surfaces beyond the in-process WebSocket hub.
//!
//! The API crate owns the WebSocket sink; these sinks reach devices through
//! an external push relay and combine several surfaces into one.

pub mod fanout;
pub mod push_relay;
