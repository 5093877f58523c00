//! Request extractors shared by handlers.
//!
//! - [`recipient::Recipient`] -- the household the request acts for.

pub mod recipient;
