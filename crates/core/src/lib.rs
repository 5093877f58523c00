//! Gerobaks notification domain.
//!
//! Pure types and logic shared by every other crate in the workspace:
//!
//! - [`notification`] -- the notification entity, its closed classification
//!   sets, and the typed payload variants.
//! - [`classifier`] -- turns an inbound domain event into a notification
//!   record ready to be stored.
//! - [`summary`] -- unread-count aggregates used by the client badge.
//! - [`presentation`] -- the on-device presentation request shape.

pub mod classifier;
pub mod error;
pub mod notification;
pub mod presentation;
pub mod summary;
pub mod types;
