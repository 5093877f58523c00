//! The notification record store.
//!
//! [`NotificationStore`] is the only way the rest of the workspace reads or
//! writes notifications. It is object safe so the pipeline and the HTTP layer
//! can hold an `Arc<dyn NotificationStore>` and run against either backend:
//!
//! - [`PgNotificationStore`] -- PostgreSQL via [`NotificationRepo`](crate::repositories::NotificationRepo).
//! - [`MemoryNotificationStore`] -- process-local, for tests and local runs
//!   without a database.

use async_trait::async_trait;
use gerobaks_core::notification::{NewNotification, Notification};
use gerobaks_core::summary::PriorityCounts;
use gerobaks_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::notification::NotificationFilter;

mod memory;
mod postgres;

pub use memory::MemoryNotificationStore;
pub use postgres::PgNotificationStore;

/// Durable keyed storage for notification records.
///
/// Reads issued after a write has completed observe that write.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new record, assigning its `id` and `created_at`.
    async fn create(&self, record: NewNotification) -> Result<Notification, StoreError>;

    /// Look up a record. `None` means it does not exist.
    async fn get(&self, id: DbId) -> Result<Option<Notification>, StoreError>;

    /// A recipient's records, newest first (ties by descending id).
    async fn list_by_recipient(
        &self,
        recipient_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Number of unread records, computed without loading them.
    async fn count_unread(&self, recipient_id: DbId) -> Result<i64, StoreError>;

    /// Unread records per priority.
    async fn unread_by_priority(&self, recipient_id: DbId) -> Result<PriorityCounts, StoreError>;

    /// Mark a record read at `at`.
    ///
    /// Idempotent: an already-read record is returned unchanged, keeping its
    /// original `read_at`. `None` means the record does not exist.
    async fn mark_read(&self, id: DbId, at: Timestamp)
        -> Result<Option<Notification>, StoreError>;

    /// Mark every unread record of a recipient read. Returns how many flipped.
    async fn mark_all_read(&self, recipient_id: DbId, at: Timestamp) -> Result<u64, StoreError>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}
