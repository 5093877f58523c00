//! Read/unread transitions and badge summaries.
//!
//! Records start unread; [`ReadStateTracker`] moves them to read, either one
//! at a time or for a whole recipient, and derives the unread summary that
//! drives the client badge and red-dot indicator.

use std::sync::Arc;

use gerobaks_core::notification::Notification;
use gerobaks_core::summary::UnreadSummary;
use gerobaks_core::types::DbId;
use gerobaks_db::{NotificationStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ReadStateError {
    /// No such record for this recipient. Records owned by someone else are
    /// reported the same way so ids do not leak across households.
    #[error("Notification {id} not found")]
    NotFound { id: DbId },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub struct ReadStateTracker {
    store: Arc<dyn NotificationStore>,
}

impl ReadStateTracker {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Mark one of the recipient's records read.
    ///
    /// Idempotent: marking an already-read record returns it unchanged with
    /// its original `read_at`.
    pub async fn mark_read(
        &self,
        recipient_id: DbId,
        id: DbId,
    ) -> Result<Notification, ReadStateError> {
        match self.store.get(id).await? {
            Some(record) if record.recipient_id == recipient_id => {}
            _ => return Err(ReadStateError::NotFound { id }),
        }

        let record = self
            .store
            .mark_read(id, chrono::Utc::now())
            .await?
            .ok_or(ReadStateError::NotFound { id })?;

        tracing::debug!(notification_id = id, recipient_id, "Notification marked read");
        Ok(record)
    }

    /// Mark every unread record of the recipient read. Returns how many
    /// records changed state.
    pub async fn mark_all_read(&self, recipient_id: DbId) -> Result<u64, ReadStateError> {
        let updated = self
            .store
            .mark_all_read(recipient_id, chrono::Utc::now())
            .await?;
        tracing::debug!(recipient_id, updated, "Marked all notifications read");
        Ok(updated)
    }

    /// Unread count with per-priority breakdown and the urgent flag.
    pub async fn unread_summary(&self, recipient_id: DbId) -> Result<UnreadSummary, ReadStateError> {
        let counts = self.store.unread_by_priority(recipient_id).await?;
        Ok(UnreadSummary::from(counts))
    }

    /// Plain unread count for the badge number.
    pub async fn unread_count(&self, recipient_id: DbId) -> Result<i64, ReadStateError> {
        Ok(self.store.count_unread(recipient_id).await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
