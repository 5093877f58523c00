//! Notification row model and list filter.

use gerobaks_core::notification::{
    Category, Notification, NotificationPayload, NotificationType, Priority, ReadState,
};
use gerobaks_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

use crate::error::StoreError;

/// Default page size for notification listing.
pub const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for notification listing.
pub const MAX_LIMIT: i64 = 100;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: DbId,
    pub recipient_id: DbId,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub category: String,
    pub title: String,
    pub message: String,
    pub icon: String,
    pub priority: String,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |reason: String| StoreError::Corrupt { id, reason };

        let kind: NotificationType = row.kind.parse().map_err(|e| corrupt(format!("{e}")))?;
        let category: Category = row.category.parse().map_err(|e| corrupt(format!("{e}")))?;
        let priority: Priority = row.priority.parse().map_err(|e| corrupt(format!("{e}")))?;
        let payload = NotificationPayload::from_json(kind, row.data)
            .map_err(|e| corrupt(format!("payload does not match type '{kind}': {e}")))?;
        let read_state = ReadState::from_parts(row.is_read, row.read_at)
            .ok_or_else(|| corrupt("is_read and read_at disagree".to_string()))?;

        Ok(Notification {
            id,
            recipient_id: row.recipient_id,
            kind,
            category,
            title: row.title,
            message: row.message,
            icon: row.icon,
            priority,
            payload,
            read_state,
            created_at: row.created_at,
        })
    }
}

/// Filter for listing a recipient's notifications.
///
/// Every field is optional; an empty filter lists everything newest-first
/// in pages of [`DEFAULT_LIMIT`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    pub is_read: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    /// Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Defaults to 0.
    pub offset: Option<i64>,
}

impl NotificationFilter {
    pub fn unread() -> Self {
        Self {
            is_read: Some(false),
            ..Self::default()
        }
    }

    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Whether a record passes the non-pagination criteria.
    pub fn matches(&self, record: &Notification) -> bool {
        self.is_read.map_or(true, |r| record.is_read() == r)
            && self.priority.map_or(true, |p| record.priority == p)
            && self.category.map_or(true, |c| record.category == c)
    }
}
