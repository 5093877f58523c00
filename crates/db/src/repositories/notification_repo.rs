//! Repository for the `notifications` table.

use gerobaks_core::notification::NewNotification;
use gerobaks_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::notification::{NotificationFilter, NotificationRow};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, recipient_id, type, category, title, message, icon, priority, \
    data, is_read, read_at, created_at";

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification, returning the stored row.
    ///
    /// `data` is the already-encoded payload blob.
    pub async fn create(
        pool: &PgPool,
        input: &NewNotification,
        data: &serde_json::Value,
    ) -> Result<NotificationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications \
                (recipient_id, type, category, title, message, icon, priority, data, \
                 is_read, read_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(input.recipient_id)
            .bind(input.kind().as_str())
            .bind(input.category.as_str())
            .bind(&input.title)
            .bind(&input.message)
            .bind(&input.icon)
            .bind(input.priority.as_str())
            .bind(data)
            .bind(input.read_state.is_read())
            .bind(input.read_state.read_at())
            .fetch_one(pool)
            .await
    }

    /// Find a notification by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<NotificationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a recipient's notifications, newest first.
    ///
    /// Unset filter fields bind as `NULL` and match every row.
    pub async fn list_for_recipient(
        pool: &PgPool,
        recipient_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<NotificationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE recipient_id = $1 \
               AND ($2::BOOLEAN IS NULL OR is_read = $2) \
               AND ($3::TEXT IS NULL OR priority = $3) \
               AND ($4::TEXT IS NULL OR category = $4) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(recipient_id)
            .bind(filter.is_read)
            .bind(filter.priority.map(|p| p.as_str()))
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.effective_limit())
            .bind(filter.effective_offset())
            .fetch_all(pool)
            .await
    }

    /// Get the number of unread notifications for a recipient.
    pub async fn unread_count(pool: &PgPool, recipient_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Unread counts grouped by priority text.
    ///
    /// Priorities with no unread rows are absent from the result.
    pub async fn unread_count_by_priority(
        pool: &PgPool,
        recipient_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT priority, COUNT(*) FROM notifications \
             WHERE recipient_id = $1 AND is_read = false \
             GROUP BY priority",
        )
        .bind(recipient_id)
        .fetch_all(pool)
        .await
    }

    /// Flip a notification to read.
    ///
    /// Only unread rows are updated, so concurrent callers cannot overwrite
    /// an earlier `read_at`. Returns `None` when nothing changed (the row is
    /// already read or does not exist).
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<NotificationRow>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications \
             SET is_read = true, read_at = $2 \
             WHERE id = $1 AND is_read = false \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    /// Mark all unread notifications as read for a recipient.
    ///
    /// Returns the number of notifications that were marked read.
    pub async fn mark_all_read(
        pool: &PgPool,
        recipient_id: DbId,
        at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = $2 \
             WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(recipient_id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
