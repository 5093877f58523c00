//! Storage error type shared by every [`NotificationStore`](crate::NotificationStore)
//! implementation.

use gerobaks_core::notification::InvalidNotification;
use gerobaks_core::types::DbId;

/// PostgreSQL `check_violation`.
const PG_CHECK_VIOLATION: &str = "23514";
/// PostgreSQL `not_null_violation`.
const PG_NOT_NULL_VIOLATION: &str = "23502";
/// PostgreSQL `foreign_key_violation`.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Failure to persist or load a notification record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record breaks a storage constraint (unknown recipient, empty text,
    /// inconsistent read state, ...).
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The payload could not be encoded as JSON.
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row cannot be turned back into a notification.
    #[error("Corrupt notification record {id}: {reason}")]
    Corrupt { id: DbId, reason: String },

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<InvalidNotification> for StoreError {
    fn from(err: InvalidNotification) -> Self {
        StoreError::Constraint(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code();
            if matches!(
                code.as_deref(),
                Some(PG_CHECK_VIOLATION | PG_NOT_NULL_VIOLATION | PG_FOREIGN_KEY_VIOLATION)
            ) {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return StoreError::Constraint(format!("{constraint}: {}", db_err.message()));
            }
        }
        StoreError::Database(err)
    }
}
