use async_trait::async_trait;
use gerobaks_core::notification::{NewNotification, Notification, Priority};
use gerobaks_core::summary::PriorityCounts;
use gerobaks_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::notification::NotificationFilter;
use crate::repositories::NotificationRepo;
use crate::DbPool;

use super::NotificationStore;

/// [`NotificationStore`] backed by the `notifications` table.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, record: NewNotification) -> Result<Notification, StoreError> {
        record.validate()?;
        let data = record.payload.to_json()?;
        let row = NotificationRepo::create(&self.pool, &record, &data).await?;
        row.try_into()
    }

    async fn get(&self, id: DbId) -> Result<Option<Notification>, StoreError> {
        NotificationRepo::find_by_id(&self.pool, id)
            .await?
            .map(Notification::try_from)
            .transpose()
    }

    async fn list_by_recipient(
        &self,
        recipient_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, StoreError> {
        NotificationRepo::list_for_recipient(&self.pool, recipient_id, filter)
            .await?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    async fn count_unread(&self, recipient_id: DbId) -> Result<i64, StoreError> {
        Ok(NotificationRepo::unread_count(&self.pool, recipient_id).await?)
    }

    async fn unread_by_priority(&self, recipient_id: DbId) -> Result<PriorityCounts, StoreError> {
        let rows = NotificationRepo::unread_count_by_priority(&self.pool, recipient_id).await?;

        let mut counts = PriorityCounts::default();
        for (priority, count) in rows {
            match priority.parse::<Priority>() {
                Ok(p) => counts.add(p, count),
                Err(e) => {
                    tracing::warn!(recipient_id, error = %e, "Skipping unread rows with unknown priority");
                }
            }
        }
        Ok(counts)
    }

    async fn mark_read(
        &self,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<Notification>, StoreError> {
        if let Some(row) = NotificationRepo::mark_read(&self.pool, id, at).await? {
            return row.try_into().map(Some);
        }
        // Already read (or missing): report the row as it is.
        self.get(id).await
    }

    async fn mark_all_read(&self, recipient_id: DbId, at: Timestamp) -> Result<u64, StoreError> {
        Ok(NotificationRepo::mark_all_read(&self.pool, recipient_id, at).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
