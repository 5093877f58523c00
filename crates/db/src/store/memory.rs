use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use gerobaks_core::notification::{NewNotification, Notification};
use gerobaks_core::summary::PriorityCounts;
use gerobaks_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::notification::NotificationFilter;

use super::NotificationStore;

/// Per-recipient index: record ids in creation order plus running unread
/// counters, so badge counts never scan the records.
#[derive(Default)]
struct RecipientIndex {
    ids: Vec<DbId>,
    unread: PriorityCounts,
}

#[derive(Default)]
struct Inner {
    next_id: DbId,
    last_created_at: Option<Timestamp>,
    records: HashMap<DbId, Notification>,
    by_recipient: HashMap<DbId, RecipientIndex>,
}

/// In-process [`NotificationStore`].
///
/// A single `RwLock` guards all state, so every completed write is visible
/// to the next read. Creation timestamps never go backwards even if the wall
/// clock does.
pub struct MemoryNotificationStore {
    inner: RwLock<Inner>,
    known_recipients: Option<HashSet<DbId>>,
}

impl MemoryNotificationStore {
    /// A store that accepts any positive recipient id.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            known_recipients: None,
        }
    }

    /// A store that rejects records for recipients outside `recipients`,
    /// mirroring a foreign key to a user table.
    pub fn with_recipients(recipients: impl IntoIterator<Item = DbId>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            known_recipients: Some(recipients.into_iter().collect()),
        }
    }

    /// Total number of stored records across all recipients.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, record: NewNotification) -> Result<Notification, StoreError> {
        record.validate()?;
        if let Some(known) = &self.known_recipients {
            if !known.contains(&record.recipient_id) {
                return Err(StoreError::Constraint(format!(
                    "unknown recipient {}",
                    record.recipient_id
                )));
            }
        }
        // Same check the `data` column imposes: the payload must encode.
        record.payload.to_json()?;

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;

        let now = chrono::Utc::now();
        let created_at = inner.last_created_at.map_or(now, |last| last.max(now));
        inner.last_created_at = Some(created_at);

        let stored = Notification::from_new(id, created_at, record);
        let index = inner.by_recipient.entry(stored.recipient_id).or_default();
        index.ids.push(id);
        if !stored.is_read() {
            index.unread.add(stored.priority, 1);
        }
        inner.records.insert(id, stored.clone());

        Ok(stored)
    }

    async fn get(&self, id: DbId) -> Result<Option<Notification>, StoreError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn list_by_recipient(
        &self,
        recipient_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, StoreError> {
        let inner = self.inner.read().await;
        let Some(index) = inner.by_recipient.get(&recipient_id) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<&Notification> = index
            .ids
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|record| filter.matches(record))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        // Both values are clamped non-negative by the filter.
        let offset = filter.effective_offset() as usize;
        let limit = filter.effective_limit() as usize;
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_unread(&self, recipient_id: DbId) -> Result<i64, StoreError> {
        Ok(self.unread_by_priority(recipient_id).await?.total())
    }

    async fn unread_by_priority(&self, recipient_id: DbId) -> Result<PriorityCounts, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .by_recipient
            .get(&recipient_id)
            .map(|index| index.unread)
            .unwrap_or_default())
    }

    async fn mark_read(
        &self,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<Notification>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.records.get_mut(&id) else {
            return Ok(None);
        };
        if record.is_read() {
            return Ok(Some(record.clone()));
        }

        record.read_state = record.read_state.mark_read(at);
        let updated = record.clone();
        if let Some(index) = inner.by_recipient.get_mut(&updated.recipient_id) {
            index.unread.decrement(updated.priority);
        }
        Ok(Some(updated))
    }

    async fn mark_all_read(&self, recipient_id: DbId, at: Timestamp) -> Result<u64, StoreError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let Some(index) = inner.by_recipient.get_mut(&recipient_id) else {
            return Ok(0);
        };

        let mut flipped = 0;
        for id in &index.ids {
            if let Some(record) = inner.records.get_mut(id) {
                if !record.is_read() {
                    record.read_state = record.read_state.mark_read(at);
                    flipped += 1;
                }
            }
        }
        index.unread = PriorityCounts::default();
        Ok(flipped)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use gerobaks_core::notification::{
        Category, InfoPayload, NotificationPayload, Priority, ReadState, RewardPayload,
    };

    use super::*;

    fn record(recipient_id: DbId, priority: Priority) -> NewNotification {
        NewNotification {
            recipient_id,
            category: Category::Points,
            title: "Selamat! Anda Mendapat 50 Poin".to_string(),
            message: "Poin reward telah ditambahkan ke akun Anda.".to_string(),
            icon: "stars".to_string(),
            priority,
            payload: NotificationPayload::Info(InfoPayload::Reward(RewardPayload {
                points: 50,
                total_points: 350,
                reason: "waste_pickup_completed".to_string(),
            })),
            read_state: ReadState::Unread,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = MemoryNotificationStore::new();
        let input = record(1, Priority::Low);

        let created = store.create(input.clone()).await.unwrap();
        let fetched = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched, Notification::from_new(created.id, created.created_at, input));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = MemoryNotificationStore::new();
        assert!(store.get(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_unique_and_listing_is_newest_first() {
        let store = MemoryNotificationStore::new();
        for _ in 0..5 {
            store.create(record(1, Priority::Normal)).await.unwrap();
        }

        let listed = store
            .list_by_recipient(1, &NotificationFilter::default())
            .await
            .unwrap();

        assert_eq!(listed.len(), 5);
        let ids: Vec<DbId> = listed.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn listing_is_scoped_to_recipient_and_filtered() {
        let store = MemoryNotificationStore::new();
        store.create(record(1, Priority::Urgent)).await.unwrap();
        store.create(record(1, Priority::Low)).await.unwrap();
        store.create(record(2, Priority::Urgent)).await.unwrap();

        let urgent = NotificationFilter {
            priority: Some(Priority::Urgent),
            ..NotificationFilter::default()
        };
        let listed = store.list_by_recipient(1, &urgent).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recipient_id, 1);

        let none = NotificationFilter {
            category: Some(Category::Update),
            ..NotificationFilter::default()
        };
        assert!(store.list_by_recipient(1, &none).await.unwrap().is_empty());
        assert!(store
            .list_by_recipient(99, &NotificationFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn pagination_applies_after_ordering() {
        let store = MemoryNotificationStore::new();
        for _ in 0..4 {
            store.create(record(1, Priority::Normal)).await.unwrap();
        }
        let page = NotificationFilter {
            limit: Some(2),
            offset: Some(1),
            ..NotificationFilter::default()
        };
        let ids: Vec<DbId> = store
            .list_by_recipient(1, &page)
            .await
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let store = MemoryNotificationStore::new();
        let created = store.create(record(1, Priority::High)).await.unwrap();

        let first_at = chrono::Utc::now();
        let first = store.mark_read(created.id, first_at).await.unwrap().unwrap();
        let second = store
            .mark_read(created.id, first_at + chrono::Duration::minutes(5))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.read_at(), Some(first_at));
        assert_eq!(second, first);
        assert_eq!(store.count_unread(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_read_missing_returns_none() {
        let store = MemoryNotificationStore::new();
        assert!(store.mark_read(1, chrono::Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn count_unread_tracks_creates_and_reads() {
        let store = MemoryNotificationStore::new();
        let now = chrono::Utc::now();
        let a = store.create(record(1, Priority::High)).await.unwrap();
        store.create(record(1, Priority::Urgent)).await.unwrap();
        store
            .create(record(1, Priority::Low).already_read(now))
            .await
            .unwrap();

        assert_eq!(store.count_unread(1).await.unwrap(), 2);
        store.mark_read(a.id, now).await.unwrap();
        assert_eq!(store.count_unread(1).await.unwrap(), 1);

        let counts = store.unread_by_priority(1).await.unwrap();
        assert_eq!(counts.urgent, 1);
        assert_eq!(counts.high, 0);
        assert_eq!(counts.low, 0);

        let unread = store
            .list_by_recipient(1, &NotificationFilter::unread())
            .await
            .unwrap();
        assert_eq!(unread.len() as i64, store.count_unread(1).await.unwrap());
    }

    #[tokio::test]
    async fn mark_all_read_flips_only_unread() {
        let store = MemoryNotificationStore::new();
        let now = chrono::Utc::now();
        store.create(record(1, Priority::High)).await.unwrap();
        store.create(record(1, Priority::Urgent)).await.unwrap();
        store
            .create(record(1, Priority::Low).already_read(now))
            .await
            .unwrap();
        store.create(record(2, Priority::Low)).await.unwrap();

        assert_eq!(store.mark_all_read(1, now).await.unwrap(), 2);
        assert_eq!(store.count_unread(1).await.unwrap(), 0);
        assert_eq!(store.count_unread(2).await.unwrap(), 1);
        assert_eq!(store.mark_all_read(1, now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn constraint_violations_are_rejected() {
        let store = MemoryNotificationStore::with_recipients([1]);

        assert_matches!(
            store.create(record(2, Priority::Low)).await,
            Err(StoreError::Constraint(msg)) if msg.contains("unknown recipient 2")
        );
        assert_matches!(
            store.create(record(0, Priority::Low)).await,
            Err(StoreError::Constraint(_))
        );

        let mut empty_title = record(1, Priority::Low);
        empty_title.title = String::new();
        assert_matches!(store.create(empty_title).await, Err(StoreError::Constraint(_)));

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_mark_read_keeps_a_single_timestamp() {
        let store = Arc::new(MemoryNotificationStore::new());
        let created = store.create(record(1, Priority::Urgent)).await.unwrap();

        let base = chrono::Utc::now();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .mark_read(created.id, base + chrono::Duration::seconds(i))
                        .await
                        .unwrap()
                        .unwrap()
                })
            })
            .collect();

        let mut stamps = Vec::new();
        for handle in handles {
            stamps.push(handle.await.unwrap().read_at());
        }
        assert!(stamps.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(store.unread_by_priority(1).await.unwrap().urgent, 0);
    }
}
