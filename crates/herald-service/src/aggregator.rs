//! Cached unread-count aggregation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use herald_cache::keys;
use herald_core::config::cache::CacheConfig;
use herald_core::result::AppResult;
use herald_core::traits::cache::CacheProvider;
use herald_core::types::id::RecipientId;
use herald_database::NotificationStore;
use herald_entity::recipient::{UnreadCounts, UnreadSummary};

/// Serves per-recipient aggregate counts through a read-through cache.
///
/// The store is authoritative; the cache is an optimization with
/// invalidate-on-write plus a TTL backstop. A cache failure degrades to a
/// cold computation and is logged, never propagated.
#[derive(Debug, Clone)]
pub struct UnreadAggregator {
    store: Arc<dyn NotificationStore>,
    cache: Arc<dyn CacheProvider>,
    ttl: Duration,
}

impl UnreadAggregator {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        cache: Arc<dyn CacheProvider>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            store,
            cache,
            ttl: Duration::from_secs(config.counts_ttl_seconds),
        }
    }

    /// The recipient's aggregate counts, cached.
    pub async fn counts(
        &self,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<UnreadCounts> {
        let key = keys::unread_counts(recipient_id);

        match self.cache.get_json::<UnreadCounts>(&key).await {
            Ok(Some(counts)) => return Ok(counts),
            Ok(None) => {}
            Err(e) => {
                warn!(%recipient_id, error = %e, "Cache read failed, computing cold");
                let _ = self.cache.delete(&key).await;
            }
        }

        let counts = self.store.counts(recipient_id, now).await?;

        if let Err(e) = self.cache.set_json(&key, &counts, self.ttl).await {
            warn!(%recipient_id, error = %e, "Failed to cache counts");
        }

        Ok(counts)
    }

    /// The compact badge summary derived from [`Self::counts`].
    pub async fn summary(
        &self,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<UnreadSummary> {
        Ok(self.counts(recipient_id, now).await?.into())
    }

    /// Drop the cached counts for one recipient. Called after every
    /// mutation that changed that recipient's state.
    pub async fn invalidate(&self, recipient_id: RecipientId) {
        let key = keys::unread_counts(recipient_id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(%recipient_id, error = %e, "Failed to invalidate cached counts");
        }
    }

    /// Drop every cached entry. Used after administrative operations that
    /// change visibility for an unknown set of recipients.
    pub async fn invalidate_all(&self) {
        if let Err(e) = self.cache.flush_all().await {
            warn!(error = %e, "Failed to flush counts cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_cache::MemoryCacheProvider;
    use herald_core::types::id::NotificationId;
    use herald_database::memory::MemoryNotificationStore;
    use herald_entity::notification::{
        CreatorSnapshot, Notification, NotificationKind, Priority, TargetingMode,
    };
    use herald_entity::recipient::Surface;

    fn aggregator(store: Arc<MemoryNotificationStore>) -> UnreadAggregator {
        let config = CacheConfig::default();
        UnreadAggregator::new(
            store,
            Arc::new(MemoryCacheProvider::new(&config)),
            &config,
        )
    }

    async fn seed(store: &MemoryNotificationStore, recipient: RecipientId) -> NotificationId {
        let notification = Notification {
            id: NotificationId::new(),
            kind: NotificationKind::Announcement,
            title: "t".to_string(),
            body: "b".to_string(),
            priority: Priority::Medium,
            creator: CreatorSnapshot::system(),
            targeting_mode: TargetingMode::Single,
            created_at: Utc::now(),
            expires_at: None,
            active: true,
        };
        store.insert_notification(&notification).await.unwrap();
        store
            .insert_states_if_absent(notification.id, &[recipient], notification.created_at)
            .await
            .unwrap();
        notification.id
    }

    #[tokio::test]
    async fn test_cached_counts_match_cold_computation() {
        let store = Arc::new(MemoryNotificationStore::new());
        let recipient = RecipientId::new();
        seed(&store, recipient).await;
        seed(&store, recipient).await;

        let agg = aggregator(Arc::clone(&store));
        let now = Utc::now();

        let cached = agg.counts(recipient, now).await.unwrap();
        let cold = store.counts(recipient, now).await.unwrap();
        assert_eq!(cached, cold);
        assert_eq!(cached.inbox_unread, 2);
        assert_eq!(cached.bell_unread, 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recomputation() {
        let store = Arc::new(MemoryNotificationStore::new());
        let recipient = RecipientId::new();
        let id = seed(&store, recipient).await;

        let agg = aggregator(Arc::clone(&store));
        let now = Utc::now();
        assert_eq!(agg.counts(recipient, now).await.unwrap().inbox_unread, 1);

        store
            .mark_read(id, recipient, Surface::Inbox, now)
            .await
            .unwrap();
        agg.invalidate(recipient).await;

        assert_eq!(agg.counts(recipient, now).await.unwrap().inbox_unread, 0);
    }

    #[tokio::test]
    async fn test_summary_totals() {
        let store = Arc::new(MemoryNotificationStore::new());
        let recipient = RecipientId::new();
        let id = seed(&store, recipient).await;
        let now = Utc::now();
        store
            .mark_read(id, recipient, Surface::Bell, now)
            .await
            .unwrap();

        let summary = aggregator(store).summary(recipient, now).await.unwrap();
        assert_eq!(summary.inbox, 1);
        assert_eq!(summary.bell, 0);
        assert_eq!(summary.total, 1);
    }
}
