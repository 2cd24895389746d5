//! Read-state synchronization over the store's conditional updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use herald_core::result::AppResult;
use herald_core::types::id::{NotificationId, RecipientId};
use herald_database::NotificationStore;
use herald_entity::recipient::Surface;

/// Thin orchestration over the store's per-pair conditional updates.
///
/// The store decides whether a flag actually transitioned; this layer only
/// reports the outcome so the engine fires cache invalidation and push
/// exactly once per transition, and never for no-op retries.
#[derive(Debug, Clone)]
pub struct ReadStateSync {
    store: Arc<dyn NotificationStore>,
}

impl ReadStateSync {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Mark one notification read on one surface. `Ok(true)` on an actual
    /// transition, `Ok(false)` when it was already read there.
    pub async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let transitioned = self
            .store
            .mark_read(notification_id, recipient_id, surface, now)
            .await?;
        debug!(%notification_id, %recipient_id, %surface, transitioned, "mark_read");
        Ok(transitioned)
    }

    /// Dismiss one notification from the bell.
    pub async fn remove_from_bell(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.store
            .remove_from_bell(notification_id, recipient_id, now)
            .await?;
        debug!(%notification_id, %recipient_id, "remove_from_bell");
        Ok(())
    }

    /// Delete one notification from the inbox, cascading to the bell.
    pub async fn delete_from_inbox(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.store
            .delete_from_inbox(notification_id, recipient_id, now)
            .await?;
        debug!(%notification_id, %recipient_id, "delete_from_inbox");
        Ok(())
    }

    /// Mark every visible unread notification on `surface` read. Returns
    /// the number of rows that transitioned.
    pub async fn mark_all_read(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let changed = self.store.mark_all_read(recipient_id, surface, now).await?;
        debug!(%recipient_id, %surface, changed, "mark_all_read");
        Ok(changed)
    }
}
