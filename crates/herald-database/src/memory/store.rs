//! In-memory notification store over concurrent maps.
//!
//! Implements the exact same contract as the PostgreSQL store: dashmap's
//! per-entry guards stand in for row locks, so concurrent writers to the
//! same `(notification_id, recipient_id)` pair are serialized and the
//! conditional-OR updates report transitions identically. Used by the
//! test suites and by embedded single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::types::id::{NotificationId, RecipientId};
use herald_core::types::pagination::{PageRequest, PageResponse};
use herald_entity::notification::Notification;
use herald_entity::recipient::{RecipientState, RecipientView, Surface, UnreadCounts};

use crate::store::NotificationStore;

type PairKey = (NotificationId, RecipientId);

/// Notification store backed by in-process concurrent maps.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    notifications: DashMap<NotificationId, Notification>,
    states: DashMap<PairKey, RecipientState>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notifications. Test helper.
    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    /// Number of stored state rows. Test helper.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Snapshot of which notifications are live at `now`, taken before any
    /// state-map guard is held so the two maps are never locked together.
    fn liveness_snapshot(&self, now: DateTime<Utc>) -> HashMap<NotificationId, bool> {
        self.notifications
            .iter()
            .map(|entry| (*entry.key(), entry.value().is_live_at(now)))
            .collect()
    }

    fn pair_not_found(
        notification_id: NotificationId,
        recipient_id: RecipientId,
        surface: Surface,
    ) -> AppError {
        AppError::not_found(format!(
            "Notification {notification_id} is not visible on the {surface} surface \
             for recipient {recipient_id}"
        ))
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn insert_notification(&self, notification: &Notification) -> AppResult<()> {
        self.notifications
            .entry(notification.id)
            .or_insert_with(|| notification.clone());
        Ok(())
    }

    async fn get_notification(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        Ok(self.notifications.get(&id).map(|entry| entry.clone()))
    }

    async fn insert_states_if_absent(
        &self,
        notification_id: NotificationId,
        recipients: &[RecipientId],
        created_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut inserted = 0u64;
        for recipient_id in recipients {
            let mut absent = false;
            self.states
                .entry((notification_id, *recipient_id))
                .or_insert_with(|| {
                    absent = true;
                    RecipientState::fresh(notification_id, *recipient_id, created_at)
                });
            if absent {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn get_state(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
    ) -> AppResult<Option<RecipientState>> {
        Ok(self
            .states
            .get(&(notification_id, recipient_id))
            .map(|entry| entry.clone()))
    }

    async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let live = self
            .notifications
            .get(&notification_id)
            .map(|n| n.is_live_at(now))
            .unwrap_or(false);

        let Some(mut state) = self.states.get_mut(&(notification_id, recipient_id)) else {
            return Err(Self::pair_not_found(notification_id, recipient_id, surface));
        };

        if !live || !state.is_present_on(surface) {
            return Err(Self::pair_not_found(notification_id, recipient_id, surface));
        }

        let transitioned = match surface {
            Surface::Inbox => {
                if state.is_read_inbox {
                    false
                } else {
                    state.is_read_inbox = true;
                    state.read_inbox_at = Some(now);
                    true
                }
            }
            Surface::Bell => {
                if state.is_read_bell {
                    false
                } else {
                    state.is_read_bell = true;
                    state.read_bell_at = Some(now);
                    true
                }
            }
        };
        debug_assert!(state.cascade_holds());
        Ok(transitioned)
    }

    async fn remove_from_bell(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let live = self
            .notifications
            .get(&notification_id)
            .map(|n| n.is_live_at(now))
            .unwrap_or(false);

        let Some(mut state) = self.states.get_mut(&(notification_id, recipient_id)) else {
            return Err(Self::pair_not_found(
                notification_id,
                recipient_id,
                Surface::Bell,
            ));
        };

        if !live || state.is_removed_from_bell {
            return Err(Self::pair_not_found(
                notification_id,
                recipient_id,
                Surface::Bell,
            ));
        }

        state.is_removed_from_bell = true;
        debug_assert!(state.cascade_holds());
        Ok(())
    }

    async fn delete_from_inbox(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let live = self
            .notifications
            .get(&notification_id)
            .map(|n| n.is_live_at(now))
            .unwrap_or(false);

        let Some(mut state) = self.states.get_mut(&(notification_id, recipient_id)) else {
            return Err(Self::pair_not_found(
                notification_id,
                recipient_id,
                Surface::Inbox,
            ));
        };

        if !live || state.is_deleted_from_inbox {
            return Err(Self::pair_not_found(
                notification_id,
                recipient_id,
                Surface::Inbox,
            ));
        }

        // Both flags under one entry guard: the cascade is atomic.
        state.is_deleted_from_inbox = true;
        state.is_removed_from_bell = true;
        debug_assert!(state.cascade_holds());
        Ok(())
    }

    async fn mark_all_read(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let live = self.liveness_snapshot(now);

        let mut changed = 0u64;
        for mut entry in self.states.iter_mut() {
            let state = entry.value_mut();
            if state.recipient_id != recipient_id
                || !live.get(&state.notification_id).copied().unwrap_or(false)
                || !state.is_present_on(surface)
                || state.is_read_on(surface)
            {
                continue;
            }
            match surface {
                Surface::Inbox => {
                    state.is_read_inbox = true;
                    state.read_inbox_at = Some(now);
                }
                Surface::Bell => {
                    state.is_read_bell = true;
                    state.read_bell_at = Some(now);
                }
            }
            changed += 1;
        }
        Ok(changed)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<RecipientView>> {
        let mut visible: Vec<RecipientView> = self
            .states
            .iter()
            .filter(|entry| entry.value().recipient_id == recipient_id)
            .filter_map(|entry| {
                let state = entry.value().clone();
                let notification = self
                    .notifications
                    .get(&state.notification_id)
                    .map(|n| n.clone())?;
                state
                    .is_visible_on(surface, &notification, now)
                    .then_some(RecipientView {
                        notification,
                        state,
                    })
            })
            .collect();

        visible.sort_by(|a, b| {
            b.notification
                .created_at
                .cmp(&a.notification.created_at)
                .then_with(|| b.notification.id.cmp(&a.notification.id))
        });

        let total = visible.len() as u64;
        let items: Vec<RecipientView> = visible
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page, total))
    }

    async fn counts(
        &self,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<UnreadCounts> {
        let live = self.liveness_snapshot(now);

        let mut counts = UnreadCounts::default();
        for entry in self.states.iter() {
            let state = entry.value();
            if state.recipient_id != recipient_id
                || !live.get(&state.notification_id).copied().unwrap_or(false)
            {
                continue;
            }
            if !state.is_deleted_from_inbox {
                counts.inbox_visible += 1;
                if !state.is_read_inbox {
                    counts.inbox_unread += 1;
                }
            }
            if !state.is_removed_from_bell {
                counts.bell_visible += 1;
                if !state.is_read_bell {
                    counts.bell_unread += 1;
                }
            }
        }
        Ok(counts)
    }

    async fn set_active(&self, notification_id: NotificationId, active: bool) -> AppResult<()> {
        let Some(mut notification) = self.notifications.get_mut(&notification_id) else {
            return Err(AppError::not_found(format!(
                "Notification {notification_id} does not exist"
            )));
        };
        notification.active = active;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let expired: Vec<NotificationId> = self
            .notifications
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| *entry.key())
            .collect();

        for id in &expired {
            self.notifications.remove(id);
        }
        self.states
            .retain(|(notification_id, _), _| !expired.contains(notification_id));

        Ok(expired.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use herald_entity::notification::{CreatorSnapshot, NotificationKind, Priority, TargetingMode};

    fn notification(expires_at: Option<DateTime<Utc>>) -> Notification {
        Notification {
            id: NotificationId::new(),
            kind: NotificationKind::Announcement,
            title: "title".to_string(),
            body: "body".to_string(),
            priority: Priority::Medium,
            creator: CreatorSnapshot::system(),
            targeting_mode: TargetingMode::Broadcast,
            created_at: Utc::now(),
            expires_at,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_insert_states_is_idempotent() {
        let store = MemoryNotificationStore::new();
        let n = notification(None);
        store.insert_notification(&n).await.unwrap();

        let recipients = vec![RecipientId::new(), RecipientId::new()];
        let now = Utc::now();
        let first = store
            .insert_states_if_absent(n.id, &recipients, now)
            .await
            .unwrap();
        let second = store
            .insert_states_if_absent(n.id, &recipients, now)
            .await
            .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(store.state_count(), 2);
    }

    #[tokio::test]
    async fn test_mark_read_reports_single_transition() {
        let store = MemoryNotificationStore::new();
        let n = notification(None);
        let r = RecipientId::new();
        let now = Utc::now();
        store.insert_notification(&n).await.unwrap();
        store.insert_states_if_absent(n.id, &[r], now).await.unwrap();

        assert!(store.mark_read(n.id, r, Surface::Inbox, now).await.unwrap());
        assert!(!store.mark_read(n.id, r, Surface::Inbox, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_from_inbox_cascades_atomically() {
        let store = MemoryNotificationStore::new();
        let n = notification(None);
        let r = RecipientId::new();
        let now = Utc::now();
        store.insert_notification(&n).await.unwrap();
        store.insert_states_if_absent(n.id, &[r], now).await.unwrap();

        store.delete_from_inbox(n.id, r, now).await.unwrap();

        let state = store.get_state(n.id, r).await.unwrap().unwrap();
        assert!(state.is_deleted_from_inbox);
        assert!(state.is_removed_from_bell);
    }

    #[tokio::test]
    async fn test_remove_from_bell_twice_is_not_found() {
        let store = MemoryNotificationStore::new();
        let n = notification(None);
        let r = RecipientId::new();
        let now = Utc::now();
        store.insert_notification(&n).await.unwrap();
        store.insert_states_if_absent(n.id, &[r], now).await.unwrap();

        store.remove_from_bell(n.id, r, now).await.unwrap();
        let err = store.remove_from_bell(n.id, r, now).await.unwrap_err();
        assert_eq!(err.kind, herald_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_expired_notifications_are_invisible_and_purgeable() {
        let store = MemoryNotificationStore::new();
        let now = Utc::now();
        let n = notification(Some(now - Duration::minutes(5)));
        let r = RecipientId::new();
        store.insert_notification(&n).await.unwrap();
        store.insert_states_if_absent(n.id, &[r], now).await.unwrap();

        let counts = store.counts(r, now).await.unwrap();
        assert_eq!(counts, UnreadCounts::default());
        assert!(store.mark_read(n.id, r, Surface::Bell, now).await.is_err());

        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert_eq!(store.notification_count(), 0);
        assert_eq!(store.state_count(), 0);
    }
}
