//! The notification store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use herald_core::result::AppResult;
use herald_core::types::id::{NotificationId, RecipientId};
use herald_core::types::pagination::{PageRequest, PageResponse};
use herald_entity::notification::Notification;
use herald_entity::recipient::{RecipientState, RecipientView, Surface, UnreadCounts};

/// Storage contract for notifications and per-recipient state.
///
/// Every flag mutation is an atomic conditional update ("OR with true"):
/// implementations must serialize concurrent writers to the same
/// `(notification_id, recipient_id)` pair and report whether the call
/// actually transitioned a flag, so callers fire side effects exactly once
/// per transition. Writers to different pairs never block each other.
///
/// `now` is passed in explicitly wherever a visibility predicate is
/// evaluated, keeping expiry decisions deterministic under test.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new notification row. The row is authoritative: fan-out
    /// retries key their upserts on its id.
    async fn insert_notification(&self, notification: &Notification) -> AppResult<()>;

    /// Fetch a notification by id.
    async fn get_notification(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Insert fresh state rows for `recipients`, skipping pairs that
    /// already exist. Returns the number actually inserted. Re-running the
    /// same batch after a partial failure is a no-op for rows already
    /// written, which is what makes fan-out retryable.
    async fn insert_states_if_absent(
        &self,
        notification_id: NotificationId,
        recipients: &[RecipientId],
        created_at: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Fetch one recipient's state for one notification.
    async fn get_state(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
    ) -> AppResult<Option<RecipientState>>;

    /// Set the read flag for `surface` if the pair is currently visible
    /// there and still unread. Returns `Ok(true)` on a transition,
    /// `Ok(false)` if already read, and `NotFound` if the pair has no
    /// state row or is not visible on that surface.
    async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Dismiss the notification from the recipient's bell. `NotFound`
    /// unless the pair is currently bell-visible: from the recipient's
    /// point of view an already-removed item does not exist.
    async fn remove_from_bell(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Delete the notification from the recipient's inbox, removing it
    /// from the bell in the same atomic update (the cascade is mandatory).
    /// `NotFound` unless the pair is currently inbox-visible.
    async fn delete_from_inbox(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Mark every currently-unread, currently-visible notification on
    /// `surface` as read for `recipient_id`. Returns the number of rows
    /// that actually transitioned; already-read rows are skipped and their
    /// read timestamps left untouched. Must be atomic with respect to
    /// racing single-item operations (no double counting).
    async fn mark_all_read(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Page through the recipient's visible notifications on `surface`,
    /// newest first. Expired, inactive, removed, and deleted items never
    /// appear.
    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<RecipientView>>;

    /// Cold computation of the recipient's aggregate counts.
    async fn counts(&self, recipient_id: RecipientId, now: DateTime<Utc>) -> AppResult<UnreadCounts>;

    /// Administrative soft-disable toggle. `NotFound` if the notification
    /// does not exist.
    async fn set_active(&self, notification_id: NotificationId, active: bool) -> AppResult<()>;

    /// Physically delete notifications past their logical TTL, including
    /// their state rows. Returns the number of notifications deleted.
    /// Maintenance-path only.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
