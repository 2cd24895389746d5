//! Recipient state entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use herald_core::types::id::{NotificationId, RecipientId};

use crate::notification::Notification;

use super::surface::Surface;

/// Read and visibility state of one notification for one recipient.
///
/// One row exists per `(notification_id, recipient_id)` pair, created at
/// fan-out time iff the recipient was in the resolved target set. The four
/// booleans form a monotone lattice: no operation ever reverts a flag to
/// `false`, which is what makes retries idempotent and concurrent bulk
/// operations convergent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipientState {
    /// The notification this state belongs to.
    pub notification_id: NotificationId,
    /// The owning recipient. Only this recipient mutates the row.
    pub recipient_id: RecipientId,
    /// Whether the recipient has read the notification in the inbox.
    pub is_read_inbox: bool,
    /// When the inbox read happened.
    pub read_inbox_at: Option<DateTime<Utc>>,
    /// Whether the recipient has read the notification in the bell.
    pub is_read_bell: bool,
    /// When the bell read happened.
    pub read_bell_at: Option<DateTime<Utc>>,
    /// Whether the recipient dismissed the notification from the bell.
    pub is_removed_from_bell: bool,
    /// Whether the recipient deleted the notification from the inbox.
    /// Implies `is_removed_from_bell` (one-way cascade).
    pub is_deleted_from_inbox: bool,
    /// When the state row was created (fan-out time).
    pub created_at: DateTime<Utc>,
}

impl RecipientState {
    /// A fresh state row as written by fan-out: unread and visible on
    /// both surfaces.
    pub fn fresh(
        notification_id: NotificationId,
        recipient_id: RecipientId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            notification_id,
            recipient_id,
            is_read_inbox: false,
            read_inbox_at: None,
            is_read_bell: false,
            read_bell_at: None,
            is_removed_from_bell: false,
            is_deleted_from_inbox: false,
            created_at,
        }
    }

    /// Whether the recipient has read the notification on `surface`.
    pub fn is_read_on(&self, surface: Surface) -> bool {
        match surface {
            Surface::Inbox => self.is_read_inbox,
            Surface::Bell => self.is_read_bell,
        }
    }

    /// The recipient-level half of the visibility predicate for `surface`.
    pub fn is_present_on(&self, surface: Surface) -> bool {
        match surface {
            Surface::Inbox => !self.is_deleted_from_inbox,
            Surface::Bell => !self.is_removed_from_bell,
        }
    }

    /// Full visibility predicate: the notification is live and the
    /// recipient has not removed/deleted it from `surface`.
    pub fn is_visible_on(
        &self,
        surface: Surface,
        notification: &Notification,
        now: DateTime<Utc>,
    ) -> bool {
        notification.is_live_at(now) && self.is_present_on(surface)
    }

    /// Check the cascade invariant. Storage implementations assert this
    /// after every mutation in debug builds.
    pub fn cascade_holds(&self) -> bool {
        !self.is_deleted_from_inbox || self.is_removed_from_bell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_unread_everywhere() {
        let state = RecipientState::fresh(NotificationId::new(), RecipientId::new(), Utc::now());
        assert!(!state.is_read_on(Surface::Inbox));
        assert!(!state.is_read_on(Surface::Bell));
        assert!(state.is_present_on(Surface::Inbox));
        assert!(state.is_present_on(Surface::Bell));
        assert!(state.cascade_holds());
    }

    #[test]
    fn test_cascade_violation_detected() {
        let mut state =
            RecipientState::fresh(NotificationId::new(), RecipientId::new(), Utc::now());
        state.is_deleted_from_inbox = true;
        assert!(!state.cascade_holds());
        state.is_removed_from_bell = true;
        assert!(state.cascade_holds());
    }
}
