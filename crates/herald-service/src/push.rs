//! Best-effort push delivery seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use herald_core::types::id::{NotificationId, RecipientId};
use herald_entity::notification::Notification;
use herald_entity::recipient::{Surface, UnreadSummary};

/// What changed on a single `(notification, recipient)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StateChange {
    /// The recipient read the notification on `surface`.
    Read {
        /// Surface the read happened on.
        surface: Surface,
    },
    /// The recipient dismissed the notification from the bell.
    RemovedFromBell,
    /// The recipient deleted the notification from the inbox (and, by
    /// cascade, from the bell).
    DeletedFromInbox,
}

/// An event pushed to a recipient's live connections.
///
/// Events are advisory. Clients reconcile authoritative state by querying;
/// a dropped event costs freshness, never correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// A new notification was fanned out to the recipient.
    Created {
        /// The full notification content.
        notification: Notification,
    },
    /// One of the recipient's own state flags transitioned.
    StateChanged {
        /// The affected notification.
        notification_id: NotificationId,
        /// The transition that happened.
        #[serde(flatten)]
        change: StateChange,
    },
    /// The recipient's aggregate counts changed through a bulk operation.
    CountsChanged {
        /// Fresh unread summary.
        summary: UnreadSummary,
    },
}

/// Sink for push events.
///
/// Delivery is best-effort by contract: implementations log failures and
/// drop the event, they never surface an error to the caller. Engine
/// operations succeed or fail on storage alone.
#[async_trait]
pub trait PushSink: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver `event` to every live connection of `recipient_id`.
    async fn push(&self, recipient_id: RecipientId, event: PushEvent);
}

/// Sink that discards every event. Used when realtime push is disabled.
#[derive(Debug, Clone, Default)]
pub struct NullPushSink;

#[async_trait]
impl PushSink for NullPushSink {
    async fn push(&self, _recipient_id: RecipientId, _event: PushEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = PushEvent::StateChanged {
            notification_id: NotificationId::new(),
            change: StateChange::Read {
                surface: Surface::Bell,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "state_changed");
        assert_eq!(json["change"], "read");
        assert_eq!(json["surface"], "bell");
    }
}
