//! Push sink over the connection pool.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use herald_core::config::realtime::RealtimeConfig;
use herald_core::types::id::{ConnectionId, RecipientId};
use herald_service::{PushEvent, PushSink};

use crate::connection::{ConnectionHandle, ConnectionPool};

/// Delivers engine push events to a recipient's live connections.
///
/// Each event is serialized once and offered to every connection the
/// recipient has open. A recipient with no connections is a silent no-op,
/// and so is any individual delivery failure.
#[derive(Debug, Clone)]
pub struct Notifier {
    pool: Arc<ConnectionPool>,
    config: RealtimeConfig,
}

impl Notifier {
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            config,
        }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Register a new connection for `recipient_id`. Returns the handle
    /// and the receiver half the transport task drains.
    pub fn connect(
        &self,
        recipient_id: RecipientId,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(recipient_id, tx));
        self.pool
            .add(Arc::clone(&handle), self.config.max_connections_per_recipient);
        debug!(connection_id = %handle.id, %recipient_id, "Connection registered");
        (handle, rx)
    }

    /// Deregister a connection when its transport closes.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        if let Some(handle) = self.pool.remove(connection_id) {
            handle.mark_dead();
            debug!(%connection_id, recipient_id = %handle.recipient_id, "Connection closed");
        }
    }
}

#[async_trait]
impl PushSink for Notifier {
    async fn push(&self, recipient_id: RecipientId, event: PushEvent) {
        let connections = self.pool.connections_for(recipient_id);
        if connections.is_empty() {
            return;
        }

        let frame = match serde_json::to_string(&event) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(%recipient_id, error = %e, "Failed to serialize push event, dropping");
                return;
            }
        };

        let mut delivered = 0usize;
        for connection in &connections {
            if connection.send(frame.clone()) {
                delivered += 1;
            }
        }
        debug!(
            %recipient_id,
            delivered,
            connections = connections.len(),
            "Push event offered"
        );
        self.pool.prune_dead();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::types::id::NotificationId;
    use herald_entity::recipient::Surface;
    use herald_service::StateChange;

    fn notifier() -> Notifier {
        Notifier::new(RealtimeConfig::default())
    }

    fn event() -> PushEvent {
        PushEvent::StateChanged {
            notification_id: NotificationId::new(),
            change: StateChange::Read {
                surface: Surface::Inbox,
            },
        }
    }

    #[tokio::test]
    async fn test_push_reaches_all_recipient_connections() {
        let notifier = notifier();
        let recipient = RecipientId::new();
        let (_h1, mut rx1) = notifier.connect(recipient);
        let (_h2, mut rx2) = notifier.connect(recipient);

        notifier.push(recipient, event()).await;

        let f1 = rx1.recv().await.unwrap();
        let f2 = rx2.recv().await.unwrap();
        assert_eq!(f1, f2);
        let value: serde_json::Value = serde_json::from_str(&f1).unwrap();
        assert_eq!(value["type"], "state_changed");
    }

    #[tokio::test]
    async fn test_push_without_connections_is_a_no_op() {
        notifier().push(RecipientId::new(), event()).await;
    }

    #[tokio::test]
    async fn test_push_skips_other_recipients() {
        let notifier = notifier();
        let target = RecipientId::new();
        let other = RecipientId::new();
        let (_h1, mut target_rx) = notifier.connect(target);
        let (_h2, mut other_rx) = notifier.connect(other);

        notifier.push(target, event()).await;

        assert!(target_rx.recv().await.is_some());
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_connection_is_pruned_after_push() {
        let notifier = notifier();
        let recipient = RecipientId::new();
        let (_handle, rx) = notifier.connect(recipient);
        drop(rx);

        notifier.push(recipient, event()).await;
        assert_eq!(notifier.pool().connection_count(), 0);
    }
}
