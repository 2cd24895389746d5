//! Individual client connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use herald_core::types::id::{ConnectionId, RecipientId};

/// A handle to a single live client connection.
///
/// Holds the sender half of the outbound frame channel plus metadata
/// about the owning recipient. The transport task that drains the
/// receiver half marks the handle dead when the socket closes.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Recipient who owns this connection.
    pub recipient_id: RecipientId,
    /// Sender for serialized outbound frames.
    pub sender: mpsc::Sender<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(recipient_id: RecipientId, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            recipient_id,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Offer a serialized frame to this connection. Returns whether it was
    /// accepted. A full buffer drops the frame; a closed channel marks the
    /// connection dead.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_delivers_frame() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(RecipientId::new(), tx);
        assert!(handle.send("hello".to_string()));
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_full_buffer_drops_frame() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(RecipientId::new(), tx);
        assert!(handle.send("a".to_string()));
        assert!(!handle.send("b".to_string()));
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn test_closed_channel_marks_dead() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = ConnectionHandle::new(RecipientId::new(), tx);
        assert!(!handle.send("a".to_string()));
        assert!(!handle.is_alive());
    }
}
