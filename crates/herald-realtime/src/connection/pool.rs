//! Connection pool indexed by recipient ID.

use std::sync::Arc;

use dashmap::DashMap;

use herald_core::types::id::{ConnectionId, RecipientId};

use super::handle::ConnectionHandle;

/// Thread-safe registry of all live connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// Recipient ID to connection handles (one recipient can have several
    /// tabs or devices connected).
    by_recipient: DashMap<RecipientId, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID to handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Create a new empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. If the recipient is at `max_per_recipient`, the
    /// oldest connection is evicted and marked dead.
    pub fn add(&self, handle: Arc<ConnectionHandle>, max_per_recipient: usize) {
        self.by_id.insert(handle.id, Arc::clone(&handle));
        let mut connections = self.by_recipient.entry(handle.recipient_id).or_default();
        while connections.len() >= max_per_recipient.max(1) {
            let evicted = connections.remove(0);
            evicted.mark_dead();
            self.by_id.remove(&evicted.id);
            tracing::debug!(
                connection_id = %evicted.id,
                recipient_id = %evicted.recipient_id,
                "Evicted oldest connection at capacity"
            );
        }
        connections.push(handle);
    }

    /// Remove a connection from the pool.
    pub fn remove(&self, connection_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(&connection_id)?;
        if let Some(mut connections) = self.by_recipient.get_mut(&handle.recipient_id) {
            connections.retain(|c| c.id != connection_id);
            if connections.is_empty() {
                drop(connections);
                self.by_recipient
                    .remove_if(&handle.recipient_id, |_, v| v.is_empty());
            }
        }
        Some(handle)
    }

    /// All connections of one recipient.
    pub fn connections_for(&self, recipient_id: RecipientId) -> Vec<Arc<ConnectionHandle>> {
        self.by_recipient
            .get(&recipient_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Look up a connection by ID.
    pub fn get(&self, connection_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id
            .get(&connection_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Total number of live connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct connected recipients.
    pub fn recipient_count(&self) -> usize {
        self.by_recipient.len()
    }

    /// Drop every connection whose handle has been marked dead.
    pub fn prune_dead(&self) -> usize {
        let dead: Vec<ConnectionId> = self
            .by_id
            .iter()
            .filter(|entry| !entry.value().is_alive())
            .map(|entry| *entry.key())
            .collect();
        let count = dead.len();
        for id in dead {
            self.remove(id);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(recipient_id: RecipientId) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(4);
        Arc::new(ConnectionHandle::new(recipient_id, tx))
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let pool = ConnectionPool::new();
        let recipient = RecipientId::new();
        let h = handle(recipient);
        pool.add(Arc::clone(&h), 5);

        assert_eq!(pool.connection_count(), 1);
        assert_eq!(pool.connections_for(recipient).len(), 1);

        pool.remove(h.id);
        assert_eq!(pool.connection_count(), 0);
        assert_eq!(pool.recipient_count(), 0);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let pool = ConnectionPool::new();
        let recipient = RecipientId::new();
        let first = handle(recipient);
        pool.add(Arc::clone(&first), 2);
        pool.add(handle(recipient), 2);
        pool.add(handle(recipient), 2);

        assert_eq!(pool.connections_for(recipient).len(), 2);
        assert!(!first.is_alive());
        assert!(pool.get(first.id).is_none());
    }

    #[tokio::test]
    async fn test_prune_dead() {
        let pool = ConnectionPool::new();
        let recipient = RecipientId::new();
        let h = handle(recipient);
        pool.add(Arc::clone(&h), 5);
        pool.add(handle(recipient), 5);

        h.mark_dead();
        assert_eq!(pool.prune_dead(), 1);
        assert_eq!(pool.connections_for(recipient).len(), 1);
    }
}
