//! Batched fan-out of recipient state rows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use herald_core::config::fanout::FanoutConfig;
use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::types::id::{NotificationId, RecipientId};
use herald_database::NotificationStore;

/// Writes per-recipient state rows in bounded concurrent batches.
///
/// Every batch is an insert-if-absent, so a retried fan-out resumes where
/// the failed one stopped instead of duplicating rows.
#[derive(Debug, Clone)]
pub struct FanoutWriter {
    store: Arc<dyn NotificationStore>,
    config: FanoutConfig,
}

impl FanoutWriter {
    pub fn new(store: Arc<dyn NotificationStore>, config: FanoutConfig) -> Self {
        Self { store, config }
    }

    /// Write state rows for every recipient. Returns the number of rows
    /// actually inserted, which is lower than `recipients.len()` on a
    /// resumed retry.
    pub async fn fan_out(
        &self,
        notification_id: NotificationId,
        recipients: &[RecipientId],
        created_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        if recipients.is_empty() {
            return Ok(0);
        }

        let deadline = std::time::Duration::from_secs(self.config.create_timeout_seconds);
        let write = self.write_batches(notification_id, recipients, created_at);

        match tokio::time::timeout(deadline, write).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    %notification_id,
                    recipients = recipients.len(),
                    timeout_seconds = self.config.create_timeout_seconds,
                    "Fan-out timed out; partial rows remain and a retry will resume"
                );
                Err(AppError::database(format!(
                    "Fan-out for notification {notification_id} timed out"
                )))
            }
        }
    }

    async fn write_batches(
        &self,
        notification_id: NotificationId,
        recipients: &[RecipientId],
        created_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let inserted: u64 = stream::iter(recipients.chunks(self.config.batch_size.max(1)))
            .map(|batch| {
                let store = Arc::clone(&self.store);
                async move {
                    store
                        .insert_states_if_absent(notification_id, batch, created_at)
                        .await
                }
            })
            .buffer_unordered(self.config.max_concurrent_batches.max(1))
            .try_fold(0u64, |total, batch_inserted| async move {
                Ok(total + batch_inserted)
            })
            .await?;

        info!(
            %notification_id,
            targeted = recipients.len(),
            inserted,
            "Fan-out complete"
        );
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_database::memory::MemoryNotificationStore;

    fn writer(store: Arc<MemoryNotificationStore>, batch_size: usize) -> FanoutWriter {
        FanoutWriter::new(
            store,
            FanoutConfig {
                batch_size,
                max_concurrent_batches: 4,
                create_timeout_seconds: 5,
            },
        )
    }

    #[tokio::test]
    async fn test_fan_out_batches_cover_all_recipients() {
        let store = Arc::new(MemoryNotificationStore::new());
        let recipients: Vec<RecipientId> = (0..23).map(|_| RecipientId::new()).collect();
        let inserted = writer(Arc::clone(&store), 5)
            .fan_out(NotificationId::new(), &recipients, Utc::now())
            .await
            .unwrap();
        assert_eq!(inserted, 23);
        assert_eq!(store.state_count(), 23);
    }

    #[tokio::test]
    async fn test_retry_resumes_without_duplicates() {
        let store = Arc::new(MemoryNotificationStore::new());
        let id = NotificationId::new();
        let recipients: Vec<RecipientId> = (0..10).map(|_| RecipientId::new()).collect();
        let now = Utc::now();

        // Simulate a partial first attempt.
        store
            .insert_states_if_absent(id, &recipients[..4], now)
            .await
            .unwrap();

        let inserted = writer(Arc::clone(&store), 3)
            .fan_out(id, &recipients, now)
            .await
            .unwrap();
        assert_eq!(inserted, 6);
        assert_eq!(store.state_count(), 10);
    }

    #[tokio::test]
    async fn test_empty_target_set_is_a_no_op() {
        let store = Arc::new(MemoryNotificationStore::new());
        let inserted = writer(Arc::clone(&store), 5)
            .fan_out(NotificationId::new(), &[], Utc::now())
            .await
            .unwrap();
        assert_eq!(inserted, 0);
    }
}
