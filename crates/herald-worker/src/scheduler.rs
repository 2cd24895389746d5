//! Cron scheduler for the purge sweep.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use herald_core::config::worker::WorkerConfig;
use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_service::NotificationEngine;

/// Cron-based scheduler running the expired-notification purge sweep.
pub struct PurgeScheduler {
    scheduler: JobScheduler,
    engine: Arc<NotificationEngine>,
    config: WorkerConfig,
}

impl std::fmt::Debug for PurgeScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurgeScheduler")
            .field("schedule", &self.config.purge_schedule)
            .finish()
    }
}

impl PurgeScheduler {
    /// Create a new scheduler.
    pub async fn new(engine: Arc<NotificationEngine>, config: WorkerConfig) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;
        Ok(Self {
            scheduler,
            engine,
            config,
        })
    }

    /// Register the purge sweep and start the scheduler.
    pub async fn start(&self) -> AppResult<()> {
        if !self.config.enabled {
            tracing::info!("Maintenance scheduler disabled by configuration");
            return Ok(());
        }

        let engine = Arc::clone(&self.engine);
        let job = CronJob::new_async(self.config.purge_schedule.as_str(), move |_uuid, _lock| {
            let engine = Arc::clone(&engine);
            Box::pin(async move {
                match engine.purge_expired().await {
                    Ok(purged) if purged > 0 => {
                        tracing::info!(purged, "Purge sweep deleted expired notifications");
                    }
                    Ok(_) => tracing::debug!("Purge sweep found nothing to delete"),
                    Err(e) => tracing::error!(error = %e, "Purge sweep failed"),
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create purge schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add purge schedule: {e}")))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!(schedule = %self.config.purge_schedule, "Purge scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;
        tracing::info!("Purge scheduler shut down");
        Ok(())
    }
}
