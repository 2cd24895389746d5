//! Maintenance worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the maintenance scheduler runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression for the expired-notification purge sweep.
    #[serde(default = "default_purge_schedule")]
    pub purge_schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            purge_schedule: default_purge_schedule(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_purge_schedule() -> String {
    // Hourly, on the hour.
    "0 0 * * * *".to_string()
}
