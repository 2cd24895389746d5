//! Fan-out writer configuration.

use serde::{Deserialize, Serialize};

/// Fan-out writer tuning knobs.
///
/// Batching bounds request latency and memory when a broadcast targets
/// tens of thousands of recipients; it is a resource knob, never a
/// correctness one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Recipient-state rows written per storage round trip.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Maximum batches in flight concurrently.
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,
    /// Deadline for a single creation request in seconds. A timed-out
    /// creation leaves a resumable partial fan-out; retrying the same
    /// request completes it without duplicating rows.
    #[serde(default = "default_create_timeout")]
    pub create_timeout_seconds: u64,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_concurrent_batches: default_max_concurrent_batches(),
            create_timeout_seconds: default_create_timeout(),
        }
    }
}

fn default_batch_size() -> usize {
    500
}

fn default_max_concurrent_batches() -> usize {
    4
}

fn default_create_timeout() -> u64 {
    30
}
