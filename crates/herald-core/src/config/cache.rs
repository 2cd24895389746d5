//! Unread-count cache configuration.

use serde::{Deserialize, Serialize};

/// Cache configuration for per-recipient unread counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider type: `"memory"` or `"noop"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// TTL for cached counts in seconds. Counts are invalidated on every
    /// mutation anyway; the TTL only bounds staleness after missed
    /// invalidations.
    #[serde(default = "default_ttl")]
    pub counts_ttl_seconds: u64,
    /// Maximum number of cached entries.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            counts_ttl_seconds: default_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_ttl() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    100_000
}
