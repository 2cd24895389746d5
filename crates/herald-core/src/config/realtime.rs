//! Real-time push configuration.

use serde::{Deserialize, Serialize};

/// Real-time push engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum live connections per recipient; the oldest connection is
    /// evicted when the cap is reached.
    #[serde(default = "default_max_connections_per_recipient")]
    pub max_connections_per_recipient: usize,
    /// Outbound buffer size per connection. A full buffer drops the push;
    /// the recipient observes the new state on next fetch.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_recipient: default_max_connections_per_recipient(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_max_connections_per_recipient() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    256
}
