//! Per-recipient aggregate counts.

use serde::{Deserialize, Serialize};

/// Visible and unread counts for both surfaces of one recipient.
///
/// Always derivable from a cold scan of the recipient's state rows joined
/// against notification liveness; any cached copy must equal the cold
/// computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCounts {
    /// Inbox-visible notifications with `is_read_inbox = false`.
    pub inbox_unread: u64,
    /// Bell-visible notifications with `is_read_bell = false`.
    pub bell_unread: u64,
    /// All inbox-visible notifications.
    pub inbox_visible: u64,
    /// All bell-visible notifications.
    pub bell_visible: u64,
}

/// The compact summary handed to collaborators for badge display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadSummary {
    /// Unread count on the inbox surface.
    pub inbox: u64,
    /// Unread count on the bell surface.
    pub bell: u64,
    /// Sum of both surfaces.
    pub total: u64,
}

impl From<UnreadCounts> for UnreadSummary {
    fn from(counts: UnreadCounts) -> Self {
        Self {
            inbox: counts.inbox_unread,
            bell: counts.bell_unread,
            total: counts.inbox_unread + counts.bell_unread,
        }
    }
}
