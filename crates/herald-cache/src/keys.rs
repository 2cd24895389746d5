//! Cache key builders for all Herald cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use herald_core::types::id::RecipientId;

/// Prefix applied to all Herald cache keys.
const PREFIX: &str = "herald";

/// Cache key for a recipient's aggregate unread counts.
pub fn unread_counts(recipient_id: RecipientId) -> String {
    format!("{PREFIX}:counts:{recipient_id}")
}
