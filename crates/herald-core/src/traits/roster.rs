//! Roster provider seam.
//!
//! Account management is an external collaborator; the engine only ever
//! asks it two questions, both at notification creation time.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::RecipientId;

/// Source of recipient account knowledge for targeting resolution.
#[async_trait]
pub trait RosterProvider: Send + Sync + std::fmt::Debug + 'static {
    /// A live snapshot of all currently-active account ids.
    ///
    /// Broadcast targeting resolves against this snapshot once; accounts
    /// deactivated afterwards simply keep their state rows, and accounts
    /// created afterwards are not retro-targeted.
    async fn list_active_recipient_ids(&self) -> AppResult<Vec<RecipientId>>;

    /// Of the given ids, return those that do not refer to any existing
    /// account. Used to validate explicit-list targeting all-or-nothing.
    async fn find_missing(&self, ids: &[RecipientId]) -> AppResult<Vec<RecipientId>>;
}
