//! Identity snapshot provider seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::ActorId;

/// Display identity of an actor as known at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayIdentity {
    /// Display name.
    pub name: String,
    /// Avatar URL, if any.
    pub avatar_url: Option<String>,
    /// Role label shown next to the name.
    pub role_label: String,
}

/// Source of actor display identities, captured into the creator snapshot
/// at notification creation time.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Current display identity of `actor`, or `NotFound` if the actor
    /// does not exist.
    async fn display_identity(&self, actor: ActorId) -> AppResult<DisplayIdentity>;
}
