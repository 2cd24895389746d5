//! Creator display identity snapshot.

use serde::{Deserialize, Serialize};

use herald_core::traits::identity::DisplayIdentity;

/// Display identity of the actor that created a notification, captured at
/// creation time.
///
/// Denormalized on purpose: later edits to the actor's profile must not
/// retroactively change historical messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorSnapshot {
    /// Display name at creation time.
    pub name: String,
    /// Avatar URL at creation time, if any.
    pub avatar_url: Option<String>,
    /// Role label shown next to the name (e.g. "Administrator").
    pub role_label: String,
}

impl CreatorSnapshot {
    /// Snapshot used for messages originated by the system itself rather
    /// than a human actor.
    pub fn system() -> Self {
        Self {
            name: "System".to_string(),
            avatar_url: None,
            role_label: "system".to_string(),
        }
    }
}

impl From<DisplayIdentity> for CreatorSnapshot {
    fn from(identity: DisplayIdentity) -> Self {
        Self {
            name: identity.name,
            avatar_url: identity.avatar_url,
            role_label: identity.role_label,
        }
    }
}
