//! Targeting rules for notification creation.

use serde::{Deserialize, Serialize};

use herald_core::types::id::RecipientId;

/// How the recipient set of a notification was chosen, recorded on the
/// stored notification for later inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "targeting_mode", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    /// Every account active at creation time.
    Broadcast,
    /// An explicit, validated list of recipient ids.
    ExplicitList,
    /// Exactly one recipient.
    Single,
}

impl TargetingMode {
    /// Return the mode as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broadcast => "broadcast",
            Self::ExplicitList => "explicit_list",
            Self::Single => "single",
        }
    }
}

impl std::fmt::Display for TargetingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Targeting rule supplied with a creation request.
///
/// Resolution happens exactly once, at creation time: a broadcast resolves
/// to a live snapshot of active accounts, never to a reference that would
/// pick up later joiners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Targeting {
    /// Target all currently-active accounts.
    Broadcast,
    /// Target an explicit list of recipients. Every id must refer to an
    /// existing account or the whole creation fails.
    ExplicitList {
        /// The recipients to target.
        recipient_ids: Vec<RecipientId>,
    },
    /// Target a single recipient.
    Single {
        /// The recipient to target.
        recipient_id: RecipientId,
    },
}

impl Targeting {
    /// The mode recorded on the stored notification.
    pub fn mode(&self) -> TargetingMode {
        match self {
            Self::Broadcast => TargetingMode::Broadcast,
            Self::ExplicitList { .. } => TargetingMode::ExplicitList,
            Self::Single { .. } => TargetingMode::Single,
        }
    }
}
