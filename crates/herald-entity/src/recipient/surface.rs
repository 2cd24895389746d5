//! The two read-state surfaces of a notification.

use serde::{Deserialize, Serialize};

/// A per-recipient view surface.
///
/// Every recipient tracks read and visibility state independently for the
/// persistent inbox list and the transient bell dropdown. The two are
/// coupled only by the cascade rule: deleting from the inbox also removes
/// from the bell, never the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// The persistent, list-style inbox view.
    Inbox,
    /// The transient, alert-style bell view.
    Bell,
}

impl Surface {
    /// Return the surface as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Bell => "bell",
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
