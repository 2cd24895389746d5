//! Joined listing item.

use serde::{Deserialize, Serialize};

use crate::notification::Notification;

use super::model::RecipientState;

/// One item of a recipient-facing listing: the notification content joined
/// with that recipient's own state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientView {
    /// The notification content.
    pub notification: Notification,
    /// The requesting recipient's state for it.
    pub state: RecipientState,
}
