//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use herald_core::types::id::NotificationId;

use super::creator::CreatorSnapshot;
use super::kind::NotificationKind;
use super::priority::Priority;
use super::targeting::TargetingMode;

/// A system-originated message distributed to one or many recipients.
///
/// Content is immutable after creation; only `active` and `expires_at`
/// may change, through administrative operations. Per-recipient read and
/// visibility state lives in
/// [`RecipientState`](crate::recipient::RecipientState) rows keyed by
/// `(notification_id, recipient_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier, assigned at creation.
    pub id: NotificationId,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Priority level.
    pub priority: Priority,
    /// Creator display identity captured at creation time.
    pub creator: CreatorSnapshot,
    /// How the recipient set was chosen.
    pub targeting_mode: TargetingMode,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Logical TTL. Once past, the notification is excluded from every
    /// active query; physical deletion is the purge sweep's concern.
    pub expires_at: Option<DateTime<Utc>>,
    /// Soft-disable switch, independent of expiry.
    pub active: bool,
}

impl Notification {
    /// Whether the notification has passed its logical TTL at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Whether the notification participates in active queries at `now`.
    ///
    /// This is the notification-level half of both surface visibility
    /// predicates; the per-recipient half lives on `RecipientState`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired_at(now)
    }
}

impl FromRow<'_, PgRow> for Notification {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            kind: row.try_get("kind")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            priority: row.try_get("priority")?,
            creator: CreatorSnapshot {
                name: row.try_get("creator_name")?,
                avatar_url: row.try_get("creator_avatar_url")?,
                role_label: row.try_get("creator_role_label")?,
            },
            targeting_mode: row.try_get("targeting_mode")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
            active: row.try_get("active")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(expires_at: Option<DateTime<Utc>>, active: bool) -> Notification {
        Notification {
            id: NotificationId::new(),
            kind: NotificationKind::Announcement,
            title: "title".to_string(),
            body: "body".to_string(),
            priority: Priority::Medium,
            creator: CreatorSnapshot::system(),
            targeting_mode: TargetingMode::Broadcast,
            created_at: Utc::now(),
            expires_at,
            active,
        }
    }

    #[test]
    fn test_expiry_is_logical() {
        let now = Utc::now();
        let live = sample(Some(now + Duration::hours(1)), true);
        let expired = sample(Some(now - Duration::seconds(1)), true);
        assert!(live.is_live_at(now));
        assert!(!expired.is_live_at(now));
    }

    #[test]
    fn test_inactive_overrides_expiry() {
        let now = Utc::now();
        let disabled = sample(None, false);
        assert!(!disabled.is_expired_at(now));
        assert!(!disabled.is_live_at(now));
    }
}
