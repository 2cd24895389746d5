//! Notification creation request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::types::id::ActorId;
use herald_entity::notification::{NotificationKind, Priority, Targeting};

/// Payload for creating a notification.
///
/// Unknown kinds are rejected during deserialization by
/// [`NotificationKind`]'s parser; length bounds are checked by
/// [`Self::validated`]. Both failures map to `InvalidPayload`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNotification {
    /// Notification kind.
    pub kind: NotificationKind,
    /// Short title, 1 to 200 characters.
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    /// Body text, 1 to 4000 characters.
    #[validate(length(min = 1, max = 4000, message = "body must be 1-4000 characters"))]
    pub body: String,
    /// Priority level. Defaults to medium.
    #[serde(default)]
    pub priority: Priority,
    /// Who should receive the notification.
    pub targeting: Targeting,
    /// Creating actor. `None` means the system itself.
    #[serde(default)]
    pub created_by: Option<ActorId>,
    /// Optional logical TTL.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateNotification {
    /// Validate length bounds, mapping failures to `InvalidPayload`.
    pub fn validated(&self) -> AppResult<()> {
        self.validate().map_err(|e| {
            let details = e
                .field_errors()
                .into_iter()
                .flat_map(|(_, errors)| errors)
                .filter_map(|error| error.message.as_ref().map(ToString::to_string))
                .collect::<Vec<_>>()
                .join("; ");
            AppError::invalid_payload(format!("Invalid notification payload: {details}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::error::ErrorKind;

    fn request(title: &str, body: &str) -> CreateNotification {
        CreateNotification {
            kind: NotificationKind::Announcement,
            title: title.to_string(),
            body: body.to_string(),
            priority: Priority::default(),
            targeting: Targeting::Broadcast,
            created_by: None,
            expires_at: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request("Scheduled maintenance", "Tonight at 22:00.")
            .validated()
            .is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let err = request("", "body").validated().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPayload);
    }

    #[test]
    fn test_oversized_body_rejected() {
        let err = request("t", &"x".repeat(4001)).validated().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPayload);
    }

    #[test]
    fn test_unknown_kind_rejected_at_parse() {
        let result: Result<CreateNotification, _> = serde_json::from_value(serde_json::json!({
            "kind": "party",
            "title": "t",
            "body": "b",
            "targeting": { "mode": "broadcast" },
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_extension_kind_accepted() {
        let parsed: CreateNotification = serde_json::from_value(serde_json::json!({
            "kind": "x-billing_alert",
            "title": "t",
            "body": "b",
            "targeting": { "mode": "broadcast" },
        }))
        .unwrap();
        assert_eq!(
            parsed.kind,
            NotificationKind::Extension("x-billing_alert".to_string())
        );
    }
}
