//! Notification kind enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use herald_core::AppError;

/// Extension kinds must start with this prefix.
const EXTENSION_PREFIX: &str = "x-";

/// Kind of a system notification.
///
/// The set is closed apart from one explicit extension point: kinds in the
/// `x-` namespace (lowercase ASCII identifiers, e.g. `x-billing`) are
/// accepted as [`NotificationKind::Extension`]. Any other string is
/// rejected at the boundary so an invalid kind fails at creation time,
/// not at display time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NotificationKind {
    /// General announcement.
    Announcement,
    /// Scheduled or emergency maintenance notice.
    Maintenance,
    /// Product or content update.
    Update,
    /// Warning requiring recipient attention.
    Warning,
    /// The recipient's authorization level changed.
    AuthLevelChange,
    /// Deployment-specific kind in the `x-` namespace.
    Extension(String),
}

impl NotificationKind {
    /// Return the kind as its wire string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Announcement => "announcement",
            Self::Maintenance => "maintenance",
            Self::Update => "update",
            Self::Warning => "warning",
            Self::AuthLevelChange => "auth_level_change",
            Self::Extension(name) => name,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "announcement" => Ok(Self::Announcement),
            "maintenance" => Ok(Self::Maintenance),
            "update" => Ok(Self::Update),
            "warning" => Ok(Self::Warning),
            "auth_level_change" => Ok(Self::AuthLevelChange),
            other => {
                let body = other.strip_prefix(EXTENSION_PREFIX).unwrap_or("");
                let valid = !body.is_empty()
                    && body
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
                if valid {
                    Ok(Self::Extension(other.to_string()))
                } else {
                    Err(AppError::invalid_payload(format!(
                        "Invalid notification kind: '{other}'. Expected one of: announcement, \
                         maintenance, update, warning, auth_level_change, or an x- extension kind"
                    )))
                }
            }
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl TryFrom<String> for NotificationKind {
    type Error = AppError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl sqlx::Type<sqlx::Postgres> for NotificationKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for NotificationKind {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for NotificationKind {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        raw.parse().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_parse() {
        assert_eq!(
            "announcement".parse::<NotificationKind>().unwrap(),
            NotificationKind::Announcement
        );
        assert_eq!(
            "auth_level_change".parse::<NotificationKind>().unwrap(),
            NotificationKind::AuthLevelChange
        );
    }

    #[test]
    fn test_extension_namespace() {
        assert_eq!(
            "x-billing".parse::<NotificationKind>().unwrap(),
            NotificationKind::Extension("x-billing".to_string())
        );
        assert!("x-".parse::<NotificationKind>().is_err());
        assert!("x-Billing".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_free_form_strings_rejected() {
        assert!("promo".parse::<NotificationKind>().is_err());
        assert!("".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_string() {
        let json = serde_json::to_string(&NotificationKind::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
        let parsed: NotificationKind = serde_json::from_str("\"x-billing\"").unwrap();
        assert_eq!(parsed, NotificationKind::Extension("x-billing".to_string()));
    }
}
