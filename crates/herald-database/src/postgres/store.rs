//! PostgreSQL notification store.
//!
//! Row-per-pair layout: `notifications` holds content, `recipient_states`
//! holds one row per `(notification_id, recipient_id)`. All flag mutations
//! are single conditional UPDATE statements joined against notification
//! liveness, so per-pair serialization and the read/visibility predicates
//! are enforced by the database itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use herald_core::error::{AppError, ErrorKind};
use herald_core::result::AppResult;
use herald_core::types::id::{NotificationId, RecipientId};
use herald_core::types::pagination::{PageRequest, PageResponse};
use herald_entity::notification::Notification;
use herald_entity::recipient::{RecipientState, RecipientView, Surface, UnreadCounts};

use crate::store::NotificationStore;

/// Notification store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    /// Create a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Classify a pair that a conditional update did not touch: distinguish
    /// "already read" (a no-op success for mark-read) from "missing or not
    /// visible" (`NotFound`).
    async fn probe_pair(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<PairProbe> {
        let row = sqlx::query(
            "SELECT \
                 (n.active AND (n.expires_at IS NULL OR n.expires_at > $3)) AS live, \
                 rs.is_read_inbox, rs.is_read_bell, \
                 rs.is_removed_from_bell, rs.is_deleted_from_inbox \
             FROM recipient_states rs \
             JOIN notifications n ON n.id = rs.notification_id \
             WHERE rs.notification_id = $1 AND rs.recipient_id = $2",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to probe recipient state"))?;

        let Some(row) = row else {
            return Ok(PairProbe::Missing);
        };

        let live: bool = row.try_get("live").map_err(db_err("Bad probe row"))?;
        let (read, present) = match surface {
            Surface::Inbox => (
                row.try_get::<bool, _>("is_read_inbox")
                    .map_err(db_err("Bad probe row"))?,
                !row.try_get::<bool, _>("is_deleted_from_inbox")
                    .map_err(db_err("Bad probe row"))?,
            ),
            Surface::Bell => (
                row.try_get::<bool, _>("is_read_bell")
                    .map_err(db_err("Bad probe row"))?,
                !row.try_get::<bool, _>("is_removed_from_bell")
                    .map_err(db_err("Bad probe row"))?,
            ),
        };

        if !live || !present {
            Ok(PairProbe::NotVisible)
        } else if read {
            Ok(PairProbe::AlreadyRead)
        } else {
            Ok(PairProbe::Visible)
        }
    }
}

/// Outcome of a visibility probe on one pair.
enum PairProbe {
    Missing,
    NotVisible,
    AlreadyRead,
    Visible,
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert_notification(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications \
                 (id, kind, title, body, priority, creator_name, creator_avatar_url, \
                  creator_role_label, targeting_mode, created_at, expires_at, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(notification.id)
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.priority)
        .bind(&notification.creator.name)
        .bind(&notification.creator.avatar_url)
        .bind(&notification.creator.role_label)
        .bind(notification.targeting_mode)
        .bind(notification.created_at)
        .bind(notification.expires_at)
        .bind(notification.active)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert notification"))?;
        Ok(())
    }

    async fn get_notification(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to fetch notification"))
    }

    async fn insert_states_if_absent(
        &self,
        notification_id: NotificationId,
        recipients: &[RecipientId],
        created_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        if recipients.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Uuid> = recipients.iter().map(|r| r.into_uuid()).collect();
        let result = sqlx::query(
            "INSERT INTO recipient_states (notification_id, recipient_id, created_at) \
             SELECT $1, r, $3 FROM UNNEST($2::uuid[]) AS r \
             ON CONFLICT (notification_id, recipient_id) DO NOTHING",
        )
        .bind(notification_id)
        .bind(&ids)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert recipient states"))?;

        Ok(result.rows_affected())
    }

    async fn get_state(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
    ) -> AppResult<Option<RecipientState>> {
        sqlx::query_as::<_, RecipientState>(
            "SELECT * FROM recipient_states \
             WHERE notification_id = $1 AND recipient_id = $2",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to fetch recipient state"))
    }

    async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let sql = match surface {
            Surface::Inbox => {
                "UPDATE recipient_states rs \
                 SET is_read_inbox = TRUE, read_inbox_at = $3 \
                 FROM notifications n \
                 WHERE n.id = rs.notification_id \
                   AND rs.notification_id = $1 AND rs.recipient_id = $2 \
                   AND rs.is_read_inbox = FALSE \
                   AND rs.is_deleted_from_inbox = FALSE \
                   AND n.active AND (n.expires_at IS NULL OR n.expires_at > $3)"
            }
            Surface::Bell => {
                "UPDATE recipient_states rs \
                 SET is_read_bell = TRUE, read_bell_at = $3 \
                 FROM notifications n \
                 WHERE n.id = rs.notification_id \
                   AND rs.notification_id = $1 AND rs.recipient_id = $2 \
                   AND rs.is_read_bell = FALSE \
                   AND rs.is_removed_from_bell = FALSE \
                   AND n.active AND (n.expires_at IS NULL OR n.expires_at > $3)"
            }
        };

        let result = sqlx::query(sql)
            .bind(notification_id)
            .bind(recipient_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to mark read"))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        match self
            .probe_pair(notification_id, recipient_id, surface, now)
            .await?
        {
            PairProbe::AlreadyRead => Ok(false),
            // Raced with another writer between UPDATE and probe; the flag
            // is set either way, and the other writer owns the side effects.
            PairProbe::Visible => Ok(false),
            PairProbe::Missing | PairProbe::NotVisible => Err(pair_not_found(
                notification_id,
                recipient_id,
                surface,
            )),
        }
    }

    async fn remove_from_bell(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE recipient_states rs \
             SET is_removed_from_bell = TRUE \
             FROM notifications n \
             WHERE n.id = rs.notification_id \
               AND rs.notification_id = $1 AND rs.recipient_id = $2 \
               AND rs.is_removed_from_bell = FALSE \
               AND n.active AND (n.expires_at IS NULL OR n.expires_at > $3)",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to remove from bell"))?;

        if result.rows_affected() == 0 {
            return Err(pair_not_found(notification_id, recipient_id, Surface::Bell));
        }
        Ok(())
    }

    async fn delete_from_inbox(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        // Single statement: the bell removal cascades in the same atomic
        // update, never as a second write that could be lost.
        let result = sqlx::query(
            "UPDATE recipient_states rs \
             SET is_deleted_from_inbox = TRUE, is_removed_from_bell = TRUE \
             FROM notifications n \
             WHERE n.id = rs.notification_id \
               AND rs.notification_id = $1 AND rs.recipient_id = $2 \
               AND rs.is_deleted_from_inbox = FALSE \
               AND n.active AND (n.expires_at IS NULL OR n.expires_at > $3)",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to delete from inbox"))?;

        if result.rows_affected() == 0 {
            return Err(pair_not_found(
                notification_id,
                recipient_id,
                Surface::Inbox,
            ));
        }
        Ok(())
    }

    async fn mark_all_read(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let sql = match surface {
            Surface::Inbox => {
                "UPDATE recipient_states rs \
                 SET is_read_inbox = TRUE, read_inbox_at = $2 \
                 FROM notifications n \
                 WHERE n.id = rs.notification_id \
                   AND rs.recipient_id = $1 \
                   AND rs.is_read_inbox = FALSE \
                   AND rs.is_deleted_from_inbox = FALSE \
                   AND n.active AND (n.expires_at IS NULL OR n.expires_at > $2)"
            }
            Surface::Bell => {
                "UPDATE recipient_states rs \
                 SET is_read_bell = TRUE, read_bell_at = $2 \
                 FROM notifications n \
                 WHERE n.id = rs.notification_id \
                   AND rs.recipient_id = $1 \
                   AND rs.is_read_bell = FALSE \
                   AND rs.is_removed_from_bell = FALSE \
                   AND n.active AND (n.expires_at IS NULL OR n.expires_at > $2)"
            }
        };

        let result = sqlx::query(sql)
            .bind(recipient_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to mark all read"))?;

        Ok(result.rows_affected())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<RecipientView>> {
        let presence = match surface {
            Surface::Inbox => "rs.is_deleted_from_inbox = FALSE",
            Surface::Bell => "rs.is_removed_from_bell = FALSE",
        };

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) \
             FROM recipient_states rs \
             JOIN notifications n ON n.id = rs.notification_id \
             WHERE rs.recipient_id = $1 AND {presence} \
               AND n.active AND (n.expires_at IS NULL OR n.expires_at > $2)"
        ))
        .bind(recipient_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count visible notifications"))?;

        let rows = sqlx::query(&format!(
            "SELECT n.id, n.kind, n.title, n.body, n.priority, n.creator_name, \
                    n.creator_avatar_url, n.creator_role_label, n.targeting_mode, \
                    n.created_at, n.expires_at, n.active, \
                    rs.notification_id, rs.recipient_id, rs.is_read_inbox, \
                    rs.read_inbox_at, rs.is_read_bell, rs.read_bell_at, \
                    rs.is_removed_from_bell, rs.is_deleted_from_inbox, \
                    rs.created_at AS state_created_at \
             FROM recipient_states rs \
             JOIN notifications n ON n.id = rs.notification_id \
             WHERE rs.recipient_id = $1 AND {presence} \
               AND n.active AND (n.expires_at IS NULL OR n.expires_at > $2) \
             ORDER BY n.created_at DESC, n.id DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(recipient_id)
        .bind(now)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list notifications"))?;

        let items = rows
            .into_iter()
            .map(view_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("Failed to decode listing row"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn counts(
        &self,
        recipient_id: RecipientId,
        now: DateTime<Utc>,
    ) -> AppResult<UnreadCounts> {
        let row = sqlx::query(
            "SELECT \
                 COUNT(*) FILTER (WHERE NOT rs.is_deleted_from_inbox) AS inbox_visible, \
                 COUNT(*) FILTER (WHERE NOT rs.is_deleted_from_inbox \
                                    AND NOT rs.is_read_inbox) AS inbox_unread, \
                 COUNT(*) FILTER (WHERE NOT rs.is_removed_from_bell) AS bell_visible, \
                 COUNT(*) FILTER (WHERE NOT rs.is_removed_from_bell \
                                    AND NOT rs.is_read_bell) AS bell_unread \
             FROM recipient_states rs \
             JOIN notifications n ON n.id = rs.notification_id \
             WHERE rs.recipient_id = $1 \
               AND n.active AND (n.expires_at IS NULL OR n.expires_at > $2)",
        )
        .bind(recipient_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to aggregate counts"))?;

        Ok(UnreadCounts {
            inbox_unread: count_column(&row, "inbox_unread")?,
            bell_unread: count_column(&row, "bell_unread")?,
            inbox_visible: count_column(&row, "inbox_visible")?,
            bell_visible: count_column(&row, "bell_visible")?,
        })
    }

    async fn set_active(&self, notification_id: NotificationId, active: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE notifications SET active = $2 WHERE id = $1")
            .bind(notification_id)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to set active flag"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Notification {notification_id} does not exist"
            )));
        }
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        // Recipient states go with the notification via ON DELETE CASCADE.
        let result = sqlx::query(
            "DELETE FROM notifications WHERE expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to purge expired notifications"))?;

        Ok(result.rows_affected())
    }
}

/// Decode one joined listing row into a `RecipientView`.
fn view_from_row(row: PgRow) -> Result<RecipientView, sqlx::Error> {
    let notification = Notification::from_row(&row)?;
    let state = RecipientState {
        notification_id: row.try_get("notification_id")?,
        recipient_id: row.try_get("recipient_id")?,
        is_read_inbox: row.try_get("is_read_inbox")?,
        read_inbox_at: row.try_get("read_inbox_at")?,
        is_read_bell: row.try_get("is_read_bell")?,
        read_bell_at: row.try_get("read_bell_at")?,
        is_removed_from_bell: row.try_get("is_removed_from_bell")?,
        is_deleted_from_inbox: row.try_get("is_deleted_from_inbox")?,
        created_at: row.try_get("state_created_at")?,
    };
    Ok(RecipientView {
        notification,
        state,
    })
}

fn count_column(row: &PgRow, name: &str) -> AppResult<u64> {
    let value: i64 = row
        .try_get(name)
        .map_err(db_err("Failed to decode count column"))?;
    Ok(value.max(0) as u64)
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, format!("{message}: {e}"), e)
}

fn pair_not_found(
    notification_id: NotificationId,
    recipient_id: RecipientId,
    surface: Surface,
) -> AppError {
    AppError::not_found(format!(
        "Notification {notification_id} is not visible on the {surface} surface \
         for recipient {recipient_id}"
    ))
}
