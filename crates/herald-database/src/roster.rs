//! Account roster and identity lookups over the accounts table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use herald_core::error::{AppError, ErrorKind};
use herald_core::result::AppResult;
use herald_core::traits::identity::{DisplayIdentity, IdentityProvider};
use herald_core::traits::roster::RosterProvider;
use herald_core::types::id::{ActorId, RecipientId};

/// Roster provider backed by the accounts table.
#[derive(Debug, Clone)]
pub struct PgRosterProvider {
    pool: PgPool,
}

impl PgRosterProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterProvider for PgRosterProvider {
    async fn list_active_recipient_ids(&self) -> AppResult<Vec<RecipientId>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE active ORDER BY created_at")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to list active accounts", e)
                })?;
        Ok(ids.into_iter().map(RecipientId::from).collect())
    }

    async fn find_missing(&self, ids: &[RecipientId]) -> AppResult<Vec<RecipientId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        let known: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM accounts WHERE active AND id = ANY($1)",
        )
        .bind(&raw)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve recipient ids", e)
        })?;

        Ok(ids
            .iter()
            .filter(|id| !known.contains(id.as_uuid()))
            .copied()
            .collect())
    }
}

/// Identity provider backed by the accounts table.
#[derive(Debug, Clone)]
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn display_identity(&self, actor_id: ActorId) -> AppResult<DisplayIdentity> {
        let row: Option<(String, Option<String>, String)> = sqlx::query_as(
            "SELECT display_name, avatar_url, role_label FROM accounts WHERE id = $1",
        )
        .bind(actor_id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load actor identity", e)
        })?;

        let (name, avatar_url, role_label) = row.ok_or_else(|| {
            AppError::not_found(format!("Account {actor_id} does not exist"))
        })?;

        Ok(DisplayIdentity {
            name,
            avatar_url,
            role_label,
        })
    }
}
