//! Targeting resolution.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::traits::roster::RosterProvider;
use herald_core::types::id::RecipientId;
use herald_entity::notification::Targeting;

/// Resolves a targeting rule into a concrete recipient set, exactly once
/// at creation time.
#[derive(Debug, Clone)]
pub struct TargetingResolver {
    roster: Arc<dyn RosterProvider>,
}

impl TargetingResolver {
    pub fn new(roster: Arc<dyn RosterProvider>) -> Self {
        Self { roster }
    }

    /// Resolve `targeting` into recipient ids.
    ///
    /// Explicit lists are validated all-or-nothing: a single unknown id
    /// fails the whole resolution with every offending id named, and
    /// nothing is created. Duplicates are collapsed, preserving first
    /// occurrence order. The resolved set may be empty (an empty explicit
    /// list, or a broadcast over zero active accounts); creation then
    /// stores the notification with no recipient states.
    pub async fn resolve(&self, targeting: &Targeting) -> AppResult<Vec<RecipientId>> {
        match targeting {
            Targeting::Broadcast => {
                let recipients = self.roster.list_active_recipient_ids().await?;
                debug!(count = recipients.len(), "Resolved broadcast target set");
                Ok(recipients)
            }
            Targeting::ExplicitList { recipient_ids } => {
                let deduped = dedupe(recipient_ids);
                self.ensure_known(&deduped).await?;
                Ok(deduped)
            }
            Targeting::Single { recipient_id } => {
                let recipients = vec![*recipient_id];
                self.ensure_known(&recipients).await?;
                Ok(recipients)
            }
        }
    }

    async fn ensure_known(&self, ids: &[RecipientId]) -> AppResult<()> {
        let missing = self.roster.find_missing(ids).await?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::invalid_recipients(missing))
        }
    }
}

fn dedupe(ids: &[RecipientId]) -> Vec<RecipientId> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::error::ErrorKind;

    #[derive(Debug, Default)]
    struct FixedRoster {
        active: Vec<RecipientId>,
    }

    #[async_trait]
    impl RosterProvider for FixedRoster {
        async fn list_active_recipient_ids(&self) -> AppResult<Vec<RecipientId>> {
            Ok(self.active.clone())
        }

        async fn find_missing(&self, ids: &[RecipientId]) -> AppResult<Vec<RecipientId>> {
            Ok(ids
                .iter()
                .filter(|id| !self.active.contains(id))
                .copied()
                .collect())
        }
    }

    fn resolver(active: Vec<RecipientId>) -> TargetingResolver {
        TargetingResolver::new(Arc::new(FixedRoster { active }))
    }

    #[tokio::test]
    async fn test_broadcast_snapshots_active_accounts() {
        let a = RecipientId::new();
        let b = RecipientId::new();
        let resolved = resolver(vec![a, b])
            .resolve(&Targeting::Broadcast)
            .await
            .unwrap();
        assert_eq!(resolved, vec![a, b]);
    }

    #[tokio::test]
    async fn test_explicit_list_dedupes() {
        let a = RecipientId::new();
        let b = RecipientId::new();
        let resolved = resolver(vec![a, b])
            .resolve(&Targeting::ExplicitList {
                recipient_ids: vec![a, b, a],
            })
            .await
            .unwrap();
        assert_eq!(resolved, vec![a, b]);
    }

    #[tokio::test]
    async fn test_unknown_ids_fail_all_or_nothing() {
        let known = RecipientId::new();
        let ghost = RecipientId::new();
        let err = resolver(vec![known])
            .resolve(&Targeting::ExplicitList {
                recipient_ids: vec![known, ghost],
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRecipient);
        assert!(err.message.contains(&ghost.to_string()));
    }

    #[tokio::test]
    async fn test_empty_explicit_list_resolves_to_empty_set() {
        let resolved = resolver(vec![RecipientId::new()])
            .resolve(&Targeting::ExplicitList {
                recipient_ids: vec![],
            })
            .await
            .unwrap();
        assert!(resolved.is_empty());
    }
}
