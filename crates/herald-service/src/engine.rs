//! The notification engine facade.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use herald_core::config::cache::CacheConfig;
use herald_core::config::fanout::FanoutConfig;
use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::traits::cache::CacheProvider;
use herald_core::traits::identity::IdentityProvider;
use herald_core::traits::roster::RosterProvider;
use herald_core::types::id::{NotificationId, RecipientId};
use herald_core::types::pagination::{PageRequest, PageResponse};
use herald_database::NotificationStore;
use herald_entity::notification::{CreatorSnapshot, Notification};
use herald_entity::recipient::{RecipientView, Surface, UnreadCounts, UnreadSummary};

use crate::aggregator::UnreadAggregator;
use crate::fanout::FanoutWriter;
use crate::push::{PushEvent, PushSink, StateChange};
use crate::read_state::ReadStateSync;
use crate::request::CreateNotification;
use crate::targeting::TargetingResolver;

/// Single entry point for all notification operations.
///
/// Composes targeting resolution, fan-out, read-state synchronization,
/// and unread aggregation. Push delivery and cache invalidation fire only
/// on actual state transitions; retried no-ops are silent. Push is
/// best-effort throughout: an operation's result reflects storage alone.
#[derive(Debug, Clone)]
pub struct NotificationEngine {
    store: Arc<dyn NotificationStore>,
    identity: Arc<dyn IdentityProvider>,
    targeting: TargetingResolver,
    fanout: FanoutWriter,
    read_state: ReadStateSync,
    aggregator: UnreadAggregator,
    push: Arc<dyn PushSink>,
}

impl NotificationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn NotificationStore>,
        roster: Arc<dyn RosterProvider>,
        identity: Arc<dyn IdentityProvider>,
        cache: Arc<dyn CacheProvider>,
        push: Arc<dyn PushSink>,
        fanout_config: FanoutConfig,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            targeting: TargetingResolver::new(roster),
            fanout: FanoutWriter::new(Arc::clone(&store), fanout_config),
            read_state: ReadStateSync::new(Arc::clone(&store)),
            aggregator: UnreadAggregator::new(Arc::clone(&store), cache, cache_config),
            store,
            identity,
            push,
        }
    }

    /// Create a notification and fan it out to the resolved recipients.
    ///
    /// Validation and targeting resolution are all-or-nothing: nothing is
    /// persisted unless the payload is valid and every targeted id exists.
    /// Each recipient then gets a `Created` push and a fresh counts cache.
    #[instrument(skip(self, request), fields(kind = %request.kind, mode = %request.targeting.mode()))]
    pub async fn create(&self, request: CreateNotification) -> AppResult<Notification> {
        request.validated()?;
        let recipients = self.targeting.resolve(&request.targeting).await?;

        let creator = match request.created_by {
            Some(actor) => self.identity.display_identity(actor).await?.into(),
            None => CreatorSnapshot::system(),
        };

        let now = Utc::now();
        let notification = Notification {
            id: NotificationId::new(),
            kind: request.kind,
            title: request.title,
            body: request.body,
            priority: request.priority,
            creator,
            targeting_mode: request.targeting.mode(),
            created_at: now,
            expires_at: request.expires_at,
            active: true,
        };

        self.store.insert_notification(&notification).await?;
        self.fanout.fan_out(notification.id, &recipients, now).await?;

        info!(
            notification_id = %notification.id,
            recipients = recipients.len(),
            "Notification created"
        );

        for recipient_id in recipients {
            self.aggregator.invalidate(recipient_id).await;
            self.push
                .push(
                    recipient_id,
                    PushEvent::Created {
                        notification: notification.clone(),
                    },
                )
                .await;
        }

        Ok(notification)
    }

    /// Fetch a notification by id.
    pub async fn get(&self, id: NotificationId) -> AppResult<Notification> {
        self.store
            .get_notification(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} does not exist")))
    }

    /// Page through a recipient's visible notifications on one surface,
    /// newest first, together with the current badge summary so clients
    /// render both from one call.
    pub async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
        page: &PageRequest,
    ) -> AppResult<(PageResponse<RecipientView>, UnreadSummary)> {
        let now = Utc::now();
        let items = self
            .store
            .list_for_recipient(recipient_id, surface, page, now)
            .await?;
        let summary = self.aggregator.summary(recipient_id, now).await?;
        Ok((items, summary))
    }

    /// Mark one notification read on one surface. Returns whether the
    /// flag actually transitioned.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
        surface: Surface,
    ) -> AppResult<bool> {
        let transitioned = self
            .read_state
            .mark_read(notification_id, recipient_id, surface, Utc::now())
            .await?;

        if transitioned {
            self.aggregator.invalidate(recipient_id).await;
            self.push
                .push(
                    recipient_id,
                    PushEvent::StateChanged {
                        notification_id,
                        change: StateChange::Read { surface },
                    },
                )
                .await;
        }
        Ok(transitioned)
    }

    /// Dismiss one notification from the recipient's bell.
    #[instrument(skip(self))]
    pub async fn remove_from_bell(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
    ) -> AppResult<()> {
        self.read_state
            .remove_from_bell(notification_id, recipient_id, Utc::now())
            .await?;

        self.aggregator.invalidate(recipient_id).await;
        self.push
            .push(
                recipient_id,
                PushEvent::StateChanged {
                    notification_id,
                    change: StateChange::RemovedFromBell,
                },
            )
            .await;
        Ok(())
    }

    /// Delete one notification from the recipient's inbox. The bell
    /// removal cascades atomically.
    #[instrument(skip(self))]
    pub async fn delete_from_inbox(
        &self,
        notification_id: NotificationId,
        recipient_id: RecipientId,
    ) -> AppResult<()> {
        self.read_state
            .delete_from_inbox(notification_id, recipient_id, Utc::now())
            .await?;

        self.aggregator.invalidate(recipient_id).await;
        self.push
            .push(
                recipient_id,
                PushEvent::StateChanged {
                    notification_id,
                    change: StateChange::DeletedFromInbox,
                },
            )
            .await;
        Ok(())
    }

    /// Mark every visible unread notification on `surface` read. Side
    /// effects coalesce into a single `CountsChanged` push carrying the
    /// fresh summary, instead of one event per row.
    #[instrument(skip(self))]
    pub async fn mark_all_read(
        &self,
        recipient_id: RecipientId,
        surface: Surface,
    ) -> AppResult<u64> {
        let now = Utc::now();
        let changed = self.read_state.mark_all_read(recipient_id, surface, now).await?;

        if changed > 0 {
            self.aggregator.invalidate(recipient_id).await;
            let summary = self.aggregator.summary(recipient_id, now).await?;
            self.push
                .push(recipient_id, PushEvent::CountsChanged { summary })
                .await;
        }
        Ok(changed)
    }

    /// The recipient's aggregate counts, cached.
    pub async fn unread_counts(&self, recipient_id: RecipientId) -> AppResult<UnreadCounts> {
        self.aggregator.counts(recipient_id, Utc::now()).await
    }

    /// The recipient's badge summary, cached.
    pub async fn unread_summary(&self, recipient_id: RecipientId) -> AppResult<UnreadSummary> {
        self.aggregator.summary(recipient_id, Utc::now()).await
    }

    /// Administrative soft-disable toggle. Flushes the whole counts cache
    /// since the affected recipient set is not tracked.
    #[instrument(skip(self))]
    pub async fn set_active(&self, notification_id: NotificationId, active: bool) -> AppResult<()> {
        self.store.set_active(notification_id, active).await?;
        self.aggregator.invalidate_all().await;
        info!(%notification_id, active, "Notification active flag changed");
        Ok(())
    }

    /// Physically delete notifications past their logical TTL. Returns
    /// the number purged.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let purged = self.store.purge_expired(Utc::now()).await?;
        if purged > 0 {
            self.aggregator.invalidate_all().await;
            info!(purged, "Purged expired notifications");
        }
        Ok(purged)
    }
}
