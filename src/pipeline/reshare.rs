// Reshare coordinator: classify mention -> resolve target -> reshare once.
//
// This is the core of the bot. For every mention it:
// 1. Classifies the body into a command (or nothing)
// 2. Resolves the target post (the mention itself, or its parent)
// 3. Reshares it at most once, fenced by a durable record per post id
//
// The record is checked and written under a per-id lock so two overlapping
// batches can't both reblog the same post. The watermark only moves after a
// whole batch succeeds; a transient error mid-batch leaves it in place so the
// batch is retried next tick, and the records make that retry harmless. A
// mention the server refuses outright is skipped so it can't hold the batch.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::locks::KeyedLocks;
use crate::command::{Classifier, Command};
use crate::db::models::ReshareResult;
use crate::db::Store;
use crate::mastodon::types::{Message, Notification, StatusId, Visibility};
use crate::mastodon::{is_rejected, Platform};

/// Reply sent when asked to reshare a private or direct post.
pub const INELIGIBLE_VISIBILITY_NOTICE: &str =
    "I can only reshare posts that are public or unlisted.";

/// Reply sent when asked to share the parent of a post that isn't a reply.
pub const NOT_A_REPLY_NOTICE: &str =
    "You asked me to share the parent post, but your post isn't a reply to anything.";

/// Marker context attached to every store failure.
///
/// Dedup correctness depends on the store, so the run loop treats these as
/// fatal while remote errors just wait for the next tick. Check with
/// `err.downcast_ref::<StoreUnavailable>()`.
#[derive(Debug, Clone, Copy)]
pub struct StoreUnavailable;

impl fmt::Display for StoreUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("durable store unavailable")
    }
}

/// Whether an error came from the durable store.
pub fn is_store_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StoreUnavailable>().is_some()
}

/// Result of one `reshare` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReshareOutcome {
    /// A record already existed; nothing was done.
    AlreadyHandled,
    /// Reblogged as the given status.
    Reshared(StatusId),
    /// Ineligible visibility; a notice was posted and the decline recorded.
    Declined,
}

/// Result of one `handle` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// No command in the message.
    Ignored,
    /// A command ran against the target post.
    Reshare(ReshareOutcome),
    /// `parent` on a post with no parent; a notice was posted.
    NotAReply,
    /// The server permanently refused a request for this mention (deleted
    /// parent, blocked reblog). Nothing was recorded.
    Rejected,
    /// Mention notification without a status attached.
    MissingStatus,
}

impl HandleOutcome {
    /// Whether the mention was acted on, for the driver counters.
    pub fn is_handled(&self) -> bool {
        !matches!(self, HandleOutcome::Rejected | HandleOutcome::MissingStatus)
    }
}

/// Counters for one polling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub notifications: usize,
    pub mentions: usize,
    pub reshared: usize,
    /// Mentions skipped as rejected or missing their status.
    pub skipped: usize,
    pub watermark: StatusId,
}

pub struct ReshareCoordinator {
    platform: Arc<dyn Platform>,
    store: Arc<dyn Store>,
    classifier: Classifier,
    reshare_locks: KeyedLocks,
    batch_lock: Mutex<()>,
}

impl ReshareCoordinator {
    pub fn new(platform: Arc<dyn Platform>, store: Arc<dyn Store>, classifier: Classifier) -> Self {
        Self {
            platform,
            store,
            classifier,
            reshare_locks: KeyedLocks::new(),
            batch_lock: Mutex::new(()),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Act on one mention.
    pub async fn handle(&self, message: &Message) -> Result<HandleOutcome> {
        let Some(command) = self.classifier.classify(&message.content) else {
            debug!(status_id = %message.id, "No command in mention");
            return Ok(HandleOutcome::Ignored);
        };

        info!(
            status_id = %message.id,
            author = message.author_handle(),
            command = %command,
            "Recognized command"
        );

        match command {
            Command::Retoot => Ok(HandleOutcome::Reshare(self.reshare(message).await?)),
            Command::ShareParent => match message.in_reply_to_id {
                None => {
                    self.platform
                        .post_reply(
                            message.author_handle(),
                            NOT_A_REPLY_NOTICE,
                            message.id,
                            Visibility::Unlisted,
                        )
                        .await?;
                    info!(status_id = %message.id, "Parent requested on a non-reply");
                    Ok(HandleOutcome::NotAReply)
                }
                Some(parent_id) => {
                    let parent = self.platform.fetch_message(parent_id).await?;
                    Ok(HandleOutcome::Reshare(self.reshare(&parent).await?))
                }
            },
        }
    }

    /// Reshare `message` unless it has already been handled.
    pub async fn reshare(&self, message: &Message) -> Result<ReshareOutcome> {
        let _guard = self.reshare_locks.lock(message.id).await;

        if let Some(record) = self
            .store
            .get_reshare(message.id)
            .await
            .context(StoreUnavailable)?
        {
            info!(
                status_id = %message.id,
                result = %record.result,
                "Already handled, skipping"
            );
            return Ok(ReshareOutcome::AlreadyHandled);
        }

        let (result, outcome) = if message.visibility.is_reshareable() {
            let reshare_id = self.platform.reshare_message(message.id).await?;
            (
                ReshareResult::Reshared(reshare_id),
                ReshareOutcome::Reshared(reshare_id),
            )
        } else {
            self.platform
                .post_reply(
                    message.author_handle(),
                    INELIGIBLE_VISIBILITY_NOTICE,
                    message.id,
                    Visibility::Unlisted,
                )
                .await?;
            (ReshareResult::Declined, ReshareOutcome::Declined)
        };

        let inserted = self
            .store
            .insert_reshare(message.id, result)
            .await
            .context(StoreUnavailable)?;
        if !inserted {
            // Only possible if something outside this coordinator shares the store
            warn!(status_id = %message.id, "Reshare record appeared concurrently");
        }

        info!(status_id = %message.id, result = %result, "Handled post");
        Ok(outcome)
    }

    /// Process one batch of notifications, then advance the watermark to the
    /// highest id seen.
    pub async fn poll_batch(&self, notifications: &[Notification]) -> Result<TickSummary> {
        let _batch = self.batch_lock.lock().await;

        let watermark = self.store.watermark().await.context(StoreUnavailable)?;
        let mut max_seen = watermark;
        let mut summary = TickSummary {
            notifications: notifications.len(),
            ..TickSummary::default()
        };

        for notification in notifications {
            if notification.id > max_seen {
                max_seen = notification.id;
            }
            match self.dispatch(notification).await? {
                Some(HandleOutcome::Reshare(ReshareOutcome::Reshared(_))) => {
                    summary.mentions += 1;
                    summary.reshared += 1;
                }
                Some(outcome) if outcome.is_handled() => summary.mentions += 1,
                Some(_) => summary.skipped += 1,
                None => {}
            }
        }

        summary.watermark = self
            .store
            .advance_watermark(max_seen)
            .await
            .context(StoreUnavailable)?;

        debug!(
            previous = %watermark,
            watermark = %summary.watermark,
            count = notifications.len(),
            "Batch complete"
        );

        Ok(summary)
    }

    /// Fetch everything above the watermark and process it as one batch.
    pub async fn tick(&self) -> Result<TickSummary> {
        let watermark = self.store.watermark().await.context(StoreUnavailable)?;
        let notifications = self.platform.fetch_notifications(watermark).await?;
        self.poll_batch(&notifications).await
    }

    /// Entry point for event-driven delivery. Does not touch the watermark.
    pub async fn on_notification(&self, notification: &Notification) -> Result<Option<HandleOutcome>> {
        self.dispatch(notification).await
    }

    /// Handle a notification if it's a mention. `None` for anything else.
    async fn dispatch(&self, notification: &Notification) -> Result<Option<HandleOutcome>> {
        if !notification.is_mention() {
            return Ok(None);
        }
        let Some(message) = &notification.message else {
            warn!(notification_id = %notification.id, "Mention without a status, skipping");
            return Ok(Some(HandleOutcome::MissingStatus));
        };
        match self.handle(message).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) if is_rejected(&e) => {
                warn!(
                    notification_id = %notification.id,
                    status_id = %message.id,
                    error = %format!("{e:#}"),
                    "Server rejected request, skipping mention"
                );
                Ok(Some(HandleOutcome::Rejected))
            }
            Err(e) => Err(e),
        }
    }
}
