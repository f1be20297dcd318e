// Event-driven driver: feed notifications from any stream into the
// coordinator as they arrive.
//
// The transport (websocket, server-sent events, a test channel) is up to
// the caller. Events go through the same `handle`/`reshare` path as polling,
// so a post seen by both drivers is still reshared once.

use anyhow::Result;
use futures::{Stream, StreamExt};
use tracing::{info, warn};

use super::reshare::{is_store_failure, ReshareCoordinator};
use crate::mastodon::types::Notification;

/// Consume `events` until it ends. Returns how many mentions were handled.
pub async fn run<S>(coordinator: &ReshareCoordinator, events: S) -> Result<usize>
where
    S: Stream<Item = Notification>,
{
    futures::pin_mut!(events);
    let mut handled = 0;

    while let Some(notification) = events.next().await {
        match coordinator.on_notification(&notification).await {
            Ok(Some(outcome)) if outcome.is_handled() => handled += 1,
            Ok(_) => {}
            Err(e) if is_store_failure(&e) => return Err(e),
            Err(e) => {
                // Polling will pick this one up again from the watermark
                warn!(
                    notification_id = %notification.id,
                    error = %format!("{e:#}"),
                    "Failed to handle streamed notification"
                );
            }
        }
    }

    info!(handled, "Notification stream ended");
    Ok(handled)
}
