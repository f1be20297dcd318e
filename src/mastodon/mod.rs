// Mastodon API surface: the Platform trait and its HTTP implementation.
//
// The reshare pipeline only talks to the server through `Platform`, so tests
// can swap in a recording fake and the coordinator never sees reqwest.

pub mod client;
pub mod types;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

use types::{Message, Notification, StatusId, Visibility};

/// Marker context for requests the server refused outright (a 4xx other
/// than timeout or rate limiting). Retrying won't help, so the pipeline skips
/// the mention instead of holding the batch. Check with `is_rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteRejected {
    pub status: u16,
}

impl RemoteRejected {
    /// The marker for `status`, if that status means "don't retry".
    pub fn from_status(status: reqwest::StatusCode) -> Option<Self> {
        let retryable = status == reqwest::StatusCode::REQUEST_TIMEOUT
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
        (status.is_client_error() && !retryable).then_some(Self {
            status: status.as_u16(),
        })
    }
}

impl fmt::Display for RemoteRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected by server ({})", self.status)
    }
}

/// Whether an error is a permanent refusal from the server.
pub fn is_rejected(err: &anyhow::Error) -> bool {
    err.downcast_ref::<RemoteRejected>().is_some()
}

/// The four remote operations the bot needs.
///
/// Implementations tag permanent refusals with `RemoteRejected`; anything
/// untagged is treated as transient.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Post `text` addressed to `@target_handle`, in reply to `in_reply_to_id`.
    /// Returns the id of the new status.
    async fn post_reply(
        &self,
        target_handle: &str,
        text: &str,
        in_reply_to_id: StatusId,
        visibility: Visibility,
    ) -> Result<StatusId>;

    /// Reblog a status. Returns the id of the reblog wrapper status.
    async fn reshare_message(&self, id: StatusId) -> Result<StatusId>;

    /// Fetch a single status by id.
    async fn fetch_message(&self, id: StatusId) -> Result<Message>;

    /// Fetch notifications newer than `min_id`, oldest first.
    async fn fetch_notifications(&self, min_id: StatusId) -> Result<Vec<Notification>>;
}
