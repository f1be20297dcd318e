// Mastodon REST client: bearer-token authenticated JSON over HTTP.
//
// A thin reqwest wrapper with generic GET/POST helpers, in the same shape
// as the other HTTP clients: build once, check the status code, deserialize
// with a contextual error. Every request is bounded by the client timeout.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::types::{Message, Notification, StatusId, Visibility};
use super::{Platform, RemoteRejected};

/// Page size requested from `/api/v1/notifications` (the server maximum).
pub const NOTIFICATION_PAGE_LIMIT: u32 = 40;

/// Authenticated client for one bot account on one server.
pub struct MastodonClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MastodonClient {
    /// Create a client for `base_url` (e.g. `https://mastodon.social`).
    pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("retootbot/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        debug!(path = path, "Mastodon GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Mastodon request failed: GET {path}"))?;

        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        debug!(path = path, "Mastodon POST request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Mastodon request failed: POST {path}"))?;

        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = anyhow::anyhow!("Mastodon {path} returned {status}: {body}");
            return Err(match RemoteRejected::from_status(status) {
                Some(rejected) => err.context(rejected),
                None => err,
            });
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {path} response"))
    }
}

/// Body for `POST /api/v1/statuses`.
#[derive(Debug, Serialize)]
pub struct NewStatus {
    pub status: String,
    pub in_reply_to_id: String,
    pub visibility: &'static str,
}

impl NewStatus {
    /// Build a reply addressed to `@target_handle`.
    pub fn reply(
        target_handle: &str,
        text: &str,
        in_reply_to_id: StatusId,
        visibility: Visibility,
    ) -> Self {
        Self {
            status: format!("@{} {}", target_handle.trim_start_matches('@'), text),
            in_reply_to_id: in_reply_to_id.to_string(),
            visibility: visibility.as_str(),
        }
    }
}

/// Only the id of a created status is needed.
#[derive(Debug, serde::Deserialize)]
struct CreatedStatus {
    id: StatusId,
}

/// The server returns notifications newest first; the pipeline wants them
/// in ascending id order.
pub fn sort_ascending(mut notifications: Vec<Notification>) -> Vec<Notification> {
    notifications.sort_by_key(|n| n.id);
    notifications
}

#[async_trait]
impl Platform for MastodonClient {
    async fn post_reply(
        &self,
        target_handle: &str,
        text: &str,
        in_reply_to_id: StatusId,
        visibility: Visibility,
    ) -> Result<StatusId> {
        let body = NewStatus::reply(target_handle, text, in_reply_to_id, visibility);
        let created: CreatedStatus = self
            .post_json("/api/v1/statuses", &body)
            .await
            .with_context(|| format!("Failed to reply to @{target_handle}"))?;
        Ok(created.id)
    }

    async fn reshare_message(&self, id: StatusId) -> Result<StatusId> {
        let path = format!("/api/v1/statuses/{id}/reblog");
        let created: CreatedStatus = self
            .post_json(&path, &serde_json::json!({}))
            .await
            .with_context(|| format!("Failed to reblog status {id}"))?;
        Ok(created.id)
    }

    async fn fetch_message(&self, id: StatusId) -> Result<Message> {
        let path = format!("/api/v1/statuses/{id}");
        self.get_json(&path, &[])
            .await
            .with_context(|| format!("Failed to fetch status {id}"))
    }

    async fn fetch_notifications(&self, min_id: StatusId) -> Result<Vec<Notification>> {
        let min_id = min_id.to_string();
        let limit = NOTIFICATION_PAGE_LIMIT.to_string();
        let notifications: Vec<Notification> = self
            .get_json(
                "/api/v1/notifications",
                &[("min_id", min_id.as_str()), ("limit", limit.as_str())],
            )
            .await
            .context("Failed to fetch notifications")?;

        debug!(count = notifications.len(), "Fetched notifications");

        Ok(sort_ascending(notifications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_body_adds_single_at() {
        let vis = Visibility::Unlisted;
        let body = NewStatus::reply("alice@example.org", "hello", StatusId(42), vis);
        assert_eq!(body.status, "@alice@example.org hello");
        assert_eq!(body.in_reply_to_id, "42");
        assert_eq!(body.visibility, "unlisted");

        let body = NewStatus::reply("@bob", "hi", StatusId(1), vis);
        assert_eq!(body.status, "@bob hi");
    }

    #[test]
    fn test_client_errors_are_rejections() {
        use reqwest::StatusCode;

        assert_eq!(
            RemoteRejected::from_status(StatusCode::NOT_FOUND),
            Some(RemoteRejected { status: 404 })
        );
        assert!(RemoteRejected::from_status(StatusCode::FORBIDDEN).is_some());
        assert!(RemoteRejected::from_status(StatusCode::UNPROCESSABLE_ENTITY).is_some());
        assert!(RemoteRejected::from_status(StatusCode::TOO_MANY_REQUESTS).is_none());
        assert!(RemoteRejected::from_status(StatusCode::REQUEST_TIMEOUT).is_none());
        assert!(RemoteRejected::from_status(StatusCode::BAD_GATEWAY).is_none());
    }

    #[test]
    fn test_rejection_survives_outer_context() {
        let err = anyhow::anyhow!("Mastodon /api/v1/statuses/9 returned 404")
            .context(RemoteRejected { status: 404 })
            .context("Failed to fetch status 9");
        assert!(crate::mastodon::is_rejected(&err));
        assert!(!crate::mastodon::is_rejected(&anyhow::anyhow!("connection reset")));
    }

    #[test]
    fn test_new_client_trims_trailing_slash() {
        let client =
            MastodonClient::new("https://example.org/", "token", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "https://example.org");
    }
}
