// Shared fixtures: a recording fake Platform and message builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use retootbot::mastodon::types::{
    Account, Message, Notification, NotificationKind, StatusId, Visibility,
};
use retootbot::mastodon::{Platform, RemoteRejected};

/// A remote call the fake saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Reply {
        target: String,
        text: String,
        in_reply_to: StatusId,
        visibility: Visibility,
    },
    Reshare(StatusId),
    Fetch(StatusId),
    Notifications(StatusId),
}

#[derive(Default)]
pub struct FakePlatform {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    statuses: Mutex<HashMap<StatusId, Message>>,
    inbox: Mutex<Vec<Notification>>,
    fail_reshares: AtomicBool,
    reject_reshares: AtomicBool,
    reshare_delay: Mutex<Option<Duration>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(9000),
            ..Self::default()
        }
    }

    /// Make `fetch_message` able to return this status.
    pub fn add_status(&self, message: Message) {
        self.statuses.lock().unwrap().insert(message.id, message);
    }

    /// Queue notifications for `fetch_notifications`.
    pub fn push_notifications(&self, notifications: Vec<Notification>) {
        self.inbox.lock().unwrap().extend(notifications);
    }

    pub fn fail_reshares(&self, fail: bool) {
        self.fail_reshares.store(fail, Ordering::SeqCst);
    }

    /// Answer reblogs with 403, as for a post whose author blocks the bot.
    pub fn reject_reshares(&self, reject: bool) {
        self.reject_reshares.store(reject, Ordering::SeqCst);
    }

    pub fn set_reshare_delay(&self, delay: Duration) {
        *self.reshare_delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reshare_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Reshare(_)))
            .count()
    }

    pub fn reply_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Reply { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn post_reply(
        &self,
        target_handle: &str,
        text: &str,
        in_reply_to_id: StatusId,
        visibility: Visibility,
    ) -> Result<StatusId> {
        self.record(Call::Reply {
            target: target_handle.to_string(),
            text: text.to_string(),
            in_reply_to: in_reply_to_id,
            visibility,
        });
        Ok(StatusId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn reshare_message(&self, id: StatusId) -> Result<StatusId> {
        let delay = *self.reshare_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reshares.load(Ordering::SeqCst) {
            anyhow::bail!("simulated network failure");
        }
        if self.reject_reshares.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("reblog of {id} forbidden").context(RemoteRejected { status: 403 }));
        }
        self.record(Call::Reshare(id));
        Ok(StatusId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn fetch_message(&self, id: StatusId) -> Result<Message> {
        self.record(Call::Fetch(id));
        self.statuses
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!("status {id} not found").context(RemoteRejected { status: 404 })
            })
    }

    async fn fetch_notifications(&self, min_id: StatusId) -> Result<Vec<Notification>> {
        self.record(Call::Notifications(min_id));
        let mut inbox = self.inbox.lock().unwrap();
        let mut batch: Vec<Notification> = inbox.iter().filter(|n| n.id > min_id).cloned().collect();
        batch.sort_by_key(|n| n.id);
        inbox.clear();
        Ok(batch)
    }
}

pub fn message(id: u64, content: &str, visibility: Visibility) -> Message {
    Message {
        id: StatusId(id),
        content: content.to_string(),
        visibility,
        account: Account {
            acct: "alice@elsewhere.example".to_string(),
        },
        in_reply_to_id: None,
    }
}

pub fn reply(id: u64, content: &str, parent: u64) -> Message {
    Message {
        in_reply_to_id: Some(StatusId(parent)),
        ..message(id, content, Visibility::Public)
    }
}

pub fn mention(id: u64, message: Message) -> Notification {
    Notification {
        id: StatusId(id),
        kind: NotificationKind::Mention,
        message: Some(message),
    }
}

pub fn follow(id: u64) -> Notification {
    Notification {
        id: StatusId(id),
        kind: NotificationKind::Follow,
        message: None,
    }
}
