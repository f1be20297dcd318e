// Mastodon entities: statuses, notifications, and their identifiers.
//
// These types double as the wire format. Field names follow the Mastodon
// REST API so responses deserialize directly; fields the bot never reads
// are simply ignored by serde.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A status or notification identifier.
///
/// Mastodon sends ids as decimal strings. They are parsed to integers so
/// that comparisons are numeric ("10" > "9"), which the notification
/// watermark depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StatusId(pub u64);

impl StatusId {
    /// The lowest possible id, the initial watermark.
    pub const MIN: StatusId = StatusId(0);
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StatusId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(StatusId)
    }
}

impl From<u64> for StatusId {
    fn from(value: u64) -> Self {
        StatusId(value)
    }
}

impl Serialize for StatusId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatusId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept both "123" (what Mastodon sends) and 123 (what some forks do)
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
            RawId::Number(n) => Ok(StatusId(n)),
        }
    }
}

/// Who can see a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
    Direct,
    /// Server-specific scopes such as Pleroma's `local` or `list`.
    #[serde(other)]
    Other,
}

impl Visibility {
    /// Only public and unlisted posts may be reshared.
    pub fn is_reshareable(&self) -> bool {
        matches!(self, Visibility::Public | Visibility::Unlisted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Direct => "direct",
            Visibility::Other => "other",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The author of a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// `user` for local accounts, `user@server` for remote ones.
    pub acct: String,
}

/// A status (toot) as returned by `/api/v1/statuses/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: StatusId,
    /// Raw HTML body.
    pub content: String,
    pub visibility: Visibility,
    pub account: Account,
    #[serde(default)]
    pub in_reply_to_id: Option<StatusId>,
}

impl Message {
    /// The handle to address replies to (without the leading `@`).
    pub fn author_handle(&self) -> &str {
        &self.account.acct
    }
}

/// Notification type. Only mentions carry commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Mention,
    Reblog,
    Favourite,
    Follow,
    #[serde(other)]
    Other,
}

/// An entry from `/api/v1/notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: StatusId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Absent for follows; present for mentions unless the status was deleted.
    #[serde(default, rename = "status")]
    pub message: Option<Message>,
}

impl Notification {
    pub fn is_mention(&self) -> bool {
        self.kind == NotificationKind::Mention
    }
}
