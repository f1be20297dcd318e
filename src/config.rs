use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::command::Classifier;

pub const DEFAULT_DB_PATH: &str = "./retootbot.db";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DB_BUSY_TIMEOUT_MS: u64 = 5000;

/// Central configuration, loaded once at startup and passed around by reference.
///
/// Comes from environment variables (a .env file is loaded automatically
/// via dotenvy) or from a JSON file given with `--config`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server base URL, e.g. https://mastodon.social
    #[serde(default)]
    pub api_base_url: String,
    /// Bearer token for the bot account.
    #[serde(default)]
    pub access_token: String,
    /// Read the access token from this file when `access_token` is empty.
    #[serde(default)]
    pub access_token_file: Option<PathBuf>,
    /// The bot's account name without the server part (the trigger).
    #[serde(default)]
    pub local_handle: String,
    /// Server parts that may follow the handle in a mention, e.g. "@example.org".
    #[serde(default)]
    pub server_suffixes: Vec<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_db_busy_timeout_ms")]
    pub db_busy_timeout_ms: u64,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_db_busy_timeout_ms() -> u64 {
    DEFAULT_DB_BUSY_TIMEOUT_MS
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only the storage and timing settings have defaults. Server, token and
    /// handle are checked by the `require_*` helpers when a command needs them.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: u64| -> Result<u64> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => v
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a whole number, got {v:?}")),
                _ => Ok(default),
            }
        };

        let mut config = Self {
            api_base_url: lookup("RETOOTBOT_API_BASE_URL").unwrap_or_default(),
            access_token: lookup("RETOOTBOT_ACCESS_TOKEN").unwrap_or_default(),
            access_token_file: lookup("RETOOTBOT_ACCESS_TOKEN_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            local_handle: lookup("RETOOTBOT_LOCAL_HANDLE").unwrap_or_default(),
            server_suffixes: lookup("RETOOTBOT_SERVER_SUFFIXES")
                .map(|v| parse_suffix_list(&v))
                .unwrap_or_default(),
            poll_interval_secs: number("RETOOTBOT_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?,
            db_path: lookup("RETOOTBOT_DB_PATH").unwrap_or_else(default_db_path),
            http_timeout_secs: number("RETOOTBOT_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            db_busy_timeout_ms: number("RETOOTBOT_DB_BUSY_TIMEOUT_MS", DEFAULT_DB_BUSY_TIMEOUT_MS)?,
        };
        config.resolve_token_file()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.resolve_token_file()?;
        Ok(config)
    }

    /// Fill `access_token` from `access_token_file` if it isn't set directly.
    fn resolve_token_file(&mut self) -> Result<()> {
        if !self.access_token.is_empty() {
            return Ok(());
        }
        if let Some(ref path) = self.access_token_file {
            let token = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read access token from {}", path.display()))?;
            self.access_token = token.trim().to_string();
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn db_busy_timeout(&self) -> Duration {
        Duration::from_millis(self.db_busy_timeout_ms)
    }

    /// The command classifier for this bot's handle.
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.local_handle.clone(), self.server_suffixes.clone())
    }

    /// Check that the trigger handle is configured.
    /// Call this before anything that classifies mentions.
    pub fn require_handle(&self) -> Result<()> {
        if self.local_handle.trim().is_empty() {
            anyhow::bail!(
                "RETOOTBOT_LOCAL_HANDLE not set. Add the bot's account name \
                 (without @server) to your .env file."
            );
        }
        Ok(())
    }

    /// Check that the server URL and access token are configured.
    /// Call this before any operation that talks to the server.
    pub fn require_server(&self) -> Result<()> {
        self.require_handle()?;
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!(
                "RETOOTBOT_API_BASE_URL not set. Add your server's URL \
                 (e.g. https://mastodon.social) to your .env file."
            );
        }
        if self.access_token.is_empty() {
            anyhow::bail!(
                "No access token configured. Set RETOOTBOT_ACCESS_TOKEN, or point \
                 RETOOTBOT_ACCESS_TOKEN_FILE at a file containing it."
            );
        }
        Ok(())
    }
}

/// Split a comma-separated suffix list, dropping empty entries.
fn parse_suffix_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
