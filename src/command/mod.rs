// Command recognition: turn a mention's HTML body into a bot command.
//
// Pure functions only: no I/O, no configuration lookups. The trigger handle
// and accepted server suffixes come in through `Classifier`, which is built
// once from the loaded config.

pub mod classify;
pub mod normalize;

use std::fmt;

pub use classify::classify;

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reshare the message carrying the command.
    Retoot,
    /// Reshare the message the command replied to.
    ShareParent,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Retoot => "retoot",
            Command::ShareParent => "share-parent",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The bot's trigger handle plus the server parts that may follow it.
#[derive(Debug, Clone)]
pub struct Classifier {
    trigger_name: String,
    server_suffixes: Vec<String>,
}

impl Classifier {
    pub fn new(trigger_name: impl Into<String>, server_suffixes: Vec<String>) -> Self {
        Self {
            trigger_name: trigger_name.into(),
            server_suffixes,
        }
    }

    pub fn trigger_name(&self) -> &str {
        &self.trigger_name
    }

    pub fn classify(&self, content: &str) -> Option<Command> {
        classify(content, &self.trigger_name, &self.server_suffixes)
    }
}
