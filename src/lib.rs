// retootbot: reshare Mastodon posts on command.
//
// This is the library root. Each module corresponds to one part of the bot:
// recognizing commands, talking to the server, remembering what was done,
// and the pipelines that tie them together.

pub mod command;
pub mod config;
pub mod db;
pub mod mastodon;
pub mod pipeline;
pub mod status;
