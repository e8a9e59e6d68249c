use crate::app::event::SessionEvent;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection error: {0}")]
    Irc(#[from] irc::error::Error),

    #[error("server closed the link: {0}")]
    Server(String),

    #[error("connection closed")]
    Closed,

    #[error("invalid raw message: {0}")]
    InvalidRaw(String),

    #[error("invalid server address: {0}")]
    Address(String),
}

/// A channel member as listed by NAMES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Membership prefixes such as `@` or `+`, empty for regular members.
    pub power_level: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Topic {
    pub text: String,
    pub who: Option<String>,
    pub at: Option<DateTime<Local>>,
}

/// The protocol side of the client.
///
/// A session delivers [`SessionEvent`]s and accepts outbound commands. Outbound
/// operations are fire-and-forget: the only errors surfaced are local send
/// failures.
#[async_trait]
pub trait Session: Send {
    /// Wait for the next protocol event. `None` once the stream is closed.
    async fn next_event(&mut self) -> Option<SessionEvent>;

    /// Return an already available event without waiting.
    fn try_next_event(&mut self) -> Option<SessionEvent>;

    fn privmsg(&mut self, target: &str, content: &str) -> Result<(), SessionError>;

    /// `channels` may carry a space separated key list after the channel list.
    fn join(&mut self, channels: &str) -> Result<(), SessionError>;

    fn part(&mut self, channel: &str, reason: &str) -> Result<(), SessionError>;

    fn typing(&mut self, target: &str);

    fn typing_stop(&mut self, target: &str);

    fn topic(&self, channel: &str) -> Topic;

    fn set_topic(&mut self, channel: &str, topic: &str) -> Result<(), SessionError>;

    fn send_raw(&mut self, line: &str) -> Result<(), SessionError>;

    /// Ask for messages of `target` sent before `before`.
    fn request_history(&mut self, target: &str, before: DateTime<Local>) -> Result<(), SessionError>;

    fn names(&self, target: &str) -> Vec<Member>;

    fn casemap(&self, name: &str) -> String;

    fn nick(&self) -> &str;

    fn nick_cf(&self) -> &str;

    fn has_capability(&self, capability: &str) -> bool;

    fn is_channel(&self, name: &str) -> bool;

    fn channels_shared_with(&self, user: &str) -> Vec<String>;

    /// Leave the network. The session is unusable afterwards.
    fn stop(&mut self);
}
