//! Events consumed by the control loop.
//!
//! Protocol events come from the [`Session`](crate::irc::Session), terminal
//! events from the [`Display`](crate::ui::Display). Both are closed sum types
//! so the translator has to handle every variant explicitly.

use crate::irc::SessionError;
use chrono::{DateTime, Local};
use crossterm::event::KeyEvent;

/// Protocol verb of a [`MessageEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Privmsg,
    Notice,
}

/// One PRIVMSG or NOTICE, live or replayed from history.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub user: String,
    pub target: String,
    pub target_is_channel: bool,
    pub verb: Verb,
    pub content: String,
    pub at: DateTime<Local>,
}

/// Direction tag of a traced protocol line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDirection {
    Incoming,
    Outgoing,
    Malformed,
}

impl RawDirection {
    pub fn head(self) -> &'static str {
        match self {
            RawDirection::Incoming => "IN --",
            RawDirection::Outgoing => "OUT --",
            RawDirection::Malformed => "IN ??",
        }
    }
}

#[derive(Debug)]
pub enum SessionEvent {
    /// Registration finished; the session nick may differ from the requested one.
    Registered,
    SelfNick {
        former_nick: String,
        at: DateTime<Local>,
    },
    UserNick {
        user: String,
        former_nick: String,
        at: DateTime<Local>,
    },
    SelfJoin {
        channel: String,
    },
    UserJoin {
        user: String,
        channel: String,
        at: DateTime<Local>,
    },
    SelfPart {
        channel: String,
    },
    UserPart {
        user: String,
        channel: String,
        at: DateTime<Local>,
    },
    UserQuit {
        user: String,
        channels: Vec<String>,
        at: DateTime<Local>,
    },
    TopicChange {
        channel: String,
        topic: String,
        at: DateTime<Local>,
    },
    Message(MessageEvent),
    History {
        target: String,
        messages: Vec<MessageEvent>,
    },
    Raw {
        direction: RawDirection,
        line: String,
    },
    /// Unrecoverable failure below the translator.
    Error(SessionError),
}

/// Terminal-side events delivered by the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Resize,
    /// `true` when a bracketed paste starts, `false` when it ends.
    Paste(bool),
    Key(KeyEvent),
}
