//! IRC protocol layer: the session boundary, protocol state tracking and the
//! `irc` crate backed connection.

pub mod connection;
pub mod session;
pub mod state;

pub use connection::{IrcSession, SessionParams};
pub use session::{Member, Session, SessionError, Topic};
