//! Application core: the control loop tying a [`Session`] to a [`Display`].

pub mod color;
pub mod commands;
pub mod completion;
pub mod event;
pub mod format;
pub mod handler;
pub mod notify;
pub mod state;
#[cfg(test)]
pub mod testing;

use crate::app::commands::{CommandError, CommandRegistry};
use crate::app::event::{MessageEvent, SessionEvent, UiEvent};
use crate::app::format::{Formatted, Formatter};
use crate::app::notify::{Highlight, Notifier};
use crate::app::state::AppState;
use crate::config::AppConfig;
use crate::irc::{IrcSession, Session, SessionError, SessionParams};
use crate::ui::{mirc_colors, Display, Line, UiError, HOME};
use chrono::Local;
use thiserror::Error;
use tracing::{error, info, warn};

/// Events drained without waiting after the one that woke the loop.
const MAX_BATCH: usize = 64;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Ui(#[from] UiError),
}

enum Wake {
    Session(Option<SessionEvent>),
    Ui(Option<UiEvent>),
}

pub struct App {
    session: Option<Box<dyn Session>>,
    display: Box<dyn Display>,
    notifier: Box<dyn Notifier>,
    commands: CommandRegistry,
    state: AppState,
}

impl App {
    pub fn new(config: &AppConfig, display: Box<dyn Display>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            session: None,
            display,
            notifier,
            commands: CommandRegistry::new(),
            state: AppState::new(config),
        }
    }

    pub fn with_session(mut self, session: Box<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Open the session described by `config`. Failure is reported in the
    /// home buffer and leaves the client running without a session.
    pub async fn connect(&mut self, config: &AppConfig) -> Result<(), AppError> {
        self.add_line(
            HOME,
            false,
            Line::new(Local::now(), "--", format!("Connecting to {}...", config.addr)),
        );
        self.draw()?;

        let session = match session_params(config) {
            Ok(params) => IrcSession::connect(params).await,
            Err(e) => Err(e),
        };
        match session {
            Ok(session) => {
                info!(addr = %config.addr, "connected");
                self.session = Some(Box::new(session));
            }
            Err(e) => {
                error!(addr = %config.addr, error = %e, "connection failed");
                self.add_line(
                    HOME,
                    false,
                    Line::new(Local::now(), "!!", "Connection failed").with_color(mirc_colors::RED),
                );
            }
        }
        self.draw()
    }

    /// Run until the user quits. A session failure ends the loop with an error.
    pub async fn run(&mut self) -> Result<(), AppError> {
        self.draw()?;
        while !self.display.should_exit() {
            self.step().await?;
        }
        Ok(())
    }

    /// Wait for one wake-up and handle it.
    pub async fn step(&mut self) -> Result<(), AppError> {
        let wake = match self.session.as_mut() {
            Some(session) => tokio::select! {
                ev = session.next_event() => Wake::Session(ev),
                ev = self.display.next_event() => Wake::Ui(ev),
            },
            None => Wake::Ui(self.display.next_event().await),
        };

        match wake {
            Wake::Session(Some(first)) => {
                let mut events = vec![first];
                if let Some(session) = self.session.as_mut() {
                    while events.len() <= MAX_BATCH {
                        match session.try_next_event() {
                            Some(ev) => events.push(ev),
                            None => break,
                        }
                    }
                }
                for ev in events {
                    self.handle_session_event(ev)?;
                }
                if !self.state.pasting {
                    self.draw()?;
                }
            }
            Wake::Session(None) => {
                error!("session stream closed");
                return Err(SessionError::Closed.into());
            }
            Wake::Ui(Some(ev)) => self.handle_ui_event(ev)?,
            Wake::Ui(None) => self.display.exit(),
        }
        Ok(())
    }

    /// Leave the network, if connected.
    pub fn close(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
    }

    fn draw(&mut self) -> Result<(), AppError> {
        self.display.draw()?;
        Ok(())
    }

    /// Add a line to `buffer`, or to home when `buffer` does not exist.
    fn add_line(&mut self, buffer: &str, highlight: bool, line: Line) {
        let target = if self.display.has_buffer(buffer) {
            buffer
        } else {
            HOME
        };
        if let Err(e) = self.display.add_line(target, highlight, line) {
            warn!(buffer = %target, error = %e, "line dropped");
        }
    }

    fn format_message(&self, ev: &MessageEvent) -> Option<Formatted> {
        let session = self.session.as_deref()?;
        let current = self.display.current_buffer();
        let formatter = Formatter {
            session,
            highlights: &self.state.highlights,
            current_buffer: &current,
        };
        Some(formatter.format(ev))
    }

    fn notify_highlight(&mut self, buffer: &str, nick: &str, content: &str) {
        let highlight = Highlight {
            buffer: buffer.to_string(),
            here: buffer == self.display.current_buffer(),
            nick: nick.to_string(),
            content: content.to_string(),
        };
        if let Err(e) = self.notifier.notify(&highlight) {
            warn!(buffer = %buffer, error = %e, "highlight command failed");
            self.add_line(
                HOME,
                false,
                Line::new(
                    Local::now(),
                    "ERROR --",
                    format!("Failed to invoke on-highlight command: {}", e),
                )
                .with_color(mirc_colors::RED),
            );
        }
    }

    fn handle_input(&mut self, buffer: &str, input: &str) -> Result<(), CommandError> {
        let (cmd, args) = commands::prepare(&self.commands, buffer, input)?;
        (cmd.handle)(self, buffer, args)
    }

    /// Tell the current channel whether we are composing a message.
    fn typing(&mut self) {
        let Some(session) = self.session.as_deref_mut() else {
            return;
        };
        let buffer = self.display.current_buffer();
        if buffer == HOME {
            return;
        }
        if self.display.input_len() == 0 {
            session.typing_stop(&buffer);
        } else if !self.display.input_is_command() {
            session.typing(&buffer);
        }
    }
}

fn session_params(config: &AppConfig) -> Result<SessionParams, SessionError> {
    let (host, port) = config.host_port().map_err(SessionError::Address)?;
    Ok(SessionParams {
        host,
        port,
        tls: config.tls,
        nickname: config.nick.clone(),
        username: config.username().to_string(),
        realname: config.realname().to_string(),
        password: config.password.clone(),
        debug: config.debug,
    })
}
