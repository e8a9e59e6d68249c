//! Event translation: protocol events become timeline lines and buffer
//! changes, terminal events become editor and navigation actions.

use crate::app::completion::complete_nick;
use crate::app::event::{SessionEvent, UiEvent};
use crate::app::{App, AppError};
use crate::ui::{mirc_colors, Line, HOME};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, error, info, warn};

fn nick_change_body(former: &str, current: &str) -> String {
    format!("\x0314{}\x03\u{2192}\x0314{}\x03", former, current)
}

impl App {
    pub(crate) fn handle_session_event(&mut self, ev: SessionEvent) -> Result<(), AppError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Ok(());
        };

        match ev {
            SessionEvent::Registered => {
                let nick = session.nick().to_string();
                info!(nick = %nick, "registered");
                let mut body = "Connected to the server".to_string();
                if nick != self.state.requested_nick {
                    body.push_str(" as ");
                    body.push_str(&nick);
                }
                self.add_line(HOME, false, Line::new(Local::now(), "--", body));
            }
            SessionEvent::SelfNick { former_nick, at } => {
                let body = nick_change_body(&former_nick, session.nick());
                let current = self.display.current_buffer();
                self.add_line(&current, true, Line::new(at, "--", body).highlighted(true));
            }
            SessionEvent::UserNick {
                user,
                former_nick,
                at,
            } => {
                let body = nick_change_body(&former_nick, &user);
                for channel in session.channels_shared_with(&user) {
                    self.add_line(&channel, false, Line::new(at, "--", body.clone()).mergeable());
                }
            }
            SessionEvent::SelfJoin { channel } => {
                info!(channel = %channel, "joined");
                if let Err(e) = self.display.add_buffer(&channel) {
                    debug!(channel = %channel, error = %e, "buffer not added");
                }
                if let Err(e) = session.request_history(&channel, Local::now()) {
                    warn!(channel = %channel, error = %e, "history request failed");
                }
            }
            SessionEvent::UserJoin { user, channel, at } => {
                let body = format!("\x033+\x0314{}\x03", user);
                self.add_line(&channel, false, Line::new(at, "--", body).mergeable());
            }
            SessionEvent::SelfPart { channel } => {
                info!(channel = %channel, "parted");
                if let Err(e) = self.display.remove_buffer(&channel) {
                    debug!(channel = %channel, error = %e, "buffer not removed");
                }
            }
            SessionEvent::UserPart { user, channel, at } => {
                let body = format!("\x034-\x0314{}\x03", user);
                self.add_line(&channel, false, Line::new(at, "--", body).mergeable());
            }
            SessionEvent::UserQuit { user, channels, at } => {
                let body = format!("\x034-\x0314{}\x03", user);
                for channel in channels {
                    self.add_line(&channel, false, Line::new(at, "--", body.clone()).mergeable());
                }
            }
            SessionEvent::TopicChange { channel, topic, at } => {
                let body = format!("\x0314Topic changed to: {}\x03", topic);
                self.add_line(&channel, false, Line::new(at, "--", body));
            }
            SessionEvent::Message(msg) => {
                let from_self = session.nick_cf() == session.casemap(&msg.user);
                if !msg.target_is_channel && !from_self {
                    self.state.last_query = Some(msg.user.clone());
                }
                if let Some(formatted) = self.format_message(&msg) {
                    self.add_line(&formatted.buffer, formatted.notify, formatted.line);
                    if formatted.notify {
                        self.notify_highlight(&formatted.buffer, &msg.user, &msg.content);
                    }
                }
            }
            SessionEvent::History { target, messages } => {
                let lines: Vec<Line> = messages
                    .iter()
                    .filter_map(|m| self.format_message(m))
                    .map(|f| f.line)
                    .collect();
                if let Err(e) = self.display.add_lines(&target, lines) {
                    debug!(target = %target, error = %e, "history dropped");
                }
            }
            SessionEvent::Raw { direction, line } => {
                self.add_line(HOME, false, Line::new(Local::now(), direction.head(), line));
            }
            SessionEvent::Error(e) => {
                error!(error = %e, "session failed");
                return Err(e.into());
            }
        }
        Ok(())
    }

    pub(crate) fn handle_ui_event(&mut self, ev: UiEvent) -> Result<(), AppError> {
        match ev {
            UiEvent::Resize => self.display.resize()?,
            UiEvent::Paste(start) => self.state.pasting = start,
            UiEvent::Key(key) => {
                if !self.handle_key(key)? {
                    return Ok(());
                }
            }
        }
        if !self.state.pasting {
            self.draw()?;
        }
        Ok(())
    }

    /// Returns whether the key was bound to anything.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool, AppError> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if ctrl => self.display.exit(),
            KeyCode::Char('l') if ctrl => self.display.resize()?,
            KeyCode::Char('u') if ctrl => self.scroll_up(),
            KeyCode::PageUp => self.scroll_up(),
            KeyCode::Char('d') if ctrl => self.display.scroll_down(),
            KeyCode::PageDown => self.display.scroll_down(),
            KeyCode::Char('n') if ctrl => self.display.next_buffer(),
            KeyCode::Char('p') if ctrl => self.display.previous_buffer(),
            KeyCode::Right if alt => self.display.next_buffer(),
            KeyCode::Left if alt => self.display.previous_buffer(),
            KeyCode::Right => self.display.input_right(),
            KeyCode::Left => self.display.input_left(),
            KeyCode::Up => self.display.input_up(),
            KeyCode::Down => self.display.input_down(),
            KeyCode::Home => self.display.input_home(),
            KeyCode::End => self.display.input_end(),
            KeyCode::Backspace => {
                if self.display.input_backspace() {
                    self.typing();
                }
            }
            KeyCode::Delete => {
                if self.display.input_delete() {
                    self.typing();
                }
            }
            KeyCode::Tab => {
                let buffer = self.display.current_buffer();
                let session = self.session.as_deref();
                let completed = self.display.input_auto_complete(
                    &mut |cursor: usize, text: &[char]| complete_nick(session, &buffer, cursor, text),
                );
                if completed {
                    self.typing();
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) if !ctrl => {
                self.display.input_rune(c);
                self.typing();
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn scroll_up(&mut self) {
        self.display.scroll_up();
        let Some(session) = self.session.as_deref_mut() else {
            return;
        };
        let buffer = self.display.current_buffer();
        if buffer != HOME && self.display.is_at_top() {
            let before = self
                .display
                .current_buffer_oldest_time()
                .unwrap_or_else(Local::now);
            if let Err(e) = session.request_history(&buffer, before) {
                warn!(buffer = %buffer, error = %e, "history request failed");
            }
        }
    }

    fn submit(&mut self) {
        let buffer = self.display.current_buffer();
        let input = self.display.input_enter();
        if let Err(e) = self.handle_input(&buffer, &input) {
            debug!(input = %input, error = %e, "command rejected");
            let current = self.display.current_buffer();
            let line = Line::new(Local::now(), "!!", format!("{:?}: {}", input, e))
                .with_color(mirc_colors::RED);
            self.add_line(&current, false, line);
        }
    }
}
