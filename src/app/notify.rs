//! Highlight notifications through a user supplied shell command.

use crate::ui::mirc_colors::strip_formatting;
use std::io;
use std::process::{Command as ProcessCommand, ExitStatus, Stdio};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{0}")]
    Spawn(io::Error),

    #[error("{0}")]
    Status(ExitStatus),
}

/// A message that deserves the user's attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub buffer: String,
    /// Whether `buffer` is the one on screen.
    pub here: bool,
    pub nick: String,
    /// Raw content, formatting codes included.
    pub content: String,
}

pub trait Notifier: Send {
    fn notify(&mut self, highlight: &Highlight) -> Result<(), NotifyError>;
}

/// Substitute `%b`, `%h`, `%n`, `%m` and `%%` in `template`. Other `%`
/// sequences are kept as written.
pub fn expand_template(template: &str, highlight: &Highlight) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => out.push('%'),
            Some('b') => out.push_str(&highlight.buffer),
            Some('h') => out.push(if highlight.here { '1' } else { '0' }),
            Some('n') => out.push_str(&highlight.nick),
            Some('m') => out.push_str(&strip_formatting(&highlight.content)),
            _ => {
                out.push('%');
                continue;
            }
        }
        chars.next();
    }
    out
}

/// Runs the configured template through `sh -c`, waiting for it to exit.
pub struct ShellNotifier {
    template: String,
}

impl ShellNotifier {
    pub fn new(template: Option<String>) -> Self {
        Self {
            template: template.unwrap_or_default(),
        }
    }
}

impl Notifier for ShellNotifier {
    fn notify(&mut self, highlight: &Highlight) -> Result<(), NotifyError> {
        if self.template.is_empty() {
            return Ok(());
        }
        let command = expand_template(&self.template, highlight);
        debug!(buffer = %highlight.buffer, "running highlight command");
        let status = ProcessCommand::new("sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(NotifyError::Status(status)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no shell available for highlight command");
                Ok(())
            }
            Err(e) => Err(NotifyError::Spawn(e)),
        }
    }
}
