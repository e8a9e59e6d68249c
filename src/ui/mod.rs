//! Terminal display: buffers, input line and rendering.

pub mod buffers;
pub mod input;
pub mod mirc_colors;
mod render;
mod terminal;
mod theme;

pub use terminal::TerminalDisplay;

use crate::app::event::UiEvent;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

/// Name of the always present status buffer.
pub const HOME: &str = "home";

#[derive(Debug, Error)]
pub enum UiError {
    #[error("no such buffer: {0}")]
    NoSuchBuffer(String),

    #[error("buffer already exists: {0}")]
    BufferExists(String),

    #[error("the {HOME} buffer cannot be removed")]
    HomeBuffer,

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// One line of a buffer's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub at: DateTime<Local>,
    pub head: String,
    /// mIRC color code of the head.
    pub head_color: u8,
    /// May embed mIRC formatting sequences.
    pub body: String,
    pub mergeable: bool,
    pub highlight: bool,
}

impl Line {
    pub fn new(at: DateTime<Local>, head: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            at,
            head: head.into(),
            head_color: mirc_colors::WHITE,
            body: body.into(),
            mergeable: false,
            highlight: false,
        }
    }

    pub fn with_color(mut self, code: u8) -> Self {
        self.head_color = code;
        self
    }

    pub fn mergeable(mut self) -> Self {
        self.mergeable = true;
        self
    }

    pub fn highlighted(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }
}

/// A candidate input line proposed by completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: Vec<char>,
    pub cursor: usize,
}

/// The terminal side of the client, as seen by the control loop.
#[async_trait]
pub trait Display: Send {
    /// Wait for the next terminal event. `None` once input is gone.
    async fn next_event(&mut self) -> Option<UiEvent>;

    fn add_buffer(&mut self, title: &str) -> Result<(), UiError>;
    fn remove_buffer(&mut self, title: &str) -> Result<(), UiError>;
    fn has_buffer(&self, title: &str) -> bool;

    /// Append a line. `highlight` flags the buffer when it is not current.
    fn add_line(&mut self, buffer: &str, highlight: bool, line: Line) -> Result<(), UiError>;

    /// Insert older lines, in order, before the existing ones.
    fn add_lines(&mut self, buffer: &str, lines: Vec<Line>) -> Result<(), UiError>;

    fn current_buffer(&self) -> String;
    fn next_buffer(&mut self);
    fn previous_buffer(&mut self);

    fn scroll_up(&mut self);
    fn scroll_down(&mut self);
    fn is_at_top(&self) -> bool;
    fn current_buffer_oldest_time(&self) -> Option<DateTime<Local>>;

    fn input_rune(&mut self, c: char);
    fn input_backspace(&mut self) -> bool;
    fn input_delete(&mut self) -> bool;
    fn input_left(&mut self);
    fn input_right(&mut self);
    fn input_home(&mut self);
    fn input_end(&mut self);
    fn input_up(&mut self);
    fn input_down(&mut self);

    /// Complete the input line with candidates from `complete`, which
    /// receives the cursor position and the current text.
    fn input_auto_complete(
        &mut self,
        complete: &mut dyn FnMut(usize, &[char]) -> Vec<Completion>,
    ) -> bool;

    /// Submit and clear the input line.
    fn input_enter(&mut self) -> String;
    fn input_len(&self) -> usize;
    fn input_is_command(&self) -> bool;

    fn exit(&mut self);
    fn should_exit(&self) -> bool;

    /// Force a full repaint on the next draw.
    fn resize(&mut self) -> Result<(), UiError>;
    fn draw(&mut self) -> Result<(), UiError>;
}
