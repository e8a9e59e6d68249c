//! Buffer registry.
//!
//! Buffers are kept in creation order with [`HOME`] first. Titles compare
//! ASCII case-insensitively so `#Rust` and `#rust` name the same buffer.

use super::{Line, UiError, HOME};
use chrono::{DateTime, Local};

#[derive(Debug)]
pub struct Buffer {
    pub title: String,
    pub lines: Vec<Line>,
    /// Number of lines hidden below the view.
    pub scroll: usize,
    pub unread: bool,
    pub highlight: bool,
}

impl Buffer {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: Vec::new(),
            scroll: 0,
            unread: false,
            highlight: false,
        }
    }

    fn push(&mut self, line: Line) {
        if line.mergeable {
            if let Some(last) = self.lines.last_mut().filter(|l| l.mergeable) {
                last.body.push_str("  ");
                last.body.push_str(&line.body);
                last.at = line.at;
                return;
            }
        }
        self.lines.push(line);
        if self.scroll > 0 {
            self.scroll += 1;
        }
    }
}

#[derive(Debug)]
pub struct BufferList {
    buffers: Vec<Buffer>,
    current: usize,
}

impl Default for BufferList {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferList {
    pub fn new() -> Self {
        Self {
            buffers: vec![Buffer::new(HOME)],
            current: 0,
        }
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.buffers
            .iter()
            .position(|b| b.title.eq_ignore_ascii_case(title))
    }

    fn get_mut(&mut self, title: &str) -> Result<&mut Buffer, UiError> {
        let idx = self
            .position(title)
            .ok_or_else(|| UiError::NoSuchBuffer(title.to_string()))?;
        Ok(&mut self.buffers[idx])
    }

    pub fn contains(&self, title: &str) -> bool {
        self.position(title).is_some()
    }

    pub fn add(&mut self, title: &str) -> Result<(), UiError> {
        if self.contains(title) {
            return Err(UiError::BufferExists(title.to_string()));
        }
        self.buffers.push(Buffer::new(title));
        Ok(())
    }

    /// Removing the current buffer selects the one before it.
    pub fn remove(&mut self, title: &str) -> Result<(), UiError> {
        let idx = self
            .position(title)
            .ok_or_else(|| UiError::NoSuchBuffer(title.to_string()))?;
        if idx == 0 {
            return Err(UiError::HomeBuffer);
        }
        self.buffers.remove(idx);
        if idx <= self.current {
            self.current -= 1;
        }
        Ok(())
    }

    pub fn add_line(&mut self, title: &str, highlight: bool, line: Line) -> Result<(), UiError> {
        let is_current = self.position(title) == Some(self.current);
        let buffer = self.get_mut(title)?;
        buffer.push(line);
        if !is_current {
            buffer.unread = true;
            buffer.highlight |= highlight;
        }
        Ok(())
    }

    pub fn add_lines(&mut self, title: &str, lines: Vec<Line>) -> Result<(), UiError> {
        let buffer = self.get_mut(title)?;
        buffer.lines.splice(0..0, lines);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buffer> {
        self.buffers.iter()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Buffer {
        &self.buffers[self.current]
    }

    pub fn current_title(&self) -> &str {
        &self.current().title
    }

    fn select(&mut self, idx: usize) {
        self.current = idx;
        let buffer = &mut self.buffers[idx];
        buffer.unread = false;
        buffer.highlight = false;
    }

    pub fn next(&mut self) {
        self.select((self.current + 1) % self.buffers.len());
    }

    pub fn previous(&mut self) {
        let len = self.buffers.len();
        self.select((self.current + len - 1) % len);
    }

    fn max_scroll(&self, height: usize) -> usize {
        self.current().lines.len().saturating_sub(height)
    }

    pub fn scroll_up(&mut self, step: usize, height: usize) {
        let max = self.max_scroll(height);
        let buffer = &mut self.buffers[self.current];
        buffer.scroll = (buffer.scroll + step).min(max);
    }

    pub fn scroll_down(&mut self, step: usize) {
        let buffer = &mut self.buffers[self.current];
        buffer.scroll = buffer.scroll.saturating_sub(step);
    }

    pub fn is_at_top(&self, height: usize) -> bool {
        self.current().scroll >= self.max_scroll(height)
    }

    pub fn oldest_time(&self) -> Option<DateTime<Local>> {
        self.current().lines.first().map(|l| l.at)
    }
}
