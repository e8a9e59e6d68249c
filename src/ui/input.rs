//! Line editor with history and completion cycling.

use super::Completion;

#[derive(Debug, Default)]
pub struct Editor {
    text: Vec<char>,
    cursor: usize,
    history: Vec<Vec<char>>,
    history_index: Option<usize>,
    completions: Vec<Completion>,
    completion_index: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_command(&self) -> bool {
        self.text.first() == Some(&'/')
    }

    fn edited(&mut self) {
        self.completions.clear();
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += 1;
        self.edited();
    }

    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.text.remove(self.cursor);
        self.edited();
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        self.text.remove(self.cursor);
        self.edited();
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.edited();
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.len());
        self.edited();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
        self.edited();
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
        self.edited();
    }

    /// Take the line, recording it in history when not empty.
    pub fn take_text(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.history_index = None;
        self.edited();
        let line: String = text.iter().collect();
        if !text.is_empty() {
            self.history.push(text);
        }
        line
    }

    fn recall(&mut self, idx: Option<usize>) {
        self.history_index = idx;
        self.text = idx.map(|i| self.history[i].clone()).unwrap_or_default();
        self.cursor = self.text.len();
        self.edited();
    }

    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let idx = match self.history_index {
            Some(i) if i > 0 => i - 1,
            Some(_) => return,
            None => self.history.len() - 1,
        };
        self.recall(Some(idx));
    }

    pub fn history_down(&mut self) {
        match self.history_index {
            Some(i) if i + 1 < self.history.len() => self.recall(Some(i + 1)),
            Some(_) => self.recall(None),
            None => {}
        }
    }

    /// Apply the next completion candidate. The first call asks `complete`
    /// for candidates; later calls without edits in between cycle through
    /// them.
    pub fn auto_complete(
        &mut self,
        complete: &mut dyn FnMut(usize, &[char]) -> Vec<Completion>,
    ) -> bool {
        if self.completions.is_empty() {
            self.completions = complete(self.cursor, &self.text);
            if self.completions.is_empty() {
                return false;
            }
            self.completion_index = 0;
        } else {
            self.completion_index = (self.completion_index + 1) % self.completions.len();
        }
        let chosen = &self.completions[self.completion_index];
        self.text = chosen.text.clone();
        self.cursor = chosen.cursor.min(self.text.len());
        true
    }
}
