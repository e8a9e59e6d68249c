use crate::app::event::UiEvent;
use crate::ui::buffers::BufferList;
use crate::ui::input::Editor;
use crate::ui::render::{self, Widths};
use crate::ui::{Completion, Display, Line, UiError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use tokio::sync::mpsc;
use tracing::warn;

pub type Term = Terminal<CrosstermBackend<Stdout>>;

/// Split a terminal event into the events the control loop understands.
/// A paste becomes a bracketed run of key presses.
pub fn translate(event: Event) -> Vec<UiEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => vec![UiEvent::Key(key)],
        Event::Resize(_, _) => vec![UiEvent::Resize],
        Event::Paste(text) => {
            let mut events = vec![UiEvent::Paste(true)];
            for c in text.chars() {
                let code = match c {
                    '\r' => continue,
                    '\n' => KeyCode::Enter,
                    c => KeyCode::Char(c),
                };
                events.push(UiEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
            }
            events.push(UiEvent::Paste(false));
            events
        }
        _ => Vec::new(),
    }
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<UiEvent>) {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(item) = reader.next().await {
            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "terminal input failed");
                    break;
                }
            };
            for ui_event in translate(event) {
                if tx.send(ui_event).is_err() {
                    return;
                }
            }
        }
    });
}

/// A [`Display`] drawing to the terminal with ratatui.
pub struct TerminalDisplay {
    terminal: Term,
    events: mpsc::UnboundedReceiver<UiEvent>,
    buffers: BufferList,
    editor: Editor,
    widths: Widths,
    exit: bool,
}

impl TerminalDisplay {
    /// Must be called from within the runtime: it spawns the input reader.
    pub fn new(terminal: Term, nick_column_width: usize, chan_column_width: usize) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        spawn_input_reader(tx);
        Self {
            terminal,
            events,
            buffers: BufferList::new(),
            editor: Editor::new(),
            widths: Widths {
                nick_column: nick_column_width,
                chan_column: chan_column_width,
            },
            exit: false,
        }
    }

    fn page(&self) -> usize {
        self.terminal
            .size()
            .map(|s| render::message_rows(s.height))
            .unwrap_or(1)
    }
}

#[async_trait]
impl Display for TerminalDisplay {
    async fn next_event(&mut self) -> Option<UiEvent> {
        self.events.recv().await
    }

    fn add_buffer(&mut self, title: &str) -> Result<(), UiError> {
        self.buffers.add(title)
    }

    fn remove_buffer(&mut self, title: &str) -> Result<(), UiError> {
        self.buffers.remove(title)
    }

    fn has_buffer(&self, title: &str) -> bool {
        self.buffers.contains(title)
    }

    fn add_line(&mut self, buffer: &str, highlight: bool, line: Line) -> Result<(), UiError> {
        self.buffers.add_line(buffer, highlight, line)
    }

    fn add_lines(&mut self, buffer: &str, lines: Vec<Line>) -> Result<(), UiError> {
        self.buffers.add_lines(buffer, lines)
    }

    fn current_buffer(&self) -> String {
        self.buffers.current_title().to_string()
    }

    fn next_buffer(&mut self) {
        self.buffers.next();
    }

    fn previous_buffer(&mut self) {
        self.buffers.previous();
    }

    fn scroll_up(&mut self) {
        let page = self.page();
        self.buffers.scroll_up(page / 2 + 1, page);
    }

    fn scroll_down(&mut self) {
        let page = self.page();
        self.buffers.scroll_down(page / 2 + 1);
    }

    fn is_at_top(&self) -> bool {
        self.buffers.is_at_top(self.page())
    }

    fn current_buffer_oldest_time(&self) -> Option<DateTime<Local>> {
        self.buffers.oldest_time()
    }

    fn input_rune(&mut self, c: char) {
        self.editor.insert_char(c);
    }

    fn input_backspace(&mut self) -> bool {
        self.editor.delete_back()
    }

    fn input_delete(&mut self) -> bool {
        self.editor.delete_forward()
    }

    fn input_left(&mut self) {
        self.editor.move_left();
    }

    fn input_right(&mut self) {
        self.editor.move_right();
    }

    fn input_home(&mut self) {
        self.editor.move_home();
    }

    fn input_end(&mut self) {
        self.editor.move_end();
    }

    fn input_up(&mut self) {
        self.editor.history_up();
    }

    fn input_down(&mut self) {
        self.editor.history_down();
    }

    fn input_auto_complete(
        &mut self,
        complete: &mut dyn FnMut(usize, &[char]) -> Vec<Completion>,
    ) -> bool {
        self.editor.auto_complete(complete)
    }

    fn input_enter(&mut self) -> String {
        self.editor.take_text()
    }

    fn input_len(&self) -> usize {
        self.editor.len()
    }

    fn input_is_command(&self) -> bool {
        self.editor.is_command()
    }

    fn exit(&mut self) {
        self.exit = true;
    }

    fn should_exit(&self) -> bool {
        self.exit
    }

    fn resize(&mut self) -> Result<(), UiError> {
        self.terminal.clear()?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), UiError> {
        let widths = self.widths;
        self.terminal
            .draw(|frame| render::render(frame, &self.buffers, &self.editor, widths))?;
        Ok(())
    }
}
