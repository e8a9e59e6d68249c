//! In-memory collaborators for exercising [`App`](super::App) without a
//! network or a terminal.

use crate::app::event::{SessionEvent, UiEvent};
use crate::app::notify::{Highlight, Notifier, NotifyError};
use crate::irc::state::casemap;
use crate::irc::{Member, Session, SessionError, Topic};
use crate::ui::buffers::BufferList;
use crate::ui::input::Editor;
use crate::ui::{Completion, Display, Line, UiError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

const PAGE: usize = 10;

#[derive(Default)]
pub struct SessionLog {
    pub events: VecDeque<SessionEvent>,
    /// Once set, an empty queue means the stream ended.
    pub closed: bool,
    pub names: HashMap<String, Vec<Member>>,
    pub topics: HashMap<String, Topic>,
    pub caps: HashSet<String>,
    pub shared: HashMap<String, Vec<String>>,
    /// Outbound commands, one protocol-like line each.
    pub sent: Vec<String>,
    pub history_requests: Vec<(String, DateTime<Local>)>,
    /// Display checked when history is requested, see [`FakeSession::watch`].
    pub display: Option<FakeDisplay>,
    /// History requests made while the target buffer did not exist yet.
    pub history_without_buffer: usize,
    pub typing: Vec<String>,
    pub stopped: bool,
}

#[derive(Clone)]
pub struct FakeSession {
    nick: String,
    nick_cf: String,
    log: Arc<Mutex<SessionLog>>,
}

impl FakeSession {
    pub fn new(nick: &str) -> Self {
        Self {
            nick: nick.to_string(),
            nick_cf: casemap(nick),
            log: Arc::default(),
        }
    }

    pub fn log(&self) -> MutexGuard<'_, SessionLog> {
        self.log.lock().unwrap()
    }

    pub fn push(&self, event: SessionEvent) {
        self.log().events.push_back(event);
    }

    pub fn set_names(&self, channel: &str, members: Vec<Member>) {
        self.log().names.insert(casemap(channel), members);
    }

    pub fn add_capability(&self, cap: &str) {
        self.log().caps.insert(cap.to_string());
    }

    pub fn share(&self, user: &str, channels: &[&str]) {
        self.log().shared.insert(
            casemap(user),
            channels.iter().map(|c| c.to_string()).collect(),
        );
    }

    /// Check `display` for the target buffer on every history request.
    pub fn watch(&self, display: &FakeDisplay) {
        self.log().display = Some(display.clone());
    }

    pub fn sent(&self) -> Vec<String> {
        self.log().sent.clone()
    }

    fn record(&self, line: String) -> Result<(), SessionError> {
        self.log().sent.push(line);
        Ok(())
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn next_event(&mut self) -> Option<SessionEvent> {
        let (event, closed) = {
            let mut log = self.log();
            (log.events.pop_front(), log.closed)
        };
        match event {
            Some(ev) => Some(ev),
            None if closed => None,
            None => std::future::pending().await,
        }
    }

    fn try_next_event(&mut self) -> Option<SessionEvent> {
        self.log().events.pop_front()
    }

    fn privmsg(&mut self, target: &str, content: &str) -> Result<(), SessionError> {
        self.record(format!("PRIVMSG {} :{}", target, content))
    }

    fn join(&mut self, channels: &str) -> Result<(), SessionError> {
        self.record(format!("JOIN {}", channels))
    }

    fn part(&mut self, channel: &str, reason: &str) -> Result<(), SessionError> {
        self.record(format!("PART {} :{}", channel, reason))
    }

    fn typing(&mut self, target: &str) {
        self.log().typing.push(format!("active {}", target));
    }

    fn typing_stop(&mut self, target: &str) {
        self.log().typing.push(format!("done {}", target));
    }

    fn topic(&self, channel: &str) -> Topic {
        self.log()
            .topics
            .get(&casemap(channel))
            .cloned()
            .unwrap_or_default()
    }

    fn set_topic(&mut self, channel: &str, topic: &str) -> Result<(), SessionError> {
        self.record(format!("TOPIC {} :{}", channel, topic))
    }

    fn send_raw(&mut self, line: &str) -> Result<(), SessionError> {
        self.record(line.to_string())
    }

    fn request_history(&mut self, target: &str, before: DateTime<Local>) -> Result<(), SessionError> {
        let watched = self.log().display.clone();
        let missing = watched.is_some_and(|d| !d.has_buffer(target));
        let mut log = self.log();
        log.history_requests.push((target.to_string(), before));
        if missing {
            log.history_without_buffer += 1;
        }
        Ok(())
    }

    fn names(&self, target: &str) -> Vec<Member> {
        self.log()
            .names
            .get(&casemap(target))
            .cloned()
            .unwrap_or_default()
    }

    fn casemap(&self, name: &str) -> String {
        casemap(name)
    }

    fn nick(&self) -> &str {
        &self.nick
    }

    fn nick_cf(&self) -> &str {
        &self.nick_cf
    }

    fn has_capability(&self, capability: &str) -> bool {
        self.log().caps.contains(capability)
    }

    fn is_channel(&self, name: &str) -> bool {
        name.starts_with(['#', '&'])
    }

    fn channels_shared_with(&self, user: &str) -> Vec<String> {
        self.log()
            .shared
            .get(&casemap(user))
            .cloned()
            .unwrap_or_default()
    }

    fn stop(&mut self) {
        self.log().stopped = true;
    }
}

#[derive(Default)]
pub struct DisplayLog {
    pub buffers: BufferList,
    pub editor: Editor,
    pub events: VecDeque<UiEvent>,
    pub closed: bool,
    pub draws: usize,
    pub resizes: usize,
    pub exit: bool,
}

impl DisplayLog {
    pub fn lines(&self, buffer: &str) -> Vec<Line> {
        self.buffers
            .iter()
            .find(|b| b.title.eq_ignore_ascii_case(buffer))
            .map(|b| b.lines.clone())
            .unwrap_or_default()
    }

    pub fn bodies(&self, buffer: &str) -> Vec<String> {
        self.lines(buffer).into_iter().map(|l| l.body).collect()
    }
}

/// A display backed by the real buffer list and editor, without drawing.
#[derive(Clone, Default)]
pub struct FakeDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MutexGuard<'_, DisplayLog> {
        self.log.lock().unwrap()
    }

    pub fn push(&self, event: UiEvent) {
        self.log().events.push_back(event);
    }
}

#[async_trait]
impl Display for FakeDisplay {
    async fn next_event(&mut self) -> Option<UiEvent> {
        let (event, closed) = {
            let mut log = self.log();
            (log.events.pop_front(), log.closed)
        };
        match event {
            Some(ev) => Some(ev),
            None if closed => None,
            None => std::future::pending().await,
        }
    }

    fn add_buffer(&mut self, title: &str) -> Result<(), UiError> {
        self.log().buffers.add(title)
    }

    fn remove_buffer(&mut self, title: &str) -> Result<(), UiError> {
        self.log().buffers.remove(title)
    }

    fn has_buffer(&self, title: &str) -> bool {
        self.log().buffers.contains(title)
    }

    fn add_line(&mut self, buffer: &str, highlight: bool, line: Line) -> Result<(), UiError> {
        self.log().buffers.add_line(buffer, highlight, line)
    }

    fn add_lines(&mut self, buffer: &str, lines: Vec<Line>) -> Result<(), UiError> {
        self.log().buffers.add_lines(buffer, lines)
    }

    fn current_buffer(&self) -> String {
        self.log().buffers.current_title().to_string()
    }

    fn next_buffer(&mut self) {
        self.log().buffers.next();
    }

    fn previous_buffer(&mut self) {
        self.log().buffers.previous();
    }

    fn scroll_up(&mut self) {
        self.log().buffers.scroll_up(PAGE / 2, PAGE);
    }

    fn scroll_down(&mut self) {
        self.log().buffers.scroll_down(PAGE / 2);
    }

    fn is_at_top(&self) -> bool {
        self.log().buffers.is_at_top(PAGE)
    }

    fn current_buffer_oldest_time(&self) -> Option<DateTime<Local>> {
        self.log().buffers.oldest_time()
    }

    fn input_rune(&mut self, c: char) {
        self.log().editor.insert_char(c);
    }

    fn input_backspace(&mut self) -> bool {
        self.log().editor.delete_back()
    }

    fn input_delete(&mut self) -> bool {
        self.log().editor.delete_forward()
    }

    fn input_left(&mut self) {
        self.log().editor.move_left();
    }

    fn input_right(&mut self) {
        self.log().editor.move_right();
    }

    fn input_home(&mut self) {
        self.log().editor.move_home();
    }

    fn input_end(&mut self) {
        self.log().editor.move_end();
    }

    fn input_up(&mut self) {
        self.log().editor.history_up();
    }

    fn input_down(&mut self) {
        self.log().editor.history_down();
    }

    fn input_auto_complete(
        &mut self,
        complete: &mut dyn FnMut(usize, &[char]) -> Vec<Completion>,
    ) -> bool {
        self.log().editor.auto_complete(complete)
    }

    fn input_enter(&mut self) -> String {
        self.log().editor.take_text()
    }

    fn input_len(&self) -> usize {
        self.log().editor.len()
    }

    fn input_is_command(&self) -> bool {
        self.log().editor.is_command()
    }

    fn exit(&mut self) {
        self.log().exit = true;
    }

    fn should_exit(&self) -> bool {
        self.log().exit
    }

    fn resize(&mut self) -> Result<(), UiError> {
        self.log().resizes += 1;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), UiError> {
        self.log().draws += 1;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub calls: Arc<Mutex<Vec<Highlight>>>,
    pub fail: bool,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, highlight: &Highlight) -> Result<(), NotifyError> {
        self.calls.lock().unwrap().push(highlight.clone());
        if self.fail {
            return Err(NotifyError::Spawn(std::io::Error::other("boom")));
        }
        Ok(())
    }
}
