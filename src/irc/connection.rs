use crate::app::event::SessionEvent;
use crate::irc::session::{Member, Session, SessionError, Topic};
use crate::irc::state::{casemap, SessionState};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use futures::StreamExt;
use irc::client::prelude::{Client, Config};
use irc::proto::{CapSubCommand, Command, Message};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Capabilities requested before registration.
const CAPABILITIES: &str =
    "batch draft/chathistory echo-message message-tags multi-prefix server-time";
const HISTORY_LIMIT: u32 = 100;

pub struct SessionParams {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub nickname: String,
    pub username: String,
    pub realname: String,
    pub password: Option<String>,
    pub debug: bool,
}

type Incoming = Result<Message, irc::error::Error>;

/// A [`Session`] backed by the `irc` crate.
///
/// A reader task forwards the client stream into a channel; messages are
/// translated into events on the caller's task when they are polled.
pub struct IrcSession {
    sender: irc::client::Sender,
    incoming: mpsc::UnboundedReceiver<Incoming>,
    pending: VecDeque<SessionEvent>,
    state: SessionState,
}

impl IrcSession {
    pub async fn connect(params: SessionParams) -> Result<Self, SessionError> {
        let config = Config {
            server: Some(params.host.clone()),
            port: Some(params.port),
            use_tls: Some(params.tls),
            nickname: Some(params.nickname.clone()),
            username: Some(params.username),
            realname: Some(params.realname),
            password: params.password,
            ..Config::default()
        };

        let mut client = Client::from_config(config).await?;
        client.send(Command::CAP(
            None,
            CapSubCommand::REQ,
            None,
            Some(CAPABILITIES.to_string()),
        ))?;
        client.identify()?;

        let sender = client.sender();
        let mut stream = client.stream()?;
        let (tx, incoming) = mpsc::unbounded_channel::<Incoming>();

        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                if tx.send(item).is_err() {
                    break;
                }
            }
        });

        info!(host = %params.host, port = params.port, nick = %params.nickname, "session started");

        Ok(Self {
            sender,
            incoming,
            pending: VecDeque::new(),
            state: SessionState::new(&params.nickname, params.debug),
        })
    }

    fn absorb(&mut self, item: Incoming) {
        match item {
            Ok(msg) => self.state.handle_message(msg, &mut self.pending),
            Err(irc::error::Error::InvalidMessage { string, .. }) => {
                self.state.handle_malformed(string, &mut self.pending)
            }
            Err(e) => self.pending.push_back(SessionEvent::Error(e.into())),
        }
    }

    fn send(&mut self, msg: Message) -> Result<(), SessionError> {
        self.state
            .trace_outgoing(msg.to_string().trim_end(), &mut self.pending);
        self.sender.send(msg)?;
        Ok(())
    }

    fn send_typing(&mut self, target: &str, state: &str) {
        if !self.state.has_capability("message-tags") {
            return;
        }
        let line = format!("@+typing={} TAGMSG {}", state, target);
        match line.parse::<Message>() {
            Ok(msg) => {
                if let Err(e) = self.send(msg) {
                    debug!(target = %target, error = %e, "typing notification not sent");
                }
            }
            Err(_) => debug!(target = %target, "cannot build typing notification"),
        }
    }
}

#[async_trait]
impl Session for IrcSession {
    async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            if let Some(ev) = self.pending.pop_front() {
                return Some(ev);
            }
            let item = self.incoming.recv().await?;
            self.absorb(item);
        }
    }

    fn try_next_event(&mut self) -> Option<SessionEvent> {
        loop {
            if let Some(ev) = self.pending.pop_front() {
                return Some(ev);
            }
            let item = self.incoming.try_recv().ok()?;
            self.absorb(item);
        }
    }

    fn privmsg(&mut self, target: &str, content: &str) -> Result<(), SessionError> {
        self.send(Command::PRIVMSG(target.to_string(), content.to_string()).into())
    }

    fn join(&mut self, channels: &str) -> Result<(), SessionError> {
        let mut parts = channels.trim().splitn(2, ' ');
        let list = parts.next().unwrap_or_default().to_string();
        let keys = parts
            .next()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self.send(Command::JOIN(list, keys, None).into())
    }

    fn part(&mut self, channel: &str, reason: &str) -> Result<(), SessionError> {
        let reason = (!reason.is_empty()).then(|| reason.to_string());
        self.send(Command::PART(channel.to_string(), reason).into())
    }

    fn typing(&mut self, target: &str) {
        self.send_typing(target, "active");
    }

    fn typing_stop(&mut self, target: &str) {
        self.send_typing(target, "done");
    }

    fn topic(&self, channel: &str) -> Topic {
        self.state.topic(channel)
    }

    fn set_topic(&mut self, channel: &str, topic: &str) -> Result<(), SessionError> {
        self.send(Command::TOPIC(channel.to_string(), Some(topic.to_string())).into())
    }

    fn send_raw(&mut self, line: &str) -> Result<(), SessionError> {
        let msg: Message = line
            .parse()
            .map_err(|_| SessionError::InvalidRaw(line.to_string()))?;
        self.send(msg)
    }

    fn request_history(&mut self, target: &str, before: DateTime<Local>) -> Result<(), SessionError> {
        if !self.state.has_capability("draft/chathistory") {
            return Ok(());
        }
        let timestamp = before
            .with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%S%.3fZ");
        self.send(
            Command::Raw(
                "CHATHISTORY".to_string(),
                vec![
                    "BEFORE".to_string(),
                    target.to_string(),
                    format!("timestamp={}", timestamp),
                    HISTORY_LIMIT.to_string(),
                ],
            )
            .into(),
        )
    }

    fn names(&self, target: &str) -> Vec<Member> {
        self.state.names(target)
    }

    fn casemap(&self, name: &str) -> String {
        casemap(name)
    }

    fn nick(&self) -> &str {
        self.state.nick()
    }

    fn nick_cf(&self) -> &str {
        self.state.nick_cf()
    }

    fn has_capability(&self, capability: &str) -> bool {
        self.state.has_capability(capability)
    }

    fn is_channel(&self, name: &str) -> bool {
        self.state.is_channel(name)
    }

    fn channels_shared_with(&self, user: &str) -> Vec<String> {
        self.state.channels_shared_with(user)
    }

    fn stop(&mut self) {
        if let Err(e) = self.sender.send_quit("Leaving") {
            debug!(error = %e, "quit not sent");
        }
    }
}
