//! Protocol state tracking.
//!
//! [`SessionState`] consumes parsed protocol messages, keeps the little state
//! the client needs (own nick, joined channels and their members, topics,
//! negotiated capabilities, open history batches) and turns each message into
//! zero or more [`SessionEvent`]s.

use crate::app::event::{MessageEvent, RawDirection, SessionEvent, Verb};
use crate::irc::session::{Member, SessionError, Topic};
use chrono::{DateTime, Local, TimeZone};
use irc::proto::message::Tag;
use irc::proto::{CapSubCommand, Command, Message, Prefix, Response};
use std::collections::{HashMap, HashSet, VecDeque};

/// Membership prefixes, highest first.
const POWER_PREFIXES: &str = "~&@%+";

/// RFC 1459 casemapping.
pub fn casemap(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'A'..='Z' => c.to_ascii_lowercase(),
            '[' => '{',
            ']' => '}',
            '\\' => '|',
            '~' => '^',
            _ => c,
        })
        .collect()
}

#[derive(Debug)]
struct Channel {
    name: String,
    members: HashMap<String, Member>,
    topic: Topic,
}

impl Channel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: HashMap::new(),
            topic: Topic::default(),
        }
    }
}

#[derive(Debug)]
struct Batch {
    target: String,
    messages: Vec<MessageEvent>,
}

pub struct SessionState {
    nick: String,
    nick_cf: String,
    chantypes: String,
    capabilities: HashSet<String>,
    channels: HashMap<String, Channel>,
    batches: HashMap<String, Batch>,
    debug: bool,
}

impl SessionState {
    pub fn new(nick: &str, debug: bool) -> Self {
        Self {
            nick: nick.to_string(),
            nick_cf: casemap(nick),
            chantypes: "#&".to_string(),
            capabilities: HashSet::new(),
            channels: HashMap::new(),
            batches: HashMap::new(),
            debug,
        }
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn nick_cf(&self) -> &str {
        &self.nick_cf
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn is_channel(&self, name: &str) -> bool {
        name.chars().next().is_some_and(|c| self.chantypes.contains(c))
    }

    /// Members of `target`, sorted by casemapped name.
    pub fn names(&self, target: &str) -> Vec<Member> {
        let Some(channel) = self.channels.get(&casemap(target)) else {
            return Vec::new();
        };
        let mut members: Vec<(&String, &Member)> = channel.members.iter().collect();
        members.sort_by(|a, b| a.0.cmp(b.0));
        members.into_iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn topic(&self, channel: &str) -> Topic {
        self.channels
            .get(&casemap(channel))
            .map(|c| c.topic.clone())
            .unwrap_or_default()
    }

    pub fn channels_shared_with(&self, user: &str) -> Vec<String> {
        let user_cf = casemap(user);
        let mut shared: Vec<String> = self
            .channels
            .values()
            .filter(|c| c.members.contains_key(&user_cf))
            .map(|c| c.name.clone())
            .collect();
        shared.sort();
        shared
    }

    pub fn trace_outgoing(&self, line: &str, out: &mut VecDeque<SessionEvent>) {
        if self.debug {
            out.push_back(SessionEvent::Raw {
                direction: RawDirection::Outgoing,
                line: line.to_string(),
            });
        }
    }

    pub fn handle_malformed(&self, line: String, out: &mut VecDeque<SessionEvent>) {
        if self.debug {
            out.push_back(SessionEvent::Raw {
                direction: RawDirection::Malformed,
                line,
            });
        }
    }

    /// With debug on, the trace is the re-serialized message, not the exact
    /// wire line.
    pub fn handle_message(&mut self, msg: Message, out: &mut VecDeque<SessionEvent>) {
        if self.debug {
            out.push_back(SessionEvent::Raw {
                direction: RawDirection::Incoming,
                line: msg.to_string().trim_end().to_string(),
            });
        }

        let at = message_time(&msg);
        let batch = tag_value(&msg, "batch").map(str::to_string);
        let source = source_name(&msg);

        match msg.command {
            Command::Response(Response::RPL_WELCOME, args) => {
                if let Some(nick) = args.first() {
                    self.set_nick(nick);
                }
                out.push_back(SessionEvent::Registered);
            }
            Command::Response(Response::RPL_ISUPPORT, args) => {
                for token in args.iter().skip(1) {
                    if let Some(types) = token.strip_prefix("CHANTYPES=") {
                        self.chantypes = types.to_string();
                    }
                }
            }
            Command::Response(Response::RPL_NAMREPLY, args) => {
                if let (Some(channel), Some(names)) = (args.get(2), args.get(3)) {
                    if let Some(channel) = self.channels.get_mut(&casemap(channel)) {
                        for entry in names.split_whitespace() {
                            let member = parse_member(entry);
                            channel.members.insert(casemap(&member.name), member);
                        }
                    }
                }
            }
            Command::Response(Response::RPL_TOPIC, args) => {
                if let (Some(channel), Some(text)) = (args.get(1), args.get(2)) {
                    if let Some(channel) = self.channels.get_mut(&casemap(channel)) {
                        channel.topic.text = text.clone();
                    }
                }
            }
            Command::Response(Response::RPL_TOPICWHOTIME, args) => {
                if let (Some(channel), Some(who)) = (args.get(1), args.get(2)) {
                    if let Some(channel) = self.channels.get_mut(&casemap(channel)) {
                        channel.topic.who = Some(who.clone());
                        channel.topic.at = args
                            .get(3)
                            .and_then(|ts| ts.parse::<i64>().ok())
                            .and_then(|secs| Local.timestamp_opt(secs, 0).single());
                    }
                }
            }
            Command::Response(Response::RPL_NOTOPIC, args) => {
                if let Some(channel) = args.get(1) {
                    if let Some(channel) = self.channels.get_mut(&casemap(channel)) {
                        channel.topic = Topic::default();
                    }
                }
            }
            Command::CAP(_, CapSubCommand::ACK, field, trailing) => {
                let list = trailing.or(field).unwrap_or_default();
                for cap in list.split_whitespace() {
                    match cap.strip_prefix('-') {
                        Some(removed) => {
                            self.capabilities.remove(removed);
                        }
                        None => {
                            self.capabilities.insert(cap.to_string());
                        }
                    }
                }
            }
            Command::JOIN(channels, _, _) => {
                for channel in channels.split(',').filter(|c| !c.is_empty()) {
                    self.join(&source, channel, at, out);
                }
            }
            Command::PART(channels, _) => {
                for channel in channels.split(',').filter(|c| !c.is_empty()) {
                    self.part(&source, channel, at, out);
                }
            }
            Command::KICK(channel, user, _) => {
                self.part(&user, &channel, at, out);
            }
            Command::QUIT(_) => {
                let user_cf = casemap(&source);
                if user_cf == self.nick_cf {
                    return;
                }
                let mut channels = Vec::new();
                for channel in self.channels.values_mut() {
                    if channel.members.remove(&user_cf).is_some() {
                        channels.push(channel.name.clone());
                    }
                }
                channels.sort();
                out.push_back(SessionEvent::UserQuit {
                    user: source,
                    channels,
                    at,
                });
            }
            Command::NICK(new_nick) => {
                let former_cf = casemap(&source);
                for channel in self.channels.values_mut() {
                    if let Some(mut member) = channel.members.remove(&former_cf) {
                        member.name = new_nick.clone();
                        channel.members.insert(casemap(&new_nick), member);
                    }
                }
                if former_cf == self.nick_cf {
                    self.set_nick(&new_nick);
                    out.push_back(SessionEvent::SelfNick {
                        former_nick: source,
                        at,
                    });
                } else {
                    out.push_back(SessionEvent::UserNick {
                        user: new_nick,
                        former_nick: source,
                        at,
                    });
                }
            }
            Command::TOPIC(channel, Some(topic)) => {
                if let Some(tracked) = self.channels.get_mut(&casemap(&channel)) {
                    tracked.topic = Topic {
                        text: topic.clone(),
                        who: Some(source),
                        at: Some(at),
                    };
                }
                out.push_back(SessionEvent::TopicChange { channel, topic, at });
            }
            Command::PRIVMSG(target, content) => {
                self.message(source, target, Verb::Privmsg, content, at, batch, out);
            }
            Command::NOTICE(target, content) => {
                self.message(source, target, Verb::Notice, content, at, batch, out);
            }
            Command::BATCH(reference, _, params) => {
                if let Some(reference) = reference.strip_prefix('+') {
                    let target = params
                        .and_then(|p| p.into_iter().next())
                        .unwrap_or_default();
                    self.batches.insert(
                        reference.to_string(),
                        Batch {
                            target,
                            messages: Vec::new(),
                        },
                    );
                } else if let Some(reference) = reference.strip_prefix('-') {
                    if let Some(batch) = self.batches.remove(reference) {
                        if !batch.messages.is_empty() {
                            out.push_back(SessionEvent::History {
                                target: batch.target,
                                messages: batch.messages,
                            });
                        }
                    }
                }
            }
            Command::ERROR(reason) => {
                out.push_back(SessionEvent::Error(SessionError::Server(reason)));
            }
            _ => {}
        }
    }

    fn set_nick(&mut self, nick: &str) {
        self.nick = nick.to_string();
        self.nick_cf = casemap(nick);
    }

    fn join(
        &mut self,
        user: &str,
        channel: &str,
        at: DateTime<Local>,
        out: &mut VecDeque<SessionEvent>,
    ) {
        let channel_cf = casemap(channel);
        if casemap(user) == self.nick_cf {
            self.channels
                .entry(channel_cf)
                .or_insert_with(|| Channel::new(channel));
            out.push_back(SessionEvent::SelfJoin {
                channel: channel.to_string(),
            });
        } else if let Some(tracked) = self.channels.get_mut(&channel_cf) {
            tracked.members.insert(
                casemap(user),
                Member {
                    power_level: String::new(),
                    name: user.to_string(),
                },
            );
            out.push_back(SessionEvent::UserJoin {
                user: user.to_string(),
                channel: tracked.name.clone(),
                at,
            });
        }
    }

    fn part(
        &mut self,
        user: &str,
        channel: &str,
        at: DateTime<Local>,
        out: &mut VecDeque<SessionEvent>,
    ) {
        let channel_cf = casemap(channel);
        if casemap(user) == self.nick_cf {
            if let Some(tracked) = self.channels.remove(&channel_cf) {
                out.push_back(SessionEvent::SelfPart {
                    channel: tracked.name,
                });
            }
        } else if let Some(tracked) = self.channels.get_mut(&channel_cf) {
            tracked.members.remove(&casemap(user));
            out.push_back(SessionEvent::UserPart {
                user: user.to_string(),
                channel: tracked.name.clone(),
                at,
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn message(
        &mut self,
        user: String,
        target: String,
        verb: Verb,
        content: String,
        at: DateTime<Local>,
        batch: Option<String>,
        out: &mut VecDeque<SessionEvent>,
    ) {
        let event = MessageEvent {
            target_is_channel: self.is_channel(&target),
            user,
            target,
            verb,
            content,
            at,
        };
        if let Some(batch) = batch.and_then(|r| self.batches.get_mut(&r)) {
            batch.messages.push(event);
            return;
        }
        out.push_back(SessionEvent::Message(event));
    }
}

fn parse_member(entry: &str) -> Member {
    let name = entry.trim_start_matches(|c| POWER_PREFIXES.contains(c));
    Member {
        power_level: entry[..entry.len() - name.len()].to_string(),
        name: name.to_string(),
    }
}

fn source_name(msg: &Message) -> String {
    match &msg.prefix {
        Some(Prefix::Nickname(nick, _, _)) => nick.clone(),
        Some(Prefix::ServerName(name)) => name.clone(),
        None => String::new(),
    }
}

fn tag_value<'a>(msg: &'a Message, key: &str) -> Option<&'a str> {
    msg.tags
        .as_ref()?
        .iter()
        .find(|Tag(k, _)| k == key)
        .and_then(|Tag(_, v)| v.as_deref())
}

/// Server-time when the `time` tag is present, otherwise now.
fn message_time(msg: &Message) -> DateTime<Local> {
    tag_value(msg, "time")
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Local))
        .unwrap_or_else(Local::now)
}
