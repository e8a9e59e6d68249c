//! Slash command parsing, validation and the built-in handlers.

use crate::app::event::{MessageEvent, Verb};
use crate::app::App;
use crate::irc::SessionError;
use crate::ui::{mirc_colors, Line, UiError, HOME};
use chrono::Local;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command {0:?} doesn't exist")]
    Unknown(String),

    #[error("usage: {name} {usage}")]
    Usage {
        name: &'static str,
        usage: &'static str,
    },

    #[error("command {0:?} cannot be executed from home")]
    NotFromHome(&'static str),

    #[error("cannot part home")]
    PartHome,

    #[error("no private conversation to reply to")]
    NoLastQuery,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Ui(#[from] UiError),
}

type Handler = fn(&mut App, &str, Vec<String>) -> Result<(), CommandError>;

/// Static description of a command.
#[derive(Clone, Copy, Debug)]
pub struct Command {
    pub min_args: usize,
    pub allow_home: bool,
    pub usage: &'static str,
    pub desc: &'static str,
    pub handle: Handler,
}

/// Commands by upper-case name. The empty name handles plain text.
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Command>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        let entries: [(&'static str, Command); 10] = [
            ("", command(1, false, "", "", command_say)),
            (
                "HELP",
                command(
                    0,
                    true,
                    "[command]",
                    "show the list of commands, or how to use the given one",
                    command_help,
                ),
            ),
            (
                "JOIN",
                command(1, true, "<channels> [keys]", "join a channel", command_join),
            ),
            (
                "ME",
                command(
                    1,
                    true,
                    "<message>",
                    "send an action (reply to last query if sent from home)",
                    command_me,
                ),
            ),
            (
                "MSG",
                command(
                    2,
                    true,
                    "<target> <message>",
                    "send a message to the given target",
                    command_msg,
                ),
            ),
            (
                "NAMES",
                command(
                    0,
                    false,
                    "",
                    "show the member list of the current channel",
                    command_names,
                ),
            ),
            (
                "PART",
                command(0, true, "[channel] [reason]", "part a channel", command_part),
            ),
            (
                "QUOTE",
                command(1, true, "<raw message>", "send raw protocol data", command_quote),
            ),
            (
                "R",
                command(1, true, "<message>", "reply to the last query", command_reply),
            ),
            (
                "TOPIC",
                command(
                    0,
                    false,
                    "[topic]",
                    "show or set the topic of the current channel",
                    command_topic,
                ),
            ),
        ];
        Self {
            commands: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<(&'static str, Command)> {
        self.commands.get_key_value(name).map(|(k, c)| (*k, *c))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Command)> {
        self.commands.iter().map(|(k, c)| (*k, c))
    }
}

fn command(
    min_args: usize,
    allow_home: bool,
    usage: &'static str,
    desc: &'static str,
    handle: Handler,
) -> Command {
    Command {
        min_args,
        allow_home,
        usage,
        desc,
        handle,
    }
}

/// Split input into an upper-cased command name and its raw arguments.
/// Text not starting with `/` has an empty name and is its own argument.
pub fn parse_command(input: &str) -> (String, &str) {
    let Some(rest) = input.strip_prefix('/') else {
        return (String::new(), input);
    };
    let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));
    (name.to_uppercase(), args.trim_start_matches(' '))
}

/// Validate `input` against the registry and split its arguments.
pub fn prepare(
    registry: &CommandRegistry,
    buffer: &str,
    input: &str,
) -> Result<(Command, Vec<String>), CommandError> {
    let (name, raw_args) = parse_command(input);
    let (name, cmd) = registry.get(&name).ok_or(CommandError::Unknown(name))?;

    let args: Vec<String> = if raw_args.is_empty() {
        Vec::new()
    } else if cmd.min_args == 0 {
        vec![raw_args.to_string()]
    } else {
        raw_args
            .splitn(cmd.min_args, ' ')
            .map(str::to_string)
            .collect()
    };

    if args.len() < cmd.min_args {
        return Err(CommandError::Usage {
            name,
            usage: cmd.usage,
        });
    }
    if buffer == HOME && !cmd.allow_home {
        return Err(CommandError::NotFromHome(name));
    }
    Ok((cmd, args))
}

fn status_line(body: impl Into<String>) -> Line {
    Line::new(Local::now(), "--", body)
}

fn send_message(app: &mut App, target: &str, content: &str) -> Result<(), CommandError> {
    let Some(session) = app.session.as_deref_mut() else {
        return Ok(());
    };
    session.privmsg(target, content)?;
    if session.has_capability("echo-message") {
        return Ok(());
    }
    let ev = MessageEvent {
        user: session.nick().to_string(),
        target: target.to_string(),
        target_is_channel: session.is_channel(target),
        verb: Verb::Privmsg,
        content: content.to_string(),
        at: Local::now(),
    };
    if let Some(formatted) = app.format_message(&ev) {
        app.add_line(&formatted.buffer, false, formatted.line);
    }
    Ok(())
}

fn command_say(app: &mut App, buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    send_message(app, buffer, &args[0])
}

fn command_help(app: &mut App, _buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    let current = app.display.current_buffer();
    let at = Local::now();
    let mut lines = Vec::new();

    match args.first() {
        None => {
            lines.push(status_line("Available commands:"));
            for (name, cmd) in app.commands.iter().filter(|(_, c)| !c.desc.is_empty()) {
                lines.push(Line::new(at, "", format!("  \x02{}\x02 {}", name, cmd.usage)));
                lines.push(Line::new(at, "", format!("    {}", cmd.desc)));
                lines.push(Line::new(at, "", ""));
            }
        }
        Some(filter) => {
            let search = filter.to_uppercase();
            lines.push(status_line(format!("Commands that match \"{}\":", search)));
            let mut found = false;
            for (name, cmd) in app.commands.iter().filter(|(n, _)| n.contains(&search)) {
                lines.push(Line::new(at, "", format!("\x02{}\x02 {}", name, cmd.usage)));
                lines.push(Line::new(at, "", format!("  {}", cmd.desc)));
                lines.push(Line::new(at, "", ""));
                found = true;
            }
            if !found {
                lines.push(Line::new(
                    at,
                    "",
                    format!("  no command matches {:?}", filter),
                ));
            }
        }
    }

    for line in lines {
        app.add_line(&current, false, line);
    }
    Ok(())
}

fn command_join(app: &mut App, _buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    if let Some(session) = app.session.as_deref_mut() {
        session.join(&args[0])?;
    }
    Ok(())
}

fn command_me(app: &mut App, buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    let target = if buffer == HOME {
        app.state.last_query.clone().ok_or(CommandError::NoLastQuery)?
    } else {
        buffer.to_string()
    };
    let content = format!("\x01ACTION {}\x01", args[0]);
    send_message(app, &target, &content)
}

fn command_msg(app: &mut App, _buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    send_message(app, &args[0], &args[1])
}

fn command_names(app: &mut App, buffer: &str, _args: Vec<String>) -> Result<(), CommandError> {
    let Some(session) = app.session.as_deref() else {
        return Ok(());
    };
    let members: Vec<String> = session
        .names(buffer)
        .into_iter()
        .map(|m| {
            if m.power_level.is_empty() {
                m.name
            } else {
                format!(
                    "\x03{}{}\x03{}{}",
                    mirc_colors::GREEN,
                    m.power_level,
                    mirc_colors::GREY,
                    m.name
                )
            }
        })
        .collect();
    let body = format!("\x03{}Names: {}", mirc_colors::GREY, members.join(" "));
    app.add_line(buffer, false, status_line(body.trim_end()));
    Ok(())
}

fn command_part(app: &mut App, buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    let Some(session) = app.session.as_deref_mut() else {
        return Ok(());
    };
    let mut channel = buffer.to_string();
    let mut reason = String::new();
    if let Some(raw) = args.first() {
        let (first, rest) = raw.split_once(' ').unwrap_or((raw.as_str(), ""));
        if session.is_channel(first) {
            channel = first.to_string();
            reason = rest.trim_start_matches(' ').to_string();
        } else {
            reason = raw.clone();
        }
    }

    if channel == HOME {
        return Err(CommandError::PartHome);
    }
    session.part(&channel, &reason)?;
    Ok(())
}

fn command_quote(app: &mut App, _buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    if let Some(session) = app.session.as_deref_mut() {
        session.send_raw(&args[0])?;
    }
    Ok(())
}

fn command_reply(app: &mut App, _buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    let target = app.state.last_query.clone().ok_or(CommandError::NoLastQuery)?;
    send_message(app, &target, &args[0])
}

fn command_topic(app: &mut App, buffer: &str, args: Vec<String>) -> Result<(), CommandError> {
    let Some(session) = app.session.as_deref_mut() else {
        return Ok(());
    };
    if let Some(topic) = args.first() {
        session.set_topic(buffer, topic)?;
        return Ok(());
    }

    let topic = session.topic(buffer);
    let body = match (topic.who, topic.at) {
        (Some(who), Some(at)) => format!(
            "\x03{}Topic (by {}, {}): {}",
            mirc_colors::GREY,
            who,
            at.format("%a %b %-d %H:%M:%S"),
            topic.text
        ),
        (Some(who), None) => format!("\x03{}Topic (by {}): {}", mirc_colors::GREY, who, topic.text),
        _ => format!("\x03{}Topic: {}", mirc_colors::GREY, topic.text),
    };
    app.add_line(buffer, false, status_line(body));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(""), (String::new(), ""));
        assert_eq!(parse_command("hello there"), (String::new(), "hello there"));
        assert_eq!(parse_command("/join  #a key"), ("JOIN".to_string(), "#a key"));
        assert_eq!(parse_command("/names"), ("NAMES".to_string(), ""));
        assert_eq!(parse_command("/"), (String::new(), ""));
    }

    #[test]
    fn test_prepare_splits_by_min_args() {
        let registry = CommandRegistry::new();
        let (_, args) = prepare(&registry, "#a", "/msg bob hello there").unwrap();
        assert_eq!(args, vec!["bob", "hello there"]);
        let (_, args) = prepare(&registry, "#a", "/topic new topic here").unwrap();
        assert_eq!(args, vec!["new topic here"]);
        let (_, args) = prepare(&registry, "#a", "/names").unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_prepare_errors() {
        let registry = CommandRegistry::new();
        assert_eq!(
            prepare(&registry, "#a", "/frobnicate").unwrap_err().to_string(),
            "command \"FROBNICATE\" doesn't exist"
        );
        assert_eq!(
            prepare(&registry, "#a", "/msg bob").unwrap_err().to_string(),
            "usage: MSG <target> <message>"
        );
        assert_eq!(
            prepare(&registry, HOME, "/names").unwrap_err().to_string(),
            "command \"NAMES\" cannot be executed from home"
        );
        assert_eq!(
            prepare(&registry, HOME, "hi").unwrap_err().to_string(),
            "command \"\" cannot be executed from home"
        );
        assert!(matches!(
            prepare(&registry, "#a", ""),
            Err(CommandError::Usage { name: "", .. })
        ));
    }

    #[test]
    fn test_registry_contents() {
        let registry = CommandRegistry::new();
        let names: Vec<&str> = registry.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["", "HELP", "JOIN", "ME", "MSG", "NAMES", "PART", "QUOTE", "R", "TOPIC"]
        );
        let (_, msg) = registry.get("MSG").unwrap();
        assert_eq!(msg.min_args, 2);
        assert!(msg.allow_home);
        let (_, say) = registry.get("").unwrap();
        assert!(!say.allow_home);
        assert!(say.desc.is_empty());
    }

    mod handlers {
        use super::*;
        use crate::app::event::SessionEvent;
        use crate::app::testing::{FakeDisplay, FakeSession, RecordingNotifier};
        use crate::config::AppConfig;
        use crate::irc::{Member, Topic};
        use chrono::TimeZone;

        fn app() -> (App, FakeSession, FakeDisplay) {
            let session = FakeSession::new("me");
            let display = FakeDisplay::new();
            let config = AppConfig {
                nick: "me".to_string(),
                ..AppConfig::default()
            };
            let mut app = App::new(
                &config,
                Box::new(display.clone()),
                Box::new(RecordingNotifier::default()),
            )
            .with_session(Box::new(session.clone()));
            app.handle_session_event(SessionEvent::SelfJoin {
                channel: "#rust".to_string(),
            })
            .unwrap();
            (app, session, display)
        }

        #[test]
        fn test_msg_to_user_echoes_in_home() {
            let (mut app, session, display) = app();
            app.handle_input("#rust", "/msg bob hello there").unwrap();
            assert_eq!(session.sent(), vec!["PRIVMSG bob :hello there"]);
            let home = display.log().lines(HOME);
            assert_eq!(home[0].head, "\u{2192} bob");
            assert_eq!(home[0].body, "hello there");
        }

        #[test]
        fn test_reply_and_action_need_a_last_query() {
            let (mut app, session, _) = app();
            assert!(matches!(
                app.handle_input(HOME, "/r hi"),
                Err(CommandError::NoLastQuery)
            ));
            assert!(matches!(
                app.handle_input(HOME, "/me waves"),
                Err(CommandError::NoLastQuery)
            ));
            app.state.last_query = Some("bob".to_string());
            app.handle_input(HOME, "/r hi").unwrap();
            app.handle_input(HOME, "/me waves").unwrap();
            app.handle_input("#rust", "/me waves").unwrap();
            assert_eq!(
                session.sent(),
                vec![
                    "PRIVMSG bob :hi",
                    "PRIVMSG bob :\x01ACTION waves\x01",
                    "PRIVMSG #rust :\x01ACTION waves\x01",
                ]
            );
        }

        #[test]
        fn test_join_quote_and_topic_set() {
            let (mut app, session, _) = app();
            app.handle_input(HOME, "/join #a,#b k1,k2").unwrap();
            app.handle_input(HOME, "/quote PING :x").unwrap();
            app.handle_input("#rust", "/topic be nice").unwrap();
            assert_eq!(
                session.sent(),
                vec!["JOIN #a,#b k1,k2", "PING :x", "TOPIC #rust :be nice"]
            );
        }

        #[test]
        fn test_part_variants() {
            let (mut app, session, _) = app();
            app.handle_input("#rust", "/part").unwrap();
            app.handle_input("#rust", "/part see you").unwrap();
            app.handle_input(HOME, "/part #go bye now").unwrap();
            assert!(matches!(
                app.handle_input(HOME, "/part"),
                Err(CommandError::PartHome)
            ));
            assert_eq!(
                session.sent(),
                vec!["PART #rust :", "PART #rust :see you", "PART #go :bye now"]
            );
        }

        #[test]
        fn test_names_lists_members_with_power_levels() {
            let (mut app, session, display) = app();
            session.set_names(
                "#rust",
                vec![
                    Member {
                        power_level: "@".to_string(),
                        name: "alice".to_string(),
                    },
                    Member {
                        power_level: String::new(),
                        name: "bob".to_string(),
                    },
                ],
            );
            app.handle_input("#rust", "/names").unwrap();
            let lines = display.log().lines("#rust");
            assert_eq!(lines[0].head, "--");
            assert_eq!(lines[0].body, "\x0314Names: \x033@\x0314alice bob");
        }

        #[test]
        fn test_topic_display() {
            let (mut app, session, display) = app();
            app.handle_input("#rust", "/topic").unwrap();
            let at = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 1).unwrap();
            session.log().topics.insert(
                "#rust".to_string(),
                Topic {
                    text: "welcome".to_string(),
                    who: Some("alice".to_string()),
                    at: Some(at),
                },
            );
            app.handle_input("#rust", "/topic").unwrap();
            assert_eq!(
                display.log().bodies("#rust"),
                vec![
                    "\x0314Topic: ".to_string(),
                    "\x0314Topic (by alice, Tue Mar 5 09:07:01): welcome".to_string(),
                ]
            );
        }

        #[test]
        fn test_help_lists_described_commands() {
            let (mut app, _, display) = app();
            app.handle_input(HOME, "/help").unwrap();
            let bodies = display.log().bodies(HOME);
            assert_eq!(bodies[0], "Available commands:");
            // Nine described commands, three lines each.
            assert_eq!(bodies.len(), 1 + 9 * 3);
            assert_eq!(bodies[1], "  \x02HELP\x02 [command]");
            assert_eq!(
                bodies[2],
                "    show the list of commands, or how to use the given one"
            );
            assert_eq!(bodies[3], "");
        }

        #[test]
        fn test_help_filter() {
            let (mut app, _, display) = app();
            app.handle_input(HOME, "/help ms").unwrap();
            app.handle_input(HOME, "/help zzz").unwrap();
            let bodies = display.log().bodies(HOME);
            assert_eq!(
                bodies,
                vec![
                    "Commands that match \"MS\":",
                    "\x02MSG\x02 <target> <message>",
                    "  send a message to the given target",
                    "",
                    "Commands that match \"ZZZ\":",
                    "  no command matches \"zzz\"",
                ]
            );
        }

        #[test]
        fn test_commands_without_session_do_nothing() {
            let display = FakeDisplay::new();
            let mut app = App::new(
                &AppConfig::default(),
                Box::new(display.clone()),
                Box::new(RecordingNotifier::default()),
            );
            app.handle_input(HOME, "/join #a").unwrap();
            app.handle_input(HOME, "/msg bob hi").unwrap();
            assert!(display.log().lines(HOME).is_empty());
        }
    }
}
