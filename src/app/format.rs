//! Turns message events into timeline lines.

use crate::app::color::{color_sequence, ident_color};
use crate::app::event::{MessageEvent, Verb};
use crate::irc::Session;
use crate::ui::{mirc_colors, Line, HOME};

/// Where a message goes and how it should be shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Formatted {
    pub buffer: String,
    pub line: Line,
    /// Run the highlight notifier for this message.
    pub notify: bool,
}

pub struct Formatter<'a> {
    pub session: &'a dyn Session,
    /// Lowercased highlight keywords. Empty means "my nickname".
    pub highlights: &'a [String],
    pub current_buffer: &'a str,
}

impl Formatter<'_> {
    pub fn is_from_self(&self, user: &str) -> bool {
        self.session.nick_cf() == self.session.casemap(user)
    }

    pub fn is_highlight(&self, content: &str) -> bool {
        if self.highlights.is_empty() {
            return self
                .session
                .casemap(content)
                .contains(self.session.nick_cf());
        }
        let lowered = content.to_lowercase();
        self.highlights.iter().any(|h| lowered.contains(h.as_str()))
    }

    pub fn format(&self, ev: &MessageEvent) -> Formatted {
        let from_self = self.is_from_self(&ev.user);
        let highlight = self.is_highlight(&ev.content);
        let is_action = ev.content.starts_with("\x01ACTION");
        let is_notice = ev.verb == Verb::Notice;
        let is_query = !ev.target_is_channel && ev.verb == Verb::Privmsg;

        let buffer = if !ev.target_is_channel && is_notice {
            self.current_buffer.to_string()
        } else if !ev.target_is_channel {
            HOME.to_string()
        } else {
            ev.target.clone()
        };

        let (head, head_color) = if from_self && is_query {
            (format!("\u{2192} {}", ev.target), ident_color(&ev.target))
        } else if is_action || is_notice {
            ("*".to_string(), mirc_colors::WHITE)
        } else {
            (ev.user.clone(), ident_color(&ev.user))
        };

        let body = ev.content.strip_suffix('\x01').unwrap_or(&ev.content);
        let nick = format!("{}{}", color_sequence(ident_color(&ev.user)), ev.user);
        let action_text = body.get(7..).unwrap_or_default();
        let body = match (is_notice, is_action) {
            (true, true) => format!("({}\x0F:{})", nick, action_text),
            (false, true) => format!("{}\x0F{}", nick, action_text),
            (true, false) => format!("({}\x0F: {})", nick, body),
            (false, false) => body.to_string(),
        };

        let line = Line::new(ev.at, head, body)
            .with_color(head_color)
            .highlighted(ev.target_is_channel && highlight && !from_self);

        Formatted {
            buffer,
            line,
            notify: (highlight || is_query) && !from_self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::FakeSession;
    use chrono::Local;

    fn message(user: &str, target: &str, verb: Verb, content: &str) -> MessageEvent {
        MessageEvent {
            user: user.to_string(),
            target: target.to_string(),
            target_is_channel: target.starts_with('#'),
            verb,
            content: content.to_string(),
            at: Local::now(),
        }
    }

    fn formatter<'a>(session: &'a FakeSession, highlights: &'a [String]) -> Formatter<'a> {
        Formatter {
            session,
            highlights,
            current_buffer: "#current",
        }
    }

    #[test]
    fn test_channel_message_mentioning_nick() {
        let session = FakeSession::new("me");
        let f = formatter(&session, &[]);
        let out = f.format(&message("bob", "#chan", Verb::Privmsg, "hey ME, look"));
        assert_eq!(out.buffer, "#chan");
        assert_eq!(out.line.head, "bob");
        assert_eq!(out.line.head_color, ident_color("bob"));
        assert_eq!(out.line.body, "hey ME, look");
        assert!(out.line.highlight);
        assert!(out.notify);
    }

    #[test]
    fn test_keywords_replace_nick_highlight() {
        let session = FakeSession::new("me");
        let keywords = vec!["rust".to_string()];
        let f = formatter(&session, &keywords);
        assert!(f.is_highlight("I like RUST"));
        assert!(!f.is_highlight("hi me"));
    }

    #[test]
    fn test_keyword_highlights_others_but_not_self() {
        let session = FakeSession::new("me");
        let keywords = vec!["rust".to_string()];
        let f = formatter(&session, &keywords);

        let out = f.format(&message("bob", "#chan", Verb::Privmsg, "RuSt is great"));
        assert!(out.line.highlight);
        assert!(out.notify);

        let out = f.format(&message("ME", "#chan", Verb::Privmsg, "RuSt is great"));
        assert!(!out.line.highlight);
        assert!(!out.notify);
    }

    #[test]
    fn test_plain_channel_message_does_not_notify() {
        let session = FakeSession::new("me");
        let keywords = vec!["rust".to_string()];
        let none: &[String] = &[];
        for highlights in [&keywords[..], none] {
            let f = formatter(&session, highlights);
            let out = f.format(&message("bob", "#chan", Verb::Privmsg, "good morning"));
            assert_eq!(out.buffer, "#chan");
            assert!(!out.line.highlight);
            assert!(!out.notify);
        }
    }

    #[test]
    fn test_private_message_goes_home_and_notifies() {
        let session = FakeSession::new("me");
        let f = formatter(&session, &[]);
        let out = f.format(&message("bob", "me", Verb::Privmsg, "psst"));
        assert_eq!(out.buffer, HOME);
        assert!(!out.line.highlight);
        assert!(out.notify);
    }

    #[test]
    fn test_private_notice_goes_to_current_buffer() {
        let session = FakeSession::new("me");
        let f = formatter(&session, &[]);
        let out = f.format(&message("NickServ", "me", Verb::Notice, "identify"));
        assert_eq!(out.buffer, "#current");
        assert_eq!(out.line.head, "*");
        assert_eq!(out.line.head_color, mirc_colors::WHITE);
        let c = color_sequence(ident_color("NickServ"));
        assert_eq!(out.line.body, format!("({}NickServ\x0F: identify)", c));
        assert!(!out.notify);
    }

    #[test]
    fn test_own_query_shows_arrow_head() {
        let session = FakeSession::new("me");
        let f = formatter(&session, &[]);
        let out = f.format(&message("Me", "bob", Verb::Privmsg, "hi me"));
        assert_eq!(out.line.head, "\u{2192} bob");
        assert_eq!(out.line.head_color, ident_color("bob"));
        assert!(!out.notify);
        assert!(!out.line.highlight);
    }

    #[test]
    fn test_actions() {
        let session = FakeSession::new("me");
        let f = formatter(&session, &[]);
        let c = color_sequence(ident_color("bob"));

        let out = f.format(&message("bob", "#chan", Verb::Privmsg, "\x01ACTION waves\x01"));
        assert_eq!(out.line.head, "*");
        assert_eq!(out.line.body, format!("{}bob\x0F waves", c));

        let out = f.format(&message("bob", "#chan", Verb::Notice, "\x01ACTION waves\x01"));
        assert_eq!(out.line.body, format!("({}bob\x0F: waves)", c));
    }
}
