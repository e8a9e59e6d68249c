use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    pub fn timestamp() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn message_text() -> Style {
        Style::default()
    }

    pub fn highlight_line() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn separator() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn buffer_normal() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn buffer_active() -> Style {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    }

    pub fn buffer_unread() -> Style {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    }

    pub fn buffer_mention() -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }

    pub fn input_prompt() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn input_text() -> Style {
        Style::default().fg(Color::White)
    }
}
