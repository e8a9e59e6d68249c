use crate::ui::buffers::BufferList;
use crate::ui::input::Editor;
use crate::ui::mirc_colors;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const PROMPT: &str = "> ";

/// Column widths taken from the configuration.
#[derive(Debug, Clone, Copy)]
pub struct Widths {
    pub nick_column: usize,
    pub chan_column: usize,
}

/// Rows available to the message area for a terminal of `height` rows.
pub fn message_rows(height: u16) -> usize {
    height.saturating_sub(2).max(1) as usize
}

fn truncate(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

fn right_align(s: &str, width: usize) -> String {
    let head = truncate(s, width);
    let pad = width.saturating_sub(head.width());
    format!("{}{}", " ".repeat(pad), head)
}

pub fn render(frame: &mut Frame, buffers: &BufferList, editor: &Editor, widths: Widths) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_messages(frame, chunks[0], buffers, widths);
    render_status(frame, chunks[1], buffers, widths);
    render_input(frame, chunks[2], editor);
}

fn render_messages(frame: &mut Frame, area: Rect, buffers: &BufferList, widths: Widths) {
    let buffer = buffers.current();
    let height = area.height as usize;
    let end = buffer.lines.len().saturating_sub(buffer.scroll);
    let start = end.saturating_sub(height);

    let lines: Vec<Line> = buffer.lines[start..end]
        .iter()
        .map(|line| {
            let base = if line.highlight {
                Theme::highlight_line()
            } else {
                Theme::message_text()
            };
            let head_style = match mirc_colors::color(line.head_color) {
                Some(c) => base.fg(c),
                None => base,
            };
            let mut spans = vec![
                Span::styled(line.at.format("%H:%M ").to_string(), Theme::timestamp()),
                Span::styled(right_align(&line.head, widths.nick_column), head_style),
                Span::styled(" ", Theme::separator()),
            ];
            spans.extend(mirc_colors::parse_mirc_formatted(&line.body, base));
            Line::from(spans)
        })
        .collect();

    // Bottom-align short timelines.
    let top = area.y + area.height.saturating_sub(lines.len() as u16);
    let area = Rect::new(area.x, top, area.width, area.bottom() - top);
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status(frame: &mut Frame, area: Rect, buffers: &BufferList, widths: Widths) {
    let mut parts: Vec<Span> = Vec::new();
    for (i, buffer) in buffers.iter().enumerate() {
        let style = if i == buffers.current_index() {
            Theme::buffer_active()
        } else if buffer.highlight {
            Theme::buffer_mention()
        } else if buffer.unread {
            Theme::buffer_unread()
        } else {
            Theme::buffer_normal()
        };
        parts.push(Span::styled(" ", Theme::status_bar()));
        parts.push(Span::styled(
            truncate(&buffer.title, widths.chan_column),
            Theme::status_bar().patch(style),
        ));
    }
    let used: usize = parts.iter().map(|s| s.content.width()).sum();
    parts.push(Span::styled(
        " ".repeat((area.width as usize).saturating_sub(used)),
        Theme::status_bar(),
    ));
    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn render_input(frame: &mut Frame, area: Rect, editor: &Editor) {
    let text = editor.text();
    let cursor = editor.cursor();
    let avail = (area.width as usize).saturating_sub(PROMPT.width() + 1);

    // Scroll the line horizontally so the cursor stays visible.
    let mut start = 0;
    let width_to = |from: usize| -> usize {
        text[from..cursor]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum()
    };
    while start < cursor && width_to(start) > avail {
        start += 1;
    }

    let visible: String = text[start..].iter().collect();
    let line = Line::from(vec![
        Span::styled(PROMPT, Theme::input_prompt()),
        Span::styled(truncate(&visible, avail + 1), Theme::input_text()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let x = area.x + (PROMPT.width() + width_to(start)) as u16;
    frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
}
