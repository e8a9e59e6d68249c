use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use std::iter::Peekable;
use std::str::Chars;

pub const WHITE: u8 = 0;
pub const GREEN: u8 = 3;
pub const RED: u8 = 4;
pub const GREY: u8 = 14;

const BOLD: char = '\x02';
const COLOR: char = '\x03';
const MONOSPACE: char = '\x11';
const RESET: char = '\x0F';
const REVERSE: char = '\x16';
const ITALIC: char = '\x1D';
const STRIKETHROUGH: char = '\x1E';
const UNDERLINE: char = '\x1F';

/// mIRC 16-color palette
const MIRC_PALETTE: [Color; 16] = [
    Color::Rgb(255, 255, 255), // 0  White
    Color::Rgb(0, 0, 0),       // 1  Black
    Color::Rgb(0, 0, 127),     // 2  Dark Blue
    Color::Rgb(0, 147, 0),     // 3  Dark Green
    Color::Rgb(255, 0, 0),     // 4  Red
    Color::Rgb(127, 0, 0),     // 5  Dark Red
    Color::Rgb(156, 0, 156),   // 6  Purple
    Color::Rgb(252, 127, 0),   // 7  Orange
    Color::Rgb(255, 255, 0),   // 8  Yellow
    Color::Rgb(0, 252, 0),     // 9  Light Green
    Color::Rgb(0, 147, 147),   // 10 Teal
    Color::Rgb(0, 255, 255),   // 11 Light Cyan
    Color::Rgb(0, 0, 252),     // 12 Light Blue
    Color::Rgb(255, 0, 255),   // 13 Pink
    Color::Rgb(127, 127, 127), // 14 Dark Gray
    Color::Rgb(210, 210, 210), // 15 Light Gray
];

/// ANSI 256 equivalents of the extended codes 16 to 98.
const MIRC_EXTENDED: [u8; 83] = [
    52, 94, 100, 58, 22, 29, 23, 24, 17, 54, 53, 89, //
    88, 130, 142, 64, 28, 35, 30, 25, 18, 91, 90, 125, //
    124, 166, 184, 106, 34, 49, 37, 33, 19, 129, 127, 161, //
    196, 208, 226, 154, 46, 86, 51, 75, 21, 171, 201, 198, //
    203, 215, 227, 191, 83, 122, 87, 111, 63, 177, 207, 205, //
    217, 223, 229, 193, 157, 158, 159, 153, 147, 183, 219, 212, //
    16, 233, 235, 237, 239, 241, 244, 247, 250, 254, 231,
];

/// Terminal color for an mIRC code. Code 99 and above means "default".
pub fn color(code: u8) -> Option<Color> {
    match code {
        0..=15 => Some(MIRC_PALETTE[code as usize]),
        16..=98 => Some(Color::Indexed(MIRC_EXTENDED[(code - 16) as usize])),
        _ => None,
    }
}

fn read_code(chars: &mut Peekable<Chars<'_>>) -> Option<u8> {
    let mut value: Option<u8> = None;
    for _ in 0..2 {
        match chars.peek().and_then(|c| c.to_digit(10)) {
            Some(d) => {
                value = Some(value.unwrap_or(0) * 10 + d as u8);
                chars.next();
            }
            None => break,
        }
    }
    value
}

/// A color sequence after `\x03`: foreground, background, and a comma that
/// turned out to be plain text.
struct ColorCodes {
    fg: Option<u8>,
    bg: Option<u8>,
    literal_comma: bool,
}

fn read_color(chars: &mut Peekable<Chars<'_>>) -> ColorCodes {
    let fg = read_code(chars);
    let mut codes = ColorCodes {
        fg,
        bg: None,
        literal_comma: false,
    };
    if fg.is_some() && chars.peek() == Some(&',') {
        chars.next();
        codes.bg = read_code(chars);
        codes.literal_comma = codes.bg.is_none();
    }
    codes
}

fn toggle(style: Style, modifier: Modifier) -> Style {
    if style.add_modifier.contains(modifier) {
        style.remove_modifier(modifier)
    } else {
        style.add_modifier(modifier)
    }
}

/// Parse mIRC-formatted text into styled spans.
pub fn parse_mirc_formatted(text: &str, base_style: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut current_style = base_style;
    let mut current_text = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let next_style = match c {
            BOLD => toggle(current_style, Modifier::BOLD),
            ITALIC => toggle(current_style, Modifier::ITALIC),
            UNDERLINE => toggle(current_style, Modifier::UNDERLINED),
            STRIKETHROUGH => toggle(current_style, Modifier::CROSSED_OUT),
            MONOSPACE => current_style,
            RESET => base_style,
            REVERSE => {
                let mut style = current_style;
                style.fg = current_style.bg.or(Some(Color::Black));
                style.bg = current_style.fg.or(Some(Color::White));
                style
            }
            COLOR => {
                let codes = read_color(&mut chars);
                let mut style = current_style;
                match codes.fg {
                    Some(fg) => {
                        style.fg = color(fg).or(base_style.fg);
                        if let Some(bg) = codes.bg {
                            style.bg = color(bg).or(base_style.bg);
                        }
                    }
                    None => {
                        style.fg = base_style.fg;
                        style.bg = base_style.bg;
                    }
                }
                if !current_text.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current_text), current_style));
                }
                current_style = style;
                if codes.literal_comma {
                    current_text.push(',');
                }
                continue;
            }
            _ => {
                current_text.push(c);
                continue;
            }
        };
        if !current_text.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current_text), current_style));
        }
        current_style = next_style;
    }

    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, current_style));
    }

    if spans.is_empty() {
        spans.push(Span::styled(String::new(), base_style));
    }

    spans
}

/// Remove every mIRC formatting sequence, keeping only the text.
pub fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            BOLD | ITALIC | UNDERLINE | STRIKETHROUGH | MONOSPACE | REVERSE | RESET => {}
            COLOR => {
                if read_color(&mut chars).literal_comma {
                    out.push(',');
                }
            }
            _ => out.push(c),
        }
    }
    out
}
