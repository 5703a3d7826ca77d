//! Colour and width of the attached terminal

use owo_colors::{OwoColorize, Style, colors::css};

/// Whether stdout accepts ANSI colours
pub fn supports_color() -> bool {
    supports_color::on_cached(supports_color::Stream::Stdout).is_some()
}

/// Width of the terminal in columns, if stdout is one
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

fn styled(text: &str, style: Style) -> String {
    if supports_color() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Styles for the parts of a GEDCOM listing
pub trait Colorize {
    /// A pointer such as `@I1@` (blue)
    fn pointer(&self) -> String;
    /// A tag such as `INDI` (bold)
    fn tag(&self) -> String;
    /// A passed check (green)
    fn success(&self) -> String;
    /// A failed check (amber)
    fn warning(&self) -> String;
    /// Secondary information
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn pointer(&self) -> String {
        styled(self, Style::new().fg::<css::LightBlue>())
    }

    fn tag(&self) -> String {
        styled(self, Style::new().bold())
    }

    fn success(&self) -> String {
        styled(self, Style::new().fg::<css::Green>())
    }

    fn warning(&self) -> String {
        styled(self, Style::new().fg::<css::Orange>())
    }

    fn dim(&self) -> String {
        styled(self, Style::new().dimmed())
    }
}
