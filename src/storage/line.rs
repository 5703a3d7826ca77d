//! Recognition of single GEDCOM lines.
//!
//! A well-formed line reads `level SP [pointer SP] tag [SP value] terminator`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::{LineTerminator, Pointer};

static STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*) (@[^@]+@ |)([A-Za-z0-9_]+)( [^\n\r]*|)(\r\n|\r|\n)$")
        .expect("strict line grammar is a valid regex")
});

static UNTERMINATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*) (@[^@]+@ |)([A-Za-z0-9_]+)( [^\n\r]*|)$")
        .expect("unterminated line grammar is a valid regex")
});

/// The parts of one recognised line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Depth of the element.
    pub level: i32,
    /// The declared pointer, if any.
    pub pointer: Option<Pointer>,
    /// The tag.
    pub tag: String,
    /// Everything after the space that follows the tag.
    pub value: String,
    /// The terminator the line ended with.
    pub terminator: LineTerminator,
}

impl Line {
    fn from_captures(captures: &Captures, terminator: LineTerminator) -> Option<Self> {
        let level = captures[1].parse().ok()?;
        let pointer = captures[2].trim_end_matches(' ');
        let pointer = if pointer.is_empty() {
            None
        } else {
            Some(Pointer::try_from(pointer).ok()?)
        };
        let value = captures[4].strip_prefix(' ').unwrap_or_default();

        Some(Self {
            level,
            pointer,
            tag: captures[3].to_string(),
            value: value.to_string(),
            terminator,
        })
    }
}

/// Recognises a complete line, terminator included.
///
/// Returns `None` if the line does not follow the grammar, or if its level
/// does not fit in an `i32`.
#[must_use]
pub fn recognize(text: &str) -> Option<Line> {
    let captures = STRICT.captures(text)?;
    let terminator = LineTerminator::from_str_exact(&captures[5])?;
    Line::from_captures(&captures, terminator)
}

/// Recognises a line that follows the grammar but lacks a terminator.
///
/// The terminator of the returned line is `\n`.
#[must_use]
pub fn recognize_unterminated(text: &str) -> Option<Line> {
    let captures = UNTERMINATED.captures(text)?;
    Line::from_captures(&captures, LineTerminator::Lf)
}

/// Splits a raw line into its content and terminator.
pub(crate) fn split_terminator(text: &str) -> (&str, Option<LineTerminator>) {
    for terminator in [LineTerminator::CrLf, LineTerminator::Lf, LineTerminator::Cr] {
        if let Some(content) = text.strip_suffix(terminator.as_str()) {
            return (content, Some(terminator));
        }
    }
    (text, None)
}
