//! A single node of the element tree.
//!
//! Elements live in the arena owned by [`Tree`](crate::Tree) and refer to each
//! other by [`ElementId`]. The parent owns the ordered list of its children;
//! the back-reference from child to parent is a plain id and never implies
//! ownership.

use std::fmt;

use serde::Serialize;

use crate::domain::{Pointer, tags};

/// Level of the virtual root element.
pub const ROOT_LEVEL: i32 = -1;

/// Compact element identifier (index into the tree's arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    /// The id of the virtual root of every tree.
    pub const ROOT: Self = Self(0);

    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The record variant of an element, decided once from its tag when the
/// element is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// The virtual root.
    Root,
    /// An `INDI` element.
    Individual,
    /// A `FAM` element.
    Family,
    /// A `FILE` element.
    File,
    /// An `OBJE` element.
    Object,
    /// Any other element.
    Other,
}

impl RecordKind {
    /// Chooses the variant for a newly created element.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            tags::INDIVIDUAL => Self::Individual,
            tags::FAMILY => Self::Family,
            tags::FILE => Self::File,
            tags::OBJECT => Self::Object,
            _ => Self::Other,
        }
    }
}

/// The line terminator captured from a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LineTerminator {
    /// `\n`
    #[default]
    Lf,
    /// `\r`
    Cr,
    /// `\r\n`
    CrLf,
}

impl LineTerminator {
    /// Returns the terminator matching `s` exactly, if any.
    #[must_use]
    pub fn from_str_exact(s: &str) -> Option<Self> {
        match s {
            "\n" => Some(Self::Lf),
            "\r" => Some(Self::Cr),
            "\r\n" => Some(Self::CrLf),
            _ => None,
        }
    }

    /// Returns the terminator characters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Cr => "\r",
            Self::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for LineTerminator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a GEDCOM document, placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) level: i32,
    pub(crate) pointer: Option<Pointer>,
    pub(crate) tag: String,
    pub(crate) value: String,
    pub(crate) terminator: LineTerminator,
    pub(crate) kind: RecordKind,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
}

impl Element {
    pub(crate) fn new(
        level: i32,
        pointer: Option<Pointer>,
        tag: String,
        value: String,
        terminator: LineTerminator,
    ) -> Self {
        let kind = RecordKind::from_tag(&tag);
        Self {
            level,
            pointer,
            tag,
            value,
            terminator,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn root() -> Self {
        Self {
            level: ROOT_LEVEL,
            pointer: None,
            tag: String::new(),
            value: String::new(),
            terminator: LineTerminator::Lf,
            kind: RecordKind::Root,
            parent: None,
            children: Vec::new(),
        }
    }

    /// The depth of this element; `-1` for the virtual root.
    #[must_use]
    pub const fn level(&self) -> i32 {
        self.level
    }

    /// The pointer declared on this line, if any.
    #[must_use]
    pub const fn pointer(&self) -> Option<&Pointer> {
        self.pointer.as_ref()
    }

    /// The tag of this line.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The literal value of this line, without any continuation lines.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The terminator this line was read with.
    #[must_use]
    pub const fn terminator(&self) -> LineTerminator {
        self.terminator
    }

    /// The record variant chosen when this element was created.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The parent of this element; `None` only for the virtual root.
    #[must_use]
    pub const fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// The children of this element in file order.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Whether this element is an `INDI` record.
    #[must_use]
    pub fn is_individual(&self) -> bool {
        self.kind == RecordKind::Individual
    }

    /// Whether this element is a `FAM` record.
    #[must_use]
    pub fn is_family(&self) -> bool {
        self.kind == RecordKind::Family
    }

    /// Whether this element is a `FILE` record.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == RecordKind::File
    }

    /// Whether this element is an `OBJE` record.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.kind == RecordKind::Object
    }

    /// Sets the literal value of this line only.
    ///
    /// Existing continuation children are left untouched; use
    /// [`Tree::set_multi_line_value`](crate::Tree::set_multi_line_value) to
    /// re-encode a value that may need them.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Formats this single line exactly as it would appear in a file.
    ///
    /// The virtual root formats to the empty string.
    #[must_use]
    pub fn to_gedcom_line(&self) -> String {
        self.to_string()
    }

    /// Number of characters in the formatted line, excluding the terminator.
    pub(crate) fn line_length(&self) -> usize {
        self.to_string()
            .trim_end_matches(['\r', '\n'])
            .chars()
            .count()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.level < 0 {
            return Ok(());
        }

        write!(f, "{}", self.level)?;
        if let Some(pointer) = &self.pointer {
            write!(f, " {pointer}")?;
        }
        write!(f, " {}", self.tag)?;
        if !self.value.is_empty() {
            write!(f, " {}", self.value)?;
        }
        f.write_str(self.terminator.as_str())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn element(level: i32, pointer: Option<&str>, tag: &str, value: &str) -> Element {
        Element::new(
            level,
            pointer.map(|p| Pointer::try_from(p).unwrap()),
            tag.to_string(),
            value.to_string(),
            LineTerminator::Lf,
        )
    }

    #[test]
    fn root_formats_to_empty_string() {
        assert_eq!(Element::root().to_gedcom_line(), "");
    }

    #[test]
    fn formats_pointer_and_value() {
        let e = element(0, Some("@I1@"), "INDI", "");
        assert_eq!(e.to_gedcom_line(), "0 @I1@ INDI\n");

        let e = element(1, None, "NAME", "John /Doe/");
        assert_eq!(e.to_gedcom_line(), "1 NAME John /Doe/\n");
    }

    #[test]
    fn keeps_terminator() {
        let mut e = element(2, None, "DATE", "1 JAN 1900");
        e.terminator = LineTerminator::CrLf;
        assert_eq!(e.to_gedcom_line(), "2 DATE 1 JAN 1900\r\n");
    }

    #[test_case("INDI", RecordKind::Individual)]
    #[test_case("FAM", RecordKind::Family)]
    #[test_case("FILE", RecordKind::File)]
    #[test_case("OBJE", RecordKind::Object)]
    #[test_case("NOTE", RecordKind::Other)]
    fn kind_is_chosen_from_tag(tag: &str, expected: RecordKind) {
        assert_eq!(element(0, None, tag, "").kind(), expected);
    }
}
