//! Builds a [`Tree`] from GEDCOM text.

use std::{fs, io::Read, path::Path};

use tracing::{debug, instrument, warn};

use crate::{
    domain::{Config, Element, ElementId, Tree, tags},
    storage::{
        line::{self, Line},
        reader,
    },
};

/// Errors that can occur while parsing a GEDCOM document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A line breaks the line format.
    #[error("line {line} violates the GEDCOM line format: {violation}")]
    FormatViolation {
        /// The 1-based number of the offending line.
        line: usize,
        /// What is wrong with it.
        violation: Violation,
    },

    /// The source is not valid UTF-8.
    #[error("line {line} is not valid UTF-8")]
    Encoding {
        /// The 1-based number of the offending line.
        line: usize,
    },

    /// The source could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The ways in which a line can break the format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// The line does not follow `level [pointer] tag [value]` with a
    /// terminator.
    #[error("expected 'level [pointer] tag [value]' followed by a line break")]
    Unrecognized,

    /// The level is more than one deeper than the previous line's.
    #[error("level {found} is more than one deeper than the previous level {previous}")]
    LevelJump {
        /// Level of the previous line.
        previous: i32,
        /// Level of the offending line.
        found: i32,
    },
}

/// Parses GEDCOM documents according to a [`Config`].
///
/// In strict mode the first malformed line aborts the parse. Otherwise every
/// input produces a best-effort tree:
/// - a well-formed line missing its terminator is taken as ending in `\n`
/// - any other unrecognised line continues the previous element's value
/// - a level jump of more than one is clamped to one deeper than the previous
///   line
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: Config,
}

impl Parser {
    /// Creates a parser with the given configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration used by this parser.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Parses a document held in a string.
    ///
    /// A leading byte order mark is stripped and recorded on the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::FormatViolation`] in strict mode if a line
    /// breaks the format.
    #[instrument(level = "debug", skip_all, fields(bytes = text.len()))]
    pub fn parse_str(&self, text: &str) -> Result<Tree, ParseError> {
        self.parse_lines(reader::lines(text))
    }

    /// Parses a UTF-8 encoded document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Encoding`] in strict mode if the bytes are not
    /// valid UTF-8, and [`ParseError::FormatViolation`] in strict mode if a
    /// line breaks the format.
    #[instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Tree, ParseError> {
        let source = reader::decode(bytes, self.config.strict)?;
        let mut tree = self.parse_lines(reader::lines(&source.text))?;
        if source.byte_order_mark {
            tree.set_byte_order_mark(true);
        }
        Ok(tree)
    }

    /// Reads a document from `reader` to the end and parses it.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if reading fails, otherwise as
    /// [`Parser::parse_bytes`].
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Tree, ParseError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.parse_bytes(&bytes)
    }

    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if the file cannot be read, otherwise as
    /// [`Parser::parse_bytes`].
    #[instrument(level = "debug", skip(self))]
    pub fn parse_file(&self, path: &Path) -> Result<Tree, ParseError> {
        let bytes = fs::read(path)?;
        self.parse_bytes(&bytes)
    }

    /// Builds a tree from lines that are already split, each including its
    /// terminator.
    ///
    /// A byte order mark at the start of the first line is stripped and
    /// recorded on the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::FormatViolation`] in strict mode if a line
    /// breaks the format.
    pub fn parse_lines<'l, I>(&self, lines: I) -> Result<Tree, ParseError>
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut builder = Builder {
            tree: Tree::with_line_limit(self.config.line_limit()),
            last: ElementId::ROOT,
            strict: self.config.strict,
        };

        for (index, mut text) in lines.into_iter().enumerate() {
            if index == 0 {
                if let Some(rest) = text.strip_prefix('\u{feff}') {
                    builder.tree.set_byte_order_mark(true);
                    text = rest;
                }
            }
            builder.push(index + 1, text)?;
        }

        debug!(elements = builder.tree.len(), "parsed document");
        Ok(builder.tree)
    }
}

/// Parses a document held in a string with the default (strict)
/// configuration.
///
/// # Errors
///
/// Returns [`ParseError::FormatViolation`] if a line breaks the format.
pub fn parse_str(text: &str) -> Result<Tree, ParseError> {
    Parser::default().parse_str(text)
}

/// Parses a UTF-8 encoded document with the default (strict) configuration.
///
/// # Errors
///
/// As [`Parser::parse_bytes`].
pub fn parse_bytes(bytes: &[u8]) -> Result<Tree, ParseError> {
    Parser::default().parse_bytes(bytes)
}

/// Reads and parses a document with the default (strict) configuration.
///
/// # Errors
///
/// As [`Parser::parse_reader`].
pub fn parse_reader<R: Read>(reader: R) -> Result<Tree, ParseError> {
    Parser::default().parse_reader(reader)
}

/// Reads and parses the document at `path` with the default (strict)
/// configuration.
///
/// # Errors
///
/// As [`Parser::parse_file`].
pub fn parse_file(path: &Path) -> Result<Tree, ParseError> {
    Parser::default().parse_file(path)
}

/// Cursor state while the tree is being built.
struct Builder {
    tree: Tree,
    last: ElementId,
    strict: bool,
}

impl Builder {
    fn push(&mut self, number: usize, text: &str) -> Result<(), ParseError> {
        let mut line = self.recognize(number, text)?;

        let previous = self.tree[self.last].level();
        if line.level > previous + 1 {
            if self.strict {
                return Err(ParseError::FormatViolation {
                    line: number,
                    violation: Violation::LevelJump {
                        previous,
                        found: line.level,
                    },
                });
            }
            warn!(
                line = number,
                found = line.level,
                clamped = previous + 1,
                "clamping level jump"
            );
            line.level = previous + 1;
        }

        let mut parent = self.last;
        while self.tree[parent].level() > line.level - 1 {
            parent = self.tree.parent(parent).unwrap_or(ElementId::ROOT);
        }

        let element = Element::new(
            line.level,
            line.pointer,
            line.tag,
            line.value,
            line.terminator,
        );
        self.last = self.tree.push_child(parent, element);
        Ok(())
    }

    fn recognize(&self, number: usize, text: &str) -> Result<Line, ParseError> {
        if let Some(line) = line::recognize(text) {
            return Ok(line);
        }

        if self.strict {
            return Err(ParseError::FormatViolation {
                line: number,
                violation: Violation::Unrecognized,
            });
        }

        let (content, terminator) = line::split_terminator(text);
        if let Some(line) = line::recognize_unterminated(content) {
            debug!(line = number, "line without terminator");
            return Ok(line);
        }

        // Anything else continues the previous element's value.
        let previous = &self.tree[self.last];
        let (level, tag) = if tags::is_continuation(previous.tag()) {
            (previous.level(), previous.tag().to_string())
        } else {
            (previous.level() + 1, tags::CONCATENATION.to_string())
        };
        warn!(line = number, %tag, "treating unrecognised line as continuation");

        Ok(Line {
            level,
            pointer: None,
            tag,
            value: content.to_string(),
            terminator: terminator.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn lenient() -> Parser {
        Parser::new(Config::lenient())
    }

    fn levels(tree: &Tree) -> Vec<i32> {
        tree.element_list()
            .iter()
            .map(|&id| tree[id].level())
            .collect()
    }

    #[test]
    fn builds_hierarchy_from_levels() {
        let tree = parse_str("0 A\n1 B\n2 C\n1 D\n0 E\n").unwrap();

        assert_eq!(levels(&tree), vec![0, 1, 2, 1, 0]);
        let records = tree.records();
        assert_eq!(records.len(), 2);

        let a = records[0];
        let b = tree.children(a)[0];
        let d = tree.children(a)[1];
        assert_eq!(tree[d].tag(), "D");
        assert_eq!(tree.parent(d), Some(a));
        assert_eq!(tree.children(b).len(), 1);
    }

    #[test]
    fn every_level_is_one_below_its_parent() {
        let tree = parse_str("0 A\n1 B\n2 C\n3 D\n1 E\n2 F\n0 G\n1 H\n").unwrap();

        for &id in tree.element_list() {
            let parent = tree.parent(id).unwrap();
            assert_eq!(tree[id].level(), tree[parent].level() + 1);
        }
    }

    #[test]
    fn level_jump_is_a_violation_when_strict() {
        let error = parse_str("0 A\n2 B\n").unwrap_err();
        assert!(matches!(
            error,
            ParseError::FormatViolation {
                line: 2,
                violation: Violation::LevelJump {
                    previous: 0,
                    found: 2
                },
            }
        ));
    }

    #[test]
    fn level_jump_is_clamped_when_lenient() {
        let tree = lenient().parse_str("0 A\n2 B\n").unwrap();
        assert_eq!(levels(&tree), vec![0, 1]);
        assert_eq!(tree.to_gedcom_string(tree.root(), true), "0 A\n1 B\n");
    }

    #[test_case("0 HEAD\nnot a line\n", 2; "garbage")]
    #[test_case("0 HEAD\n0 TRLR", 2; "missing final terminator")]
    #[test_case("\n0 HEAD\n", 1; "empty line")]
    fn strict_rejects_with_line_number(text: &str, expected: usize) {
        let error = parse_str(text).unwrap_err();
        assert!(matches!(
            error,
            ParseError::FormatViolation { line, violation: Violation::Unrecognized } if line == expected
        ));
    }

    #[test]
    fn lenient_accepts_missing_final_terminator() {
        let tree = lenient().parse_str("0 HEAD\n0 TRLR").unwrap();
        let trailer = tree.records()[1];
        assert_eq!(tree[trailer].to_gedcom_line(), "0 TRLR\n");
    }

    #[test]
    fn lenient_folds_fragments_into_continuations() {
        let text = "0 @N1@ NOTE first\nsecond\r\n1 CONT third\nfourth\n";
        let tree = lenient().parse_str(text).unwrap();
        let note = tree.records()[0];

        let children: Vec<_> = tree
            .children(note)
            .iter()
            .map(|&id| (tree[id].tag(), tree[id].value()))
            .collect();
        assert_eq!(
            children,
            vec![("CONC", "second"), ("CONT", "third"), ("CONT", "fourth")]
        );
        assert_eq!(tree.multi_line_value(note), "firstsecond\nthird\nfourth");
    }

    #[test]
    fn records_are_indexed_by_pointer() {
        let tree = parse_str("0 @I1@ INDI\n1 NAME A\n0 @F1@ FAM\n0 TRLR\n").unwrap();

        assert_eq!(tree.element_map().len(), 2);
        assert!(tree[tree.resolve("@I1@").unwrap()].is_individual());
        assert!(tree[tree.resolve("@F1@").unwrap()].is_family());
        assert_eq!(tree.resolve("@X@"), None);
    }

    #[test]
    fn tree_uses_configured_line_limit() {
        let mut config = Config::default();
        config.set_line_limit(40);
        let tree = Parser::new(config).parse_str("0 HEAD\n").unwrap();
        assert_eq!(tree.line_limit(), 40);
    }

    #[test]
    fn pre_split_lines_lose_their_byte_order_mark() {
        let tree = Parser::default()
            .parse_lines(["\u{feff}0 HEAD\n", "0 TRLR\n"])
            .unwrap();

        assert!(tree.has_byte_order_mark());
        assert_eq!(tree.records().len(), 2);
        assert_eq!(tree[tree.records()[0]].tag(), "HEAD");
    }

    #[test]
    fn string_input_keeps_its_byte_order_mark_on_the_tree() {
        let tree = parse_str("\u{feff}0 HEAD\n").unwrap();
        assert!(tree.has_byte_order_mark());
        assert!(!parse_str("0 HEAD\n").unwrap().has_byte_order_mark());
    }

    #[test]
    fn pre_split_lines() {
        let tree = Parser::default()
            .parse_lines(["0 HEAD\r\n", "1 CHAR UTF-8\r\n"])
            .unwrap();
        assert_eq!(
            tree.to_gedcom_string(tree.root(), true),
            "0 HEAD\r\n1 CHAR UTF-8\r\n"
        );
    }
}
