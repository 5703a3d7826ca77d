//! Reading and writing GEDCOM text.
//!
//! Parsing turns bytes or text into a [`Tree`](crate::Tree); writing turns a
//! tree back into the exact text it was read from.

pub mod line;
pub use line::Line;

mod parser;
pub use parser::{
    ParseError, Parser, Violation, parse_bytes, parse_file, parse_reader, parse_str,
};

mod reader;
mod writer;
