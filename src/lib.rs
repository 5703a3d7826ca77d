//! GEDCOM genealogy files as an element tree
//!
//! A GEDCOM file is parsed line by line into a [`Tree`] of [`Element`]s
//! nested by level. The tree answers genealogical questions through typed
//! [`Individual`] and [`Family`] handles and can be written back unchanged.
//!
//! ```
//! use gedcom::{ParentFilter, parse_str};
//!
//! let tree = parse_str(
//!     "0 @I1@ INDI\n1 FAMC @F1@\n0 @I2@ INDI\n0 @F1@ FAM\n1 HUSB @I2@\n1 CHIL @I1@\n",
//! )?;
//! let child = tree.individual(tree.resolve("@I1@").unwrap())?;
//! assert_eq!(child.parents(ParentFilter::All), tree.resolve("@I2@").into_iter().collect::<Vec<_>>());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod domain;
pub use domain::{
    Config, Criteria, Element, ElementId, Event, Family, FamilyRole, Individual, LineTerminator,
    Marriage, MemberFilter, ParentFilter, Pointer, QueryError, RecordKind, Tree,
};

pub mod storage;
pub use storage::{ParseError, Parser, parse_bytes, parse_file, parse_reader, parse_str};
