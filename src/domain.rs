//! Domain models for GEDCOM documents.
//!
//! This module contains the element tree, the pointer and tag vocabulary, the
//! typed record handles used by the relationship queries, and configuration.

mod config;
pub use config::Config;

/// Criteria strings for filtering individuals.
pub mod criteria;
pub use criteria::{Criteria, CriteriaError, Criterion};

pub(crate) mod element;
pub use element::{Element, ElementId, LineTerminator, RecordKind, ROOT_LEVEL};

mod family;
pub use family::{Family, Marriage, MemberFilter};

mod index;

mod individual;
pub use individual::{Event, FamilyRole, Individual, ParentFilter};

/// Cross-reference identifiers.
pub mod pointer;
pub use pointer::{InvalidPointerError, Pointer};

mod relations;
pub use relations::{DanglingReference, QueryError};

pub mod tags;

mod tree;
pub use tree::{DEFAULT_LINE_LIMIT, Descendants, Tree};
