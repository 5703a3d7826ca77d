//! Tag names with special meaning to the parser and the relationship queries.
//!
//! Tags not listed here are still parsed and preserved; they simply carry no
//! semantics beyond their position in the tree.

/// Relationship of a child to its mother (program-defined extension).
pub const MOTHER_RELATION: &str = "_MREL";

/// Relationship of a child to its father (program-defined extension).
pub const FATHER_RELATION: &str = "_FREL";

/// Birth event.
pub const BIRTH: &str = "BIRT";

/// Burial event.
pub const BURIAL: &str = "BURI";

/// Census event.
pub const CENSUS: &str = "CENS";

/// Change record; its `DATE` child holds the last modification date.
pub const CHANGE: &str = "CHAN";

/// Child role link inside a family.
pub const CHILD: &str = "CHIL";

/// Same-line continuation of the parent's value, joined without a separator.
pub const CONCATENATION: &str = "CONC";

/// Continuation of the parent's value after a line break.
pub const CONTINUED: &str = "CONT";

/// Date of an event.
pub const DATE: &str = "DATE";

/// Death event.
pub const DEATH: &str = "DEAT";

/// Family record.
pub const FAMILY: &str = "FAM";

/// Link from an individual to a family in which they are a child.
pub const FAMILY_CHILD: &str = "FAMC";

/// Link from an individual to a family in which they are a spouse.
pub const FAMILY_SPOUSE: &str = "FAMS";

/// File reference record.
pub const FILE: &str = "FILE";

/// Given name part of a `NAME`.
pub const GIVEN_NAME: &str = "GIVN";

/// Husband (father) role link inside a family.
pub const HUSBAND: &str = "HUSB";

/// Individual record.
pub const INDIVIDUAL: &str = "INDI";

/// Marriage event.
pub const MARRIAGE: &str = "MARR";

/// Personal name.
pub const NAME: &str = "NAME";

/// Multimedia object record.
pub const OBJECT: &str = "OBJE";

/// Occupation of an individual.
pub const OCCUPATION: &str = "OCCU";

/// Place of an event.
pub const PLACE: &str = "PLAC";

/// Privacy flag.
pub const PRIVATE: &str = "PRIV";

/// Sex of an individual.
pub const SEX: &str = "SEX";

/// Source citation.
pub const SOURCE: &str = "SOUR";

/// Surname part of a `NAME`.
pub const SURNAME: &str = "SURN";

/// Wife (mother) role link inside a family.
pub const WIFE: &str = "WIFE";

/// Value of a `_MREL`/`_FREL` qualifier marking a genetic relationship.
pub const NATURAL: &str = "Natural";

/// Returns `true` for the two tags that extend their parent's value.
#[must_use]
pub fn is_continuation(tag: &str) -> bool {
    tag == CONCATENATION || tag == CONTINUED
}
