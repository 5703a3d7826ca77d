//! Typed view of a `FAM` record.

use serde::Serialize;
use tracing::debug;

use crate::domain::{Element, ElementId, Tree, tags};

/// Which members of a family to return from [`Family::members`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemberFilter {
    /// Husband, wife and children.
    #[default]
    All,
    /// Husband and wife.
    Parents,
    /// The husband (`HUSB`).
    Father,
    /// The wife (`WIFE`).
    Mother,
    /// The children (`CHIL`).
    Children,
}

impl MemberFilter {
    fn accepts(self, tag: &str) -> bool {
        match self {
            Self::All => matches!(tag, tags::HUSBAND | tags::WIFE | tags::CHILD),
            Self::Parents => matches!(tag, tags::HUSBAND | tags::WIFE),
            Self::Father => tag == tags::HUSBAND,
            Self::Mother => tag == tags::WIFE,
            Self::Children => tag == tags::CHILD,
        }
    }
}

/// A marriage event recorded on a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marriage<'a> {
    /// The `DATE` of the marriage, if recorded.
    pub date: Option<&'a str>,
    /// The `PLAC` of the marriage, if recorded.
    pub place: Option<&'a str>,
}

impl Marriage<'_> {
    /// The year of the marriage, taken from the last word of its date.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.date.and_then(super::relations::parse_year)
    }
}

/// A `FAM` record, borrowed from its [`Tree`].
///
/// Obtained through [`Tree::family`], which guarantees the element is a
/// family.
#[derive(Debug, Clone, Copy)]
pub struct Family<'a> {
    pub(crate) tree: &'a Tree,
    pub(crate) id: ElementId,
}

impl<'a> Family<'a> {
    /// The id of the underlying element.
    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// The underlying element.
    #[must_use]
    pub fn element(&self) -> &'a Element {
        &self.tree[self.id]
    }

    /// Resolves the family's role links accepted by `filter`, in file order.
    ///
    /// Links whose pointer is not declared anywhere in the tree are skipped.
    #[must_use]
    pub fn members(&self, filter: MemberFilter) -> Vec<ElementId> {
        self.tree
            .children(self.id)
            .iter()
            .filter_map(|&id| self.tree.get(id))
            .filter(|link| filter.accepts(link.tag()))
            .filter_map(|link| {
                let resolved = self.tree.resolve(link.value());
                if resolved.is_none() {
                    debug!(tag = link.tag(), value = link.value(), "skipping dangling reference");
                }
                resolved
            })
            .collect()
    }

    /// Every `CHIL` link that names `pointer`, in file order.
    pub(crate) fn child_links(&self, pointer: &str) -> Vec<ElementId> {
        self.tree
            .children(self.id)
            .iter()
            .copied()
            .filter(|&id| {
                let link = &self.tree[id];
                link.tag() == tags::CHILD && link.value() == pointer
            })
            .collect()
    }

    /// Every `MARR` event of this family.
    #[must_use]
    pub fn marriages(&self) -> Vec<Marriage<'a>> {
        let tree = self.tree;
        tree.children(self.id)
            .iter()
            .map(|&id| &tree[id])
            .filter(|element| element.tag() == tags::MARRIAGE)
            .map(|marriage| {
                let mut event = Marriage {
                    date: None,
                    place: None,
                };
                for detail in marriage.children().iter().map(|&id| &tree[id]) {
                    match detail.tag() {
                        tags::DATE => event.date = Some(detail.value()),
                        tags::PLACE => event.place = Some(detail.value()),
                        _ => {}
                    }
                }
                event
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::storage::parse_str;

    const FAMILY: &str = "\
0 @I1@ INDI
0 @I2@ INDI
0 @I3@ INDI
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 CHIL @I3@
1 CHIL @I9@
1 MARR
2 DATE 12 JUN 1901
2 PLAC Leeds
";

    #[test_case(MemberFilter::All, &["@I1@", "@I2@", "@I3@"]; "all")]
    #[test_case(MemberFilter::Parents, &["@I1@", "@I2@"]; "parents")]
    #[test_case(MemberFilter::Father, &["@I1@"]; "father")]
    #[test_case(MemberFilter::Mother, &["@I2@"]; "mother")]
    #[test_case(MemberFilter::Children, &["@I3@"]; "children skip dangling")]
    fn members_by_filter(filter: MemberFilter, expected: &[&str]) {
        let tree = parse_str(FAMILY).unwrap();
        let family = tree.family(tree.resolve("@F1@").unwrap()).unwrap();

        let members: Vec<_> = family
            .members(filter)
            .into_iter()
            .map(|id| tree[id].pointer().unwrap().to_string())
            .collect();

        assert_eq!(members, expected);
    }

    #[test]
    fn marriage_details() {
        let tree = parse_str(FAMILY).unwrap();
        let family = tree.family(tree.resolve("@F1@").unwrap()).unwrap();

        let marriages = family.marriages();
        assert_eq!(
            marriages,
            vec![Marriage {
                date: Some("12 JUN 1901"),
                place: Some("Leeds"),
            }]
        );
        assert_eq!(marriages[0].year(), Some(1901));
    }
}
