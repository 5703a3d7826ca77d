//! Entry points for the relationship queries and whole-tree consistency
//! checks.

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::domain::{ElementId, Family, Individual, ParentFilter, Tree, tags};

/// Errors raised when a query is given the wrong kind of element.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The element exists but is not an `INDI` record.
    #[error("element {0} is not an individual")]
    NotAnIndividual(ElementId),

    /// The element exists but is not a `FAM` record.
    #[error("element {0} is not a family")]
    NotAFamily(ElementId),

    /// The element is not part of the tree.
    #[error("element {0} is not part of the tree")]
    UnknownElement(ElementId),
}

/// A role link whose pointer is not declared by any record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    /// The record holding the link.
    pub record: ElementId,
    /// The tag of the link (`FAMS`, `FAMC`, `HUSB`, `WIFE` or `CHIL`).
    pub tag: String,
    /// The unresolved value.
    pub target: String,
}

/// The year of a date, taken from its last whitespace-separated word.
pub(crate) fn parse_year(date: &str) -> Option<i32> {
    date.split_whitespace().last()?.parse().ok()
}

const ROLE_LINKS: [&str; 5] = [
    tags::FAMILY_SPOUSE,
    tags::FAMILY_CHILD,
    tags::HUSBAND,
    tags::WIFE,
    tags::CHILD,
];

impl Tree {
    /// Views an element as an individual.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not part of the tree or is not an
    /// `INDI` record.
    pub fn individual(&self, id: ElementId) -> Result<Individual<'_>, QueryError> {
        let element = self.get(id).ok_or(QueryError::UnknownElement(id))?;
        if element.is_individual() {
            Ok(Individual { tree: self, id })
        } else {
            Err(QueryError::NotAnIndividual(id))
        }
    }

    /// Views an element as a family.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not part of the tree or is not a
    /// `FAM` record.
    pub fn family(&self, id: ElementId) -> Result<Family<'_>, QueryError> {
        let element = self.get(id).ok_or(QueryError::UnknownElement(id))?;
        if element.is_family() {
            Ok(Family { tree: self, id })
        } else {
            Err(QueryError::NotAFamily(id))
        }
    }

    /// Every individual record, in file order.
    pub fn individuals(&self) -> impl Iterator<Item = Individual<'_>> + '_ {
        self.records()
            .iter()
            .filter_map(|&id| self.individual(id).ok())
    }

    /// Every family record, in file order.
    pub fn families(&self) -> impl Iterator<Item = Family<'_>> + '_ {
        self.records().iter().filter_map(|&id| self.family(id).ok())
    }

    /// Role links on logical records that point at undeclared records.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        for &record in self.records() {
            for link in self.children(record).iter().map(|&id| &self[id]) {
                if ROLE_LINKS.contains(&link.tag()) && self.resolve(link.value()).is_none() {
                    dangling.push(DanglingReference {
                        record,
                        tag: link.tag().to_string(),
                        target: link.value().to_string(),
                    });
                }
            }
        }

        dangling
    }

    /// Sets of individuals that are their own ancestors.
    ///
    /// Each set is a strongly connected component of the graph linking every
    /// individual to all of its parents. Sets and their members are sorted.
    #[must_use]
    #[instrument(level = "debug", skip(self))]
    pub fn pedigree_cycles(&self) -> Vec<Vec<ElementId>> {
        let mut graph = DiGraphMap::<ElementId, ()>::new();
        for individual in self.individuals() {
            graph.add_node(individual.id());
            for parent in individual.parents(ParentFilter::All) {
                if self[parent].is_individual() {
                    graph.add_edge(individual.id(), parent, ());
                }
            }
        }

        let mut cycles = Vec::new();
        for mut component in tarjan_scc(&graph) {
            if component.len() > 1 {
                component.sort();
                cycles.push(component);
                continue;
            }

            let Some(&node) = component.first() else {
                continue;
            };

            if graph.contains_edge(node, node) {
                cycles.push(vec![node]);
            }
        }

        cycles.sort();
        cycles
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::{
        domain::MemberFilter,
        storage::parse_str,
    };

    const CYCLE: &str = "\
0 @A@ INDI
1 FAMC @FB@
1 FAMS @FA@
0 @B@ INDI
1 FAMC @FC@
1 FAMS @FB@
0 @C@ INDI
1 FAMC @FA@
1 FAMS @FC@
0 @D@ INDI
1 FAMC @FX@
0 @FA@ FAM
1 HUSB @A@
1 CHIL @C@
2 _FREL Natural
0 @FB@ FAM
1 HUSB @B@
1 CHIL @A@
2 _FREL Natural
0 @FC@ FAM
1 HUSB @C@
1 CHIL @B@
2 _FREL Natural
";

    #[test_case("12 JUN 1901", Some(1901); "full date")]
    #[test_case("1901", Some(1901); "year only")]
    #[test_case("ABT 1901", Some(1901); "qualified")]
    #[test_case("1901 BC", None; "trailing word")]
    #[test_case("", None; "empty")]
    fn year_is_last_word(date: &str, expected: Option<i32>) {
        assert_eq!(parse_year(date), expected);
    }

    #[test]
    fn wrong_variant_is_an_error() {
        let tree = parse_str(CYCLE).unwrap();
        let person = tree.resolve("@A@").unwrap();
        let family = tree.resolve("@FA@").unwrap();

        assert_eq!(
            tree.family(person).unwrap_err(),
            QueryError::NotAFamily(person)
        );
        assert_eq!(
            tree.individual(family).unwrap_err(),
            QueryError::NotAnIndividual(family)
        );
        assert!(matches!(
            tree.individual(ElementId(999)),
            Err(QueryError::UnknownElement(_))
        ));
    }

    #[test]
    fn ancestors_terminate_on_cycles() {
        let tree = parse_str(CYCLE).unwrap();
        let a = tree.resolve("@A@").unwrap();
        let b = tree.resolve("@B@").unwrap();
        let c = tree.resolve("@C@").unwrap();

        let ancestors = tree.individual(a).unwrap().ancestors(ParentFilter::Natural);
        assert_eq!(ancestors, vec![b, c]);

        assert_eq!(tree.individual(a).unwrap().descendants(), vec![c, b]);
        assert_eq!(
            tree.individual(a).unwrap().path_to_ancestor(c).unwrap().map(|p| p.len()),
            Some(3)
        );
    }

    #[test]
    fn cycles_are_reported() {
        let tree = parse_str(CYCLE).unwrap();
        let mut expected = vec![
            tree.resolve("@A@").unwrap(),
            tree.resolve("@B@").unwrap(),
            tree.resolve("@C@").unwrap(),
        ];
        expected.sort();

        assert_eq!(tree.pedigree_cycles(), vec![expected]);
    }

    #[test]
    fn dangling_links_are_listed() {
        let tree = parse_str(CYCLE).unwrap();
        let d = tree.resolve("@D@").unwrap();

        assert_eq!(
            tree.dangling_references(),
            vec![DanglingReference {
                record: d,
                tag: "FAMC".to_string(),
                target: "@FX@".to_string(),
            }]
        );
    }

    #[test]
    fn record_iterators_filter_by_kind() {
        let tree = parse_str(CYCLE).unwrap();

        assert_eq!(tree.individuals().count(), 4);
        assert_eq!(tree.families().count(), 3);
        assert!(
            tree.families()
                .all(|family| family.members(MemberFilter::Father).len() == 1)
        );
    }
}
