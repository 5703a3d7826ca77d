//! Typed view of an `INDI` record and the relationship queries rooted at one.

use std::collections::{HashMap, HashSet};

use nonempty::NonEmpty;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::{
    Criteria, Element, ElementId, Family, Marriage, MemberFilter, Pointer, QueryError, Tree,
    relations::parse_year, tags,
};

/// The role an individual plays in a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyRole {
    /// Families the individual married into (`FAMS`).
    Spouse,
    /// Families the individual was born or adopted into (`FAMC`).
    Child,
}

impl FamilyRole {
    const fn tag(self) -> &'static str {
        match self {
            Self::Spouse => tags::FAMILY_SPOUSE,
            Self::Child => tags::FAMILY_CHILD,
        }
    }
}

/// Which parents to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParentFilter {
    /// Every husband and wife of every family the individual is a child of.
    #[default]
    All,
    /// Only parents whose link to the child is qualified as natural.
    Natural,
}

/// Date, place and sources of a vital event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Event<'a> {
    /// The `DATE` of the event, if recorded.
    pub date: Option<&'a str>,
    /// The `PLAC` of the event, if recorded.
    pub place: Option<&'a str>,
    /// The values of the event's `SOUR` citations.
    pub sources: Vec<&'a str>,
}

impl Event<'_> {
    /// The year of the event, taken from the last word of its date.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.date.and_then(parse_year)
    }
}

/// An `INDI` record, borrowed from its [`Tree`].
///
/// Obtained through [`Tree::individual`], which guarantees the element is an
/// individual.
#[derive(Debug, Clone, Copy)]
pub struct Individual<'a> {
    pub(crate) tree: &'a Tree,
    pub(crate) id: ElementId,
}

impl<'a> Individual<'a> {
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

    /// The pointer declared by this individual, if any.
    #[must_use]
    pub fn pointer(&self) -> Option<&'a str> {
        self.element().pointer().map(Pointer::as_str)
    }

    fn details(&self) -> impl Iterator<Item = &'a Element> + 'a {
        let tree = self.tree;
        tree.children(self.id).iter().map(move |&id| &tree[id])
    }

    fn detail_value(&self, tag: &str) -> Option<&'a str> {
        self.details()
            .find(|element| element.tag() == tag)
            .map(Element::value)
    }

    fn has_detail(&self, tag: &str) -> bool {
        self.details().any(|element| element.tag() == tag)
    }

    /// The `(given, surname)` pair of this individual.
    ///
    /// Taken from the first `NAME` whose value has the form `Given /Surname/`.
    /// A `NAME` without a value is read from its `GIVN` and `SURN` parts
    /// instead. Missing parts are empty.
    #[must_use]
    pub fn name(&self) -> (String, String) {
        let mut given = String::new();
        let mut surname = String::new();

        for name in self.details().filter(|e| e.tag() == tags::NAME) {
            if !name.value().is_empty() {
                let mut parts = name.value().split('/');
                given = parts.next().unwrap_or_default().trim().to_string();
                surname = parts.next().unwrap_or_default().trim().to_string();
                return (given, surname);
            }

            let (mut found_given, mut found_surname) = (false, false);
            for part in name.children().iter().map(|&id| &self.tree[id]) {
                match part.tag() {
                    tags::GIVEN_NAME => {
                        given = part.value().to_string();
                        found_given = true;
                    }
                    tags::SURNAME => {
                        surname = part.value().to_string();
                        found_surname = true;
                    }
                    _ => {}
                }
            }
            if found_given && found_surname {
                break;
            }
        }

        (given, surname)
    }

    /// The value of `SEX`, if recorded.
    #[must_use]
    pub fn gender(&self) -> Option<&'a str> {
        self.detail_value(tags::SEX)
    }

    /// Whether the record is flagged private (`PRIV Y`).
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.detail_value(tags::PRIVATE) == Some("Y")
    }

    /// Whether the individual is linked as a child of any family.
    #[must_use]
    pub fn is_child(&self) -> bool {
        self.has_detail(tags::FAMILY_CHILD)
    }

    /// Whether the individual has a death event.
    #[must_use]
    pub fn is_deceased(&self) -> bool {
        self.has_detail(tags::DEATH)
    }

    /// The value of `OCCU`, if recorded.
    #[must_use]
    pub fn occupation(&self) -> Option<&'a str> {
        self.detail_value(tags::OCCUPATION)
    }

    /// The date of the last change (`CHAN` / `DATE`), if recorded.
    #[must_use]
    pub fn last_change_date(&self) -> Option<&'a str> {
        let tree = self.tree;
        self.details()
            .filter(|e| e.tag() == tags::CHANGE)
            .flat_map(|change| change.children().iter().map(|&id| &tree[id]))
            .find(|e| e.tag() == tags::DATE)
            .map(Element::value)
    }

    fn event(&self, tag: &str) -> Event<'a> {
        let tree = self.tree;
        let mut event = Event::default();
        for detail in self
            .details()
            .filter(|e| e.tag() == tag)
            .flat_map(move |e| e.children().iter().map(move |&id| &tree[id]))
        {
            Self::fill_event(&mut event, detail);
        }
        event
    }

    fn fill_event(event: &mut Event<'a>, detail: &'a Element) {
        match detail.tag() {
            tags::DATE => event.date = Some(detail.value()),
            tags::PLACE => event.place = Some(detail.value()),
            tags::SOURCE => event.sources.push(detail.value()),
            _ => {}
        }
    }

    /// The birth event (`BIRT`).
    #[must_use]
    pub fn birth(&self) -> Event<'a> {
        self.event(tags::BIRTH)
    }

    /// The death event (`DEAT`).
    #[must_use]
    pub fn death(&self) -> Event<'a> {
        self.event(tags::DEATH)
    }

    /// The burial event (`BURI`).
    #[must_use]
    pub fn burial(&self) -> Event<'a> {
        self.event(tags::BURIAL)
    }

    /// Every census event (`CENS`), in file order.
    #[must_use]
    pub fn census(&self) -> Vec<Event<'a>> {
        let tree = self.tree;
        self.details()
            .filter(|e| e.tag() == tags::CENSUS)
            .map(|census| {
                let mut event = Event::default();
                for &id in census.children() {
                    Self::fill_event(&mut event, &tree[id]);
                }
                event
            })
            .collect()
    }

    /// The year of birth, if the birth date ends in a year.
    #[must_use]
    pub fn birth_year(&self) -> Option<i32> {
        self.birth().year()
    }

    /// The year of death, if the death date ends in a year.
    #[must_use]
    pub fn death_year(&self) -> Option<i32> {
        self.death().year()
    }

    /// Whether the individual was born in `year`.
    #[must_use]
    pub fn birth_year_match(&self, year: i32) -> bool {
        self.birth_year() == Some(year)
    }

    /// Whether the individual was born between `from` and `to` inclusive.
    #[must_use]
    pub fn birth_range_match(&self, from: i32, to: i32) -> bool {
        self.birth_year().is_some_and(|year| (from..=to).contains(&year))
    }

    /// Whether the individual died in `year`.
    #[must_use]
    pub fn death_year_match(&self, year: i32) -> bool {
        self.death_year() == Some(year)
    }

    /// Whether the individual died between `from` and `to` inclusive.
    #[must_use]
    pub fn death_range_match(&self, from: i32, to: i32) -> bool {
        self.death_year().is_some_and(|year| (from..=to).contains(&year))
    }

    /// Whether the given name contains `name`, ignoring case.
    #[must_use]
    pub fn given_name_match(&self, name: &str) -> bool {
        self.name().0.to_lowercase().contains(&name.to_lowercase())
    }

    /// Whether the surname contains `name`, ignoring case.
    #[must_use]
    pub fn surname_match(&self, name: &str) -> bool {
        self.name().1.to_lowercase().contains(&name.to_lowercase())
    }

    /// Whether the individual satisfies every predicate of a criteria string
    /// such as `surname=Smith:birth_range=1800-1850`.
    ///
    /// A malformed criteria string never matches.
    #[must_use]
    pub fn criteria_match(&self, criteria: &str) -> bool {
        match criteria.parse::<Criteria>() {
            Ok(criteria) => criteria.matches(self),
            Err(error) => {
                debug!(%error, "criteria rejected");
                false
            }
        }
    }

    /// The families this individual is linked to in `role`, in file order.
    ///
    /// Links that do not resolve to a family are skipped.
    #[must_use]
    pub fn families(&self, role: FamilyRole) -> Vec<Family<'a>> {
        self.details()
            .filter(|link| link.tag() == role.tag())
            .filter_map(|link| {
                let family = self.tree.resolve(link.value());
                if family.is_none() {
                    debug!(value = link.value(), "skipping dangling family link");
                }
                family
            })
            .filter_map(|id| self.tree.family(id).ok())
            .collect()
    }

    /// The parents of this individual, family by family, in file order.
    ///
    /// With [`ParentFilter::Natural`], a family contributes its `WIFE` when
    /// a `CHIL` link naming this individual carries `_MREL Natural`, and its
    /// `HUSB` when such a link carries `_FREL Natural`. Every link naming the
    /// individual is checked.
    #[must_use]
    pub fn parents(&self, filter: ParentFilter) -> Vec<ElementId> {
        let mut parents = Vec::new();

        for family in self.families(FamilyRole::Child) {
            match filter {
                ParentFilter::All => parents.extend(family.members(MemberFilter::Parents)),
                ParentFilter::Natural => {
                    let Some(pointer) = self.pointer() else {
                        continue;
                    };
                    for link in family.child_links(pointer) {
                        for &qualifier in self.tree.children(link) {
                            let qualifier = &self.tree[qualifier];
                            if qualifier.value() != tags::NATURAL {
                                continue;
                            }
                            match qualifier.tag() {
                                tags::FATHER_RELATION => {
                                    parents.extend(family.members(MemberFilter::Father));
                                }
                                tags::MOTHER_RELATION => {
                                    parents.extend(family.members(MemberFilter::Mother));
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
        }

        parents
    }

    fn parent_individuals(&self, id: ElementId, filter: ParentFilter) -> Vec<ElementId> {
        self.tree
            .individual(id)
            .map(|individual| individual.parents(filter))
            .unwrap_or_default()
            .into_iter()
            .filter(|&parent| self.tree[parent].is_individual())
            .collect()
    }

    /// Every ancestor of this individual, each listed once.
    ///
    /// The filter applies at every generation. Parents come first, followed by
    /// the ancestors of each parent in turn. Pointer cycles are cut off at the
    /// first repeated individual and the individual itself is never listed.
    #[must_use]
    #[instrument(level = "debug", skip(self), fields(id = %self.id))]
    pub fn ancestors(&self, filter: ParentFilter) -> Vec<ElementId> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::from([self.id]);

        let mut expand = |id: ElementId, ancestors: &mut Vec<ElementId>| {
            let fresh: Vec<ElementId> = self
                .parent_individuals(id, filter)
                .into_iter()
                .filter(|&parent| seen.insert(parent))
                .collect();
            ancestors.extend(&fresh);
            fresh.into_iter()
        };

        let mut stack = vec![expand(self.id, &mut ancestors)];
        while let Some(frame) = stack.last_mut() {
            if let Some(parent) = frame.next() {
                let next = expand(parent, &mut ancestors);
                stack.push(next);
            } else {
                stack.pop();
            }
        }

        ancestors
    }

    /// Finds a chain of natural parents leading from this individual to
    /// `ancestor`.
    ///
    /// The chain starts with this individual and ends with `ancestor`. Parents
    /// are tried in file order and the first chain found is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if `ancestor` is not an individual.
    #[instrument(level = "debug", skip(self), fields(id = %self.id))]
    pub fn path_to_ancestor(
        &self,
        ancestor: ElementId,
    ) -> Result<Option<NonEmpty<ElementId>>, QueryError> {
        self.tree.individual(ancestor)?;

        let mut came_from: HashMap<ElementId, ElementId> = HashMap::new();
        let mut seen = HashSet::new();
        let mut stack = vec![self.id];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }

            if id == ancestor {
                let mut path = vec![id];
                let mut current = id;
                while let Some(&previous) = came_from.get(&current) {
                    path.push(previous);
                    current = previous;
                }
                path.reverse();
                return Ok(NonEmpty::from_vec(path));
            }

            for parent in self
                .parent_individuals(id, ParentFilter::Natural)
                .into_iter()
                .rev()
            {
                if !seen.contains(&parent) {
                    came_from.insert(parent, id);
                    stack.push(parent);
                }
            }
        }

        Ok(None)
    }

    /// Every marriage of every family this individual is a spouse in.
    #[must_use]
    pub fn marriages(&self) -> Vec<Marriage<'a>> {
        self.families(FamilyRole::Spouse)
            .iter()
            .flat_map(Family::marriages)
            .collect()
    }

    /// The years of this individual's marriages.
    ///
    /// Marriages without a parseable year are skipped.
    #[must_use]
    pub fn marriage_years(&self) -> Vec<i32> {
        self.marriages().iter().filter_map(Marriage::year).collect()
    }

    /// Whether the individual married in `year`.
    #[must_use]
    pub fn marriage_year_match(&self, year: i32) -> bool {
        self.marriage_years().contains(&year)
    }

    /// Whether the individual married between `from` and `to` inclusive.
    #[must_use]
    pub fn marriage_range_match(&self, from: i32, to: i32) -> bool {
        self.marriage_years()
            .iter()
            .any(|year| (from..=to).contains(year))
    }

    fn child_individuals(&self, id: ElementId) -> Vec<ElementId> {
        let Ok(individual) = self.tree.individual(id) else {
            return Vec::new();
        };

        let mut children = Vec::new();
        for family in individual.families(FamilyRole::Spouse) {
            for child in family.members(MemberFilter::Children) {
                if self.tree[child].is_individual() && !children.contains(&child) {
                    children.push(child);
                }
            }
        }
        children
    }

    /// The children of every family this individual is a spouse in, each
    /// listed once.
    #[must_use]
    pub fn children(&self) -> Vec<ElementId> {
        self.child_individuals(self.id)
    }

    /// Every descendant of this individual, each listed once, in breadth-first
    /// order.
    #[must_use]
    #[instrument(level = "debug", skip(self), fields(id = %self.id))]
    pub fn descendants(&self) -> Vec<ElementId> {
        let mut descendants = Vec::new();
        let mut seen = HashSet::from([self.id]);
        let mut queue = std::collections::VecDeque::from([self.id]);

        while let Some(id) = queue.pop_front() {
            for child in self.child_individuals(id) {
                if seen.insert(child) {
                    descendants.push(child);
                    queue.push_back(child);
                }
            }
        }

        descendants
    }
}
