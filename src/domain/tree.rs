//! In-memory element tree.
//!
//! The [`Tree`] knows nothing about files or byte streams. It owns every
//! element in an arena addressed by [`ElementId`]; the virtual root lives at
//! [`ElementId::ROOT`] and owns the logical records as its children.

use std::{collections::HashMap, ops, sync::OnceLock};

use tracing::instrument;

use crate::domain::{
    Element, ElementId, LineTerminator, Pointer, element::ROOT_LEVEL, index::Index, tags,
};

/// Default bound on the length of one physical line, in characters.
pub const DEFAULT_LINE_LIMIT: usize = 255;

/// A parsed GEDCOM document.
///
/// Elements are stored as an arena:
/// - Nodes: `Vec<Option<Element>>` (a slot becomes `None` once its element is
///   removed from the tree)
/// - Hierarchy: each element owns the ids of its children and keeps the id of
///   its parent
/// - Lookups: a lazily built index with the pre-order element list and the
///   pointer map
///
/// Every mutation that changes the shape of the tree resets the index, so the
/// next read rebuilds it. Mutating an element through [`Tree::get_mut`] never
/// changes the shape and leaves the index intact.
///
/// Slots of removed elements are never reused, so an [`ElementId`] never comes
/// to name a different element. The arena therefore grows with every element
/// ever created: re-encoding a multi-line value over and over leaves one dead
/// slot per discarded `CONC`/`CONT` line.
#[derive(Debug, Clone)]
pub struct Tree {
    elements: Vec<Option<Element>>,

    /// Number of live elements, excluding the root.
    live: usize,

    /// Cached lookups; an empty cell is the dirty flag.
    cache: OnceLock<Index>,

    /// Upper bound on a physical line when encoding multi-line values.
    line_limit: usize,

    /// Whether the source started with a UTF-8 byte order mark.
    byte_order_mark: bool,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates an empty tree holding only the virtual root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_line_limit(DEFAULT_LINE_LIMIT)
    }

    /// Creates an empty tree that bounds encoded lines to `line_limit`
    /// characters.
    #[must_use]
    pub fn with_line_limit(line_limit: usize) -> Self {
        Self {
            elements: vec![Some(Element::root())],
            live: 0,
            cache: OnceLock::new(),
            line_limit,
            byte_order_mark: false,
        }
    }

    /// The id of the virtual root.
    #[must_use]
    pub const fn root(&self) -> ElementId {
        ElementId::ROOT
    }

    /// The logical (level 0) records, in file order.
    #[must_use]
    pub fn records(&self) -> &[ElementId] {
        self.children(ElementId::ROOT)
    }

    /// Retrieves an element, if it is still part of the tree.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)?.as_ref()
    }

    /// Retrieves an element for editing its value.
    ///
    /// Structural changes go through [`Tree::create_child`] and
    /// [`Tree::remove_child`] instead.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)?.as_mut()
    }

    /// The children of an element, or an empty slice if the element is gone.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        match self.get(id) {
            Some(element) => &element.children,
            None => &[],
        }
    }

    /// The parent of an element; `None` for the root or a removed element.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.parent()
    }

    /// Number of live elements, excluding the root.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether the tree holds no element besides the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// The configured bound on a physical line.
    #[must_use]
    pub const fn line_limit(&self) -> usize {
        self.line_limit
    }

    /// Whether the tree was read from a source that began with a byte order
    /// mark. Writers reproduce it.
    #[must_use]
    pub const fn has_byte_order_mark(&self) -> bool {
        self.byte_order_mark
    }

    /// Sets whether writers emit a byte order mark.
    pub const fn set_byte_order_mark(&mut self, value: bool) {
        self.byte_order_mark = value;
    }

    /// Walks the subtree rooted at `id` in pre-order, starting with `id`.
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Descendants<'_> {
        let stack = if self.get(id).is_some() {
            vec![id]
        } else {
            Vec::new()
        };
        Descendants { tree: self, stack }
    }

    /// Every element except the root, in the order it appeared in the file.
    #[must_use]
    pub fn element_list(&self) -> &[ElementId] {
        &self.cache().list
    }

    /// Logical records keyed by the pointer they declare.
    #[must_use]
    pub fn element_map(&self) -> &HashMap<Pointer, ElementId> {
        &self.cache().by_pointer
    }

    /// Looks up the logical record that declares `pointer`.
    ///
    /// Accepts any string so that a role link's value can be resolved
    /// directly; values that are not declared pointers resolve to `None`.
    #[must_use]
    pub fn resolve(&self, pointer: &str) -> Option<ElementId> {
        self.element_map().get(pointer).copied()
    }

    /// Drops the cached element list and pointer map.
    ///
    /// Structural mutations through this type already do this. Any other code
    /// path that changes the tree's shape must call it before reading the
    /// caches again; reads in between observe stale data.
    pub fn invalidate_cache(&mut self) {
        self.cache = OnceLock::new();
    }

    fn cache(&self) -> &Index {
        self.cache.get_or_init(|| Index::build(self))
    }

    /// Attaches an already-built element as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not part of the tree.
    pub(crate) fn push_child(&mut self, parent: ElementId, mut element: Element) -> ElementId {
        let id = ElementId(self.elements.len());
        element.parent = Some(parent);
        self.elements.push(Some(element));
        self.element_mut(parent).children.push(id);
        self.live += 1;
        self.invalidate_cache();
        id
    }

    /// Creates a new child element at the end of `parent`'s children.
    ///
    /// The child's level is one deeper than its parent and it inherits the
    /// parent's terminator. The value is encoded with
    /// [`Tree::set_multi_line_value`], so long or multi-line values produce
    /// continuation children.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not part of the tree.
    pub fn create_child(
        &mut self,
        parent: ElementId,
        tag: &str,
        pointer: Option<Pointer>,
        value: &str,
    ) -> ElementId {
        let (level, terminator) = {
            let parent = self.element(parent);
            (parent.level + 1, parent.terminator)
        };

        let element = Element::new(level, pointer, tag.to_string(), String::new(), terminator);
        let id = self.push_child(parent, element);
        self.set_multi_line_value(id, value);
        id
    }

    /// Removes `child` (and with it all of its descendants) from `parent`.
    ///
    /// Returns `true` if `child` was a child of `parent` and was removed.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        let Some(position) = self
            .get(parent)
            .and_then(|p| p.children.iter().position(|&c| c == child))
        else {
            return false;
        };

        self.element_mut(parent).children.remove(position);

        let mut stack = vec![child];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.elements.get_mut(id.0).and_then(Option::take) {
                self.live -= 1;
                stack.extend(removed.children);
            }
        }

        self.invalidate_cache();
        true
    }

    /// Returns the value of an element including its `CONC` and `CONT`
    /// children.
    ///
    /// `CONC` values are appended directly; `CONT` values are appended after
    /// that child's own terminator.
    #[must_use]
    pub fn multi_line_value(&self, id: ElementId) -> String {
        let Some(element) = self.get(id) else {
            return String::new();
        };

        let mut result = element.value.clone();
        for child in element.children.iter().filter_map(|&c| self.get(c)) {
            match child.tag.as_str() {
                tags::CONCATENATION => result.push_str(&child.value),
                tags::CONTINUED => {
                    result.push_str(child.terminator.as_str());
                    result.push_str(&child.value);
                }
                _ => {}
            }
        }
        result
    }

    /// Sets the value of an element, adding `CONC` and `CONT` children as
    /// needed.
    ///
    /// Existing `CONC`/`CONT` children are discarded first. Each line break
    /// in `value` starts a `CONT` child that records the break as its
    /// terminator; any part of a line that does not fit within the line limit
    /// overflows into `CONC` children. Splits avoid leaving trailing spaces at
    /// the end of a physical line where possible.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not part of the tree.
    #[instrument(level = "trace", skip(self, value))]
    pub fn set_multi_line_value(&mut self, id: ElementId, value: &str) {
        self.element_mut(id).value.clear();

        let continuation: Vec<ElementId> = self
            .children(id)
            .iter()
            .copied()
            .filter(|&c| self.get(c).is_some_and(|e| tags::is_continuation(&e.tag)))
            .collect();
        for child in continuation {
            self.remove_child(id, child);
        }

        let mut segments = split_line_breaks(value).into_iter();
        let Some((first, _)) = segments.next() else {
            return;
        };

        let taken = self.set_bounded_value(id, first);
        self.add_concatenation(id, skip_chars(first, taken));

        for (line, line_break) in segments {
            let child = self.create_bare_child(id, tags::CONTINUED, line_break);
            let taken = self.set_bounded_value(child, line);
            self.add_concatenation(id, skip_chars(line, taken));
        }
    }

    /// Formats an element, and optionally its whole subtree in pre-order,
    /// exactly as it would appear in a file.
    #[must_use]
    pub fn to_gedcom_string(&self, id: ElementId, recursive: bool) -> String {
        if recursive {
            self.descendants(id)
                .filter_map(|d| self.get(d))
                .map(Element::to_gedcom_line)
                .collect()
        } else {
            self.get(id).map(Element::to_gedcom_line).unwrap_or_default()
        }
    }
}

impl Tree {
    fn element(&self, id: ElementId) -> &Element {
        self.get(id)
            .unwrap_or_else(|| panic!("element {id} is not part of the tree"))
    }

    fn element_mut(&mut self, id: ElementId) -> &mut Element {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("element {id} is not part of the tree"))
    }

    fn create_bare_child(
        &mut self,
        parent: ElementId,
        tag: &str,
        terminator: LineTerminator,
    ) -> ElementId {
        let level = self.element(parent).level + 1;
        let element = Element::new(level, None, tag.to_string(), String::new(), terminator);
        self.push_child(parent, element)
    }

    /// Characters left on the element's line for a value, accounting for the
    /// space that separates the value from the tag.
    fn available_characters(&self, id: ElementId) -> usize {
        let element = self.element(id);
        if element.level == ROOT_LEVEL {
            return self.line_limit;
        }
        self.line_limit.saturating_sub(element.line_length() + 1)
    }

    /// Stores as much of `line` as fits on the element's own line and returns
    /// the number of characters taken.
    fn set_bounded_value(&mut self, id: ElementId, line: &str) -> usize {
        let taken = bounded_length(line, self.available_characters(id));
        let head = take_chars(line, taken).to_string();
        self.element_mut(id).value = head;
        taken
    }

    fn add_concatenation(&mut self, id: ElementId, mut rest: &str) {
        let terminator = self.element(id).terminator;
        while !rest.is_empty() {
            let child = self.create_bare_child(id, tags::CONCATENATION, terminator);
            // A line too short to hold even its own header still makes progress.
            let taken = self.set_bounded_value(child, rest).max(1);
            if taken > self.element(child).value.chars().count() {
                self.element_mut(child).value = take_chars(rest, taken).to_string();
            }
            rest = skip_chars(rest, taken);
        }
    }
}

impl ops::Index<ElementId> for Tree {
    type Output = Element;

    /// # Panics
    ///
    /// Panics if the element is not part of the tree.
    fn index(&self, id: ElementId) -> &Self::Output {
        self.element(id)
    }
}

/// Pre-order iterator over a subtree, returned by [`Tree::descendants`].
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<ElementId>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Number of leading characters of `line` that go on a line with `available`
/// characters of room.
///
/// A line that needs splitting is cut before any run of spaces that would
/// otherwise end it. If the room holds nothing but spaces, the cut is made at
/// the bound.
fn bounded_length(line: &str, available: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= available {
        return chars.len();
    }

    let spaces = chars[..available]
        .iter()
        .rev()
        .take_while(|&&c| c == ' ')
        .count();

    if spaces == available {
        available
    } else {
        available - spaces
    }
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

fn take_chars(s: &str, chars: usize) -> &str {
    &s[..byte_offset(s, chars)]
}

fn skip_chars(s: &str, chars: usize) -> &str {
    &s[byte_offset(s, chars)..]
}

/// Splits `value` at `\r\n`, `\r` and `\n`.
///
/// Each segment is paired with the break that preceded it; the first
/// segment's break is meaningless and reported as `\n`. A trailing break
/// yields a trailing empty segment so that no break is lost.
fn split_line_breaks(value: &str) -> Vec<(&str, LineTerminator)> {
    let mut segments = Vec::new();
    let mut previous = LineTerminator::Lf;
    let mut start = 0;
    let bytes = value.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let line_break = match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => Some(LineTerminator::CrLf),
            b'\r' => Some(LineTerminator::Cr),
            b'\n' => Some(LineTerminator::Lf),
            _ => None,
        };

        if let Some(line_break) = line_break {
            segments.push((&value[start..i], previous));
            i += line_break.as_str().len();
            start = i;
            previous = line_break;
        } else {
            i += 1;
        }
    }

    segments.push((&value[start..], previous));
    segments
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    fn tree_with_note() -> (Tree, ElementId) {
        let mut tree = Tree::new();
        let record = tree.create_child(
            ElementId::ROOT,
            "INDI",
            Some(Pointer::try_from("@I1@").unwrap()),
            "",
        );
        let note = tree.create_child(record, "NOTE", None, "");
        (tree, note)
    }

    #[test]
    fn tree_can_be_shared_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tree>();
    }

    #[test]
    fn new_tree_is_empty() {
        let tree = Tree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.element_list().is_empty());
        assert_eq!(tree.to_gedcom_string(tree.root(), true), "");
    }

    #[test]
    fn created_children_are_one_level_deeper() {
        let (tree, note) = tree_with_note();
        let record = tree.parent(note).unwrap();

        assert_eq!(tree[record].level(), 0);
        assert_eq!(tree[note].level(), 1);
        assert_eq!(tree.parent(record), Some(ElementId::ROOT));
    }

    #[test]
    fn index_tracks_structural_changes() {
        let (mut tree, note) = tree_with_note();
        assert_eq!(tree.element_list().len(), 2);
        assert_eq!(tree.resolve("@I1@"), tree.records().first().copied());

        let record = tree.records()[0];
        assert!(tree.remove_child(record, note));
        assert_eq!(tree.element_list(), &[record]);
        assert!(tree.get(note).is_none());

        assert!(tree.remove_child(ElementId::ROOT, record));
        assert!(tree.element_list().is_empty());
        assert_eq!(tree.resolve("@I1@"), None);
    }

    #[test]
    fn re_encoding_keeps_the_live_count() {
        let (mut tree, note) = tree_with_note();
        for _ in 0..3 {
            tree.set_multi_line_value(note, "a\nb\nc");
            assert_eq!(tree.len(), 4);
        }

        // Removed slots stay empty rather than being handed out again.
        let stale = tree.children(note)[0];
        tree.set_multi_line_value(note, "d");
        assert_eq!(tree.len(), 2);
        assert!(tree.get(stale).is_none());
        assert_eq!(tree.len(), tree.element_list().len());
    }

    #[test]
    fn removing_a_non_child_is_a_no_op() {
        let (mut tree, note) = tree_with_note();
        assert!(!tree.remove_child(ElementId::ROOT, note));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn recomputing_the_index_is_idempotent() {
        let (mut tree, _) = tree_with_note();

        tree.invalidate_cache();
        let first = (tree.element_list().to_vec(), tree.element_map().clone());
        tree.invalidate_cache();
        let second = (tree.element_list().to_vec(), tree.element_map().clone());

        assert_eq!(first, second);
    }

    #[test]
    fn short_value_stays_on_one_line() {
        let (mut tree, note) = tree_with_note();
        tree.set_multi_line_value(note, "hello world");

        assert_eq!(tree[note].value(), "hello world");
        assert!(tree.children(note).is_empty());
    }

    #[test]
    fn line_breaks_become_continuations() {
        let (mut tree, note) = tree_with_note();
        tree.set_multi_line_value(note, "first\nsecond\n");

        assert_eq!(
            tree.to_gedcom_string(note, true),
            "1 NOTE first\n2 CONT second\n2 CONT\n"
        );
        assert_eq!(tree.multi_line_value(note), "first\nsecond\n");
    }

    #[test]
    fn long_value_overflows_into_concatenations() {
        let (mut tree, note) = tree_with_note();
        let value = "x".repeat(600);
        tree.set_multi_line_value(note, &value);

        for id in tree.descendants(note) {
            assert!(tree[id].line_length() <= DEFAULT_LINE_LIMIT);
        }
        assert!(
            tree.children(note)
                .iter()
                .all(|&c| tree[c].tag() == tags::CONCATENATION)
        );
        assert_eq!(tree.multi_line_value(note), value);
    }

    #[test]
    fn split_avoids_trailing_spaces() {
        let mut tree = Tree::with_line_limit(20);
        let note = tree.create_child(ElementId::ROOT, "NOTE", None, "");
        // "0 NOTE " leaves 13 characters for the value.
        tree.set_multi_line_value(note, "abcdefghij   klmnop");

        assert_eq!(tree[note].value(), "abcdefghij");
        assert_eq!(tree.multi_line_value(note), "abcdefghij   klmnop");
    }

    #[test]
    fn resetting_a_value_replaces_old_continuations() {
        let (mut tree, note) = tree_with_note();
        tree.create_child(note, "SOUR", None, "@S1@");
        tree.set_multi_line_value(note, "a\nb\nc");
        tree.set_multi_line_value(note, "d");

        assert_eq!(tree.children(note).len(), 1);
        assert_eq!(tree.multi_line_value(note), "d");
    }

    #[test_case("a\r\nb"; "crlf")]
    #[test_case("a\rb"; "cr")]
    #[test_case("\n\n"; "only breaks")]
    #[test_case(""; "empty")]
    fn mixed_line_breaks_round_trip(value: &str) {
        let (mut tree, note) = tree_with_note();
        tree.set_multi_line_value(note, value);
        assert_eq!(tree.multi_line_value(note), value);
    }

    #[test]
    fn bounded_length_cuts_at_bound_when_only_spaces() {
        assert_eq!(bounded_length("     abc", 3), 3);
        assert_eq!(bounded_length("ab  cd", 4), 2);
        assert_eq!(bounded_length("abc", 5), 3);
    }

    proptest! {
        #[test]
        fn multi_line_values_round_trip(
            value in "([a-z ]{0,40}|[A-Z]{200,400}|\n|\r\n|é){0,12}"
        ) {
            let (mut tree, note) = tree_with_note();
            tree.set_multi_line_value(note, &value);
            prop_assert_eq!(tree.multi_line_value(note), value);
        }
    }
}
