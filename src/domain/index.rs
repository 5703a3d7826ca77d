use std::collections::HashMap;

use crate::domain::{ElementId, Pointer, Tree};

/// Derived lookups over a [`Tree`], rebuilt on demand after invalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Index {
    /// Every element except the root, in file (pre-order) order.
    pub(crate) list: Vec<ElementId>,

    /// Logical records keyed by the pointer they declare.
    pub(crate) by_pointer: HashMap<Pointer, ElementId>,
}

impl Index {
    pub(crate) fn build(tree: &Tree) -> Self {
        let list: Vec<ElementId> = tree.descendants(ElementId::ROOT).skip(1).collect();

        // Later declarations of the same pointer shadow earlier ones.
        let by_pointer = tree
            .records()
            .iter()
            .filter_map(|&id| tree.get(id)?.pointer().map(|p| (p.clone(), id)))
            .collect();

        tracing::trace!(
            elements = list.len(),
            "rebuilt element index"
        );

        Self { list, by_pointer }
    }
}
