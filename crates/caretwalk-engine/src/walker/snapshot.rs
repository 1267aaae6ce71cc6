//! Document-order snapshot used to recover a walker whose anchor node was
//! removed from the tree.

use std::collections::HashMap;
use std::hash::Hash;

use crate::tree::{DocumentTree, descendants};

/// Where a lost anchor was re-homed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovered<N> {
    /// The nearest surviving text node after the lost one
    After(N),
    /// The nearest surviving text node before it, used when nothing follows
    Before(N),
}

/// The container's nodes in document order, as they were when the walker
/// last (re)initialised, plus the reverse lookup from handle to slot.
#[derive(Debug, Clone)]
pub struct RecoverySnapshot<N> {
    order: Vec<N>,
    index: HashMap<N, usize>,
}

impl<N: Copy + Eq + Hash> RecoverySnapshot<N> {
    pub fn take<T: DocumentTree<Node = N>>(tree: &T, container: N) -> Self {
        let order: Vec<N> = descendants(tree, container).collect();
        let index = order.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        Self { order, index }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, node: N) -> bool {
        self.index.contains_key(&node)
    }

    /// Find the live text node that should take over from `lost`.
    ///
    /// Successors win over predecessors. `None` when `lost` was never part of
    /// the snapshot or nothing around it survived.
    pub fn recover<T: DocumentTree<Node = N>>(
        &self,
        tree: &T,
        container: N,
        lost: N,
    ) -> Option<Recovered<N>> {
        let &slot = self.index.get(&lost)?;
        let usable = |n: &&N| tree.is_inclusive_ancestor(container, **n) && tree.text_len(**n) > 0;

        if let Some(&after) = self.order[slot + 1..].iter().find(usable) {
            return Some(Recovered::After(after));
        }
        self.order[..slot]
            .iter()
            .rev()
            .find(usable)
            .map(|&before| Recovered::Before(before))
    }
}
