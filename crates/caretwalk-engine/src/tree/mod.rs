//! # Tree Access
//!
//! The engine never owns the document tree. Hosts expose their tree through
//! [`DocumentTree`], a read-only capability over opaque node handles, and the
//! walker stores nothing but those handles.
//!
//! ## Document Order
//!
//! Navigation follows a depth-first order over every node below a
//! *container*: a structural node's first child comes next, otherwise the
//! next sibling of the nearest ancestor that has one. The container itself is
//! never yielded; reaching it means there are no more nodes in that
//! direction.
//!
//! ```text
//! <div>abc<b>def</b>ghi</div>
//!
//! order:  "abc" → <b> → "def" → "ghi"
//! ```

use std::fmt::Debug;
use std::hash::Hash;

/// The two shapes a node can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Ordered children, no intrinsic text
    Structural,
    /// A leaf carrying a string value
    Text,
}

/// Read access to a live document tree.
///
/// Every method must reflect the tree at call time. Handles to nodes that no
/// longer exist answer `None` everywhere.
pub trait DocumentTree {
    /// Opaque node handle.
    type Node: Copy + Eq + Hash + Debug;

    fn kind(&self, node: Self::Node) -> Option<NodeKind>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// The string value of a text node, `None` for structural or stale nodes.
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// Length of a text node in characters. Zero for structural nodes.
    fn text_len(&self, node: Self::Node) -> usize {
        self.text(node).map_or(0, |text| text.chars().count())
    }

    fn is_text(&self, node: Self::Node) -> bool {
        self.kind(node) == Some(NodeKind::Text)
    }

    /// True when `node` is `ancestor` or sits somewhere below it.
    fn is_inclusive_ancestor(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        if self.kind(node).is_none() {
            return false;
        }
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

/// The node after `node` in document order, or `None` once the walk would
/// leave `container`.
///
/// # Panics
///
/// Panics if `node` is not rooted under `container`. That only happens when a
/// caller keeps navigating after a mutation without refreshing.
pub fn next_in_order<T: DocumentTree>(
    tree: &T,
    container: T::Node,
    node: T::Node,
) -> Option<T::Node> {
    if tree.kind(node) == Some(NodeKind::Structural)
        && let Some(child) = tree.first_child(node)
    {
        return Some(child);
    }

    let mut n = node;
    loop {
        if n == container {
            return None;
        }
        if let Some(sibling) = tree.next_sibling(n) {
            return Some(sibling);
        }
        n = match tree.parent(n) {
            Some(parent) => parent,
            None => panic!("{node:?} is not inside container {container:?}"),
        };
    }
}

/// The node before `node` in document order: the deepest last descendant of
/// the previous sibling, or the parent. `None` once the walk would reach
/// `container`.
///
/// # Panics
///
/// Panics if `node` is not rooted under `container`.
pub fn previous_in_order<T: DocumentTree>(
    tree: &T,
    container: T::Node,
    node: T::Node,
) -> Option<T::Node> {
    if node == container {
        return None;
    }

    if let Some(sibling) = tree.previous_sibling(node) {
        let mut n = sibling;
        while tree.kind(n) == Some(NodeKind::Structural) {
            match tree.last_child(n) {
                Some(child) => n = child,
                None => break,
            }
        }
        return Some(n);
    }

    match tree.parent(node) {
        Some(parent) if parent == container => None,
        Some(parent) => Some(parent),
        None => panic!("{node:?} is not inside container {container:?}"),
    }
}

/// Iterates every node below `container` in document order.
pub fn descendants<T: DocumentTree>(tree: &T, container: T::Node) -> Descendants<'_, T> {
    Descendants {
        tree,
        container,
        next: next_in_order(tree, container, container),
    }
}

pub struct Descendants<'a, T: DocumentTree> {
    tree: &'a T,
    container: T::Node,
    next: Option<T::Node>,
}

impl<T: DocumentTree> Iterator for Descendants<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = next_in_order(self.tree, self.container, current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_markup;
    use pretty_assertions::assert_eq;

    fn labels(dom: &crate::dom::Dom, nodes: impl Iterator<Item = crate::dom::NodeId>) -> Vec<String> {
        nodes
            .map(|n| match dom.text(n) {
                Some(text) => format!("{text:?}"),
                None => format!("<{}>", dom.tag(n).unwrap_or("?")),
            })
            .collect()
    }

    #[test]
    fn document_order_visits_children_before_siblings() {
        let (dom, div) = parse_markup("<div>abc<b>def</b>ghi</div>").unwrap();
        assert_eq!(
            labels(&dom, descendants(&dom, div)),
            vec!["\"abc\"", "<b>", "\"def\"", "\"ghi\""]
        );
    }

    #[test]
    fn previous_in_order_mirrors_next() {
        let (dom, div) = parse_markup("<div>abc<b>def<i>x</i></b>ghi</div>").unwrap();
        let forward: Vec<_> = descendants(&dom, div).collect();

        let mut backward = Vec::new();
        let mut node = *forward.last().unwrap();
        backward.push(node);
        while let Some(prev) = previous_in_order(&dom, div, node) {
            backward.push(prev);
            node = prev;
        }
        backward.reverse();

        assert_eq!(forward, backward);
    }

    #[test]
    fn empty_container_has_no_descendants() {
        let (dom, div) = parse_markup("<div></div>").unwrap();
        assert_eq!(next_in_order(&dom, div, div), None);
        assert_eq!(previous_in_order(&dom, div, div), None);
    }

    #[test]
    fn walk_never_climbs_above_container() {
        let (dom, root) = parse_markup("<p>one</p><p>two</p>").unwrap();
        let first_p = dom.first_child(root).unwrap();
        let one = dom.first_child(first_p).unwrap();

        assert_eq!(next_in_order(&dom, first_p, one), None);
        assert_eq!(previous_in_order(&dom, first_p, one), None);
    }

    #[test]
    #[should_panic(expected = "is not inside container")]
    fn detached_node_fails_fast() {
        let (mut dom, div) = parse_markup("<div><p>x</p></div>").unwrap();
        let stray = dom.create_text("loose");
        next_in_order(&dom, div, stray);
    }

    #[test]
    fn inclusive_ancestor_checks_parent_chain() {
        let (dom, div) = parse_markup("<div>abc<b>def</b></div>").unwrap();
        let b = dom.last_child(div).unwrap();
        let def = dom.first_child(b).unwrap();

        assert!(dom.is_inclusive_ancestor(div, def));
        assert!(dom.is_inclusive_ancestor(def, def));
        assert!(!dom.is_inclusive_ancestor(def, div));
    }
}
