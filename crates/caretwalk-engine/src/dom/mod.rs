//! # Reference Arena Tree
//!
//! [`Dom`] is a small mutable tree of element and text nodes stored in a
//! [`slab::Slab`]. It implements [`DocumentTree`] so the walker can navigate
//! it, and exposes the mutation API a host editor would use.
//!
//! ## Stable Handles
//!
//! Slab keys are recycled once a node is removed. A [`NodeId`] therefore
//! carries the generation stamp its node was created with, and every lookup
//! checks it: a handle to a removed node stays dead even after its slot is
//! reused. This is what lets the walker recover from removals by looking
//! handles up in its snapshot instead of cloning the tree.

pub mod markup;

use slab::Slab;

use crate::tree::{DocumentTree, NodeKind};

pub use markup::{MarkupError, parse_markup};

/// Generation-checked handle to a node in a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    key: usize,
    generation: u64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Node {0:?} no longer exists")]
    StaleNode(NodeId),
    #[error("Node {0:?} is a text node and cannot have children")]
    NotAnElement(NodeId),
    #[error("Node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("Node {reference:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, reference: NodeId },
    #[error("Inserting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone)]
enum NodeData {
    Element { tag: String, children: Vec<NodeId> },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    generation: u64,
    parent: Option<NodeId>,
    data: NodeData,
}

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Slab<Node>,
    next_generation: u64,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a tree holding only an empty `#document` root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Slab::new(),
            next_generation: 0,
            root: NodeId {
                key: 0,
                generation: 0,
            },
        };
        dom.root = dom.insert(NodeData::Element {
            tag: "#document".to_string(),
            children: Vec::new(),
        });
        dom
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert(NodeData::Element {
            tag: tag.to_string(),
            children: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.insert(NodeData::Text(text.to_string()))
    }

    fn insert(&mut self, data: NodeData) -> NodeId {
        let generation = self.next_generation;
        self.next_generation += 1;
        let key = self.nodes.insert(Node {
            generation,
            parent: None,
            data,
        });
        NodeId { key, generation }
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.key)
            .filter(|node| node.generation == id.generation)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.key)
            .filter(|node| node.generation == id.generation)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Tag name of an element, `None` for text or stale nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id).map(|node| &node.data) {
            Some(NodeData::Element { children, .. }) => children.as_slice(),
            _ => &[],
        }
    }

    /// Concatenated text of every text node in the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|node| &node.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element { children, .. }) => {
                for &child in children {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let index = self.children(parent).len();
        self.insert_at(parent, child, index)
    }

    /// Insert `child` into `parent` right before `reference`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        let index = self.child_index(parent, reference)?;
        self.insert_at(parent, child, index)
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Result<usize, DomError> {
        self.children(parent)
            .iter()
            .position(|&c| c == child)
            .ok_or(DomError::NotAChild {
                parent,
                reference: child,
            })
    }

    fn insert_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<(), DomError> {
        match self.get(parent).map(|node| &node.data) {
            None => return Err(DomError::StaleNode(parent)),
            Some(NodeData::Text(_)) => return Err(DomError::NotAnElement(parent)),
            Some(NodeData::Element { .. }) => {}
        }
        if !self.contains(child) {
            return Err(DomError::StaleNode(child));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }

        // Re-parenting within the same parent shifts the target slot.
        let mut index = index;
        if let Some(old_parent) = self.get(child).and_then(|node| node.parent) {
            let old_index = self.child_index(old_parent, child)?;
            if old_parent == parent && old_index < index {
                index -= 1;
            }
            self.detach(child);
        }

        if let Some(Node {
            data: NodeData::Element { children, .. },
            ..
        }) = self.get_mut(parent)
        {
            children.insert(index, child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(|node| node.parent) else {
            return;
        };
        if let Some(Node {
            data: NodeData::Element { children, .. },
            ..
        }) = self.get_mut(parent)
        {
            children.retain(|&c| c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Detach `id` and free it together with its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if !self.contains(id) {
            return Err(DomError::StaleNode(id));
        }
        self.detach(id);

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            pending.extend_from_slice(self.children(next));
            self.nodes.remove(next.key);
        }
        Ok(())
    }

    /// Replace the value of a text node.
    pub fn set_text(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        match self.get_mut(id) {
            Some(Node {
                data: NodeData::Text(text),
                ..
            }) => {
                *text = value.to_string();
                Ok(())
            }
            Some(_) => Err(DomError::NotText(id)),
            None => Err(DomError::StaleNode(id)),
        }
    }

    fn sibling(&self, id: NodeId, step: isize) -> Option<NodeId> {
        let parent = self.get(id)?.parent?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        let target = index.checked_add_signed(step)?;
        siblings.get(target).copied()
    }
}

impl DocumentTree for Dom {
    type Node = NodeId;

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.get(node).map(|n| match n.data {
            NodeData::Element { .. } => NodeKind::Structural,
            NodeData::Text(_) => NodeKind::Text,
        })
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling(node, 1)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling(node, -1)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.get(node)?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }
}
