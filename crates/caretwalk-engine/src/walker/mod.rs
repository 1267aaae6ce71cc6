//! # Position Walker
//!
//! [`PositionWalker`] tracks one logical caret position inside a container:
//! a node plus a character offset into that node's text. It can step by
//! character in either direction, report whether it sits at either end of the
//! content, produce ranges for geometric probing, and recover after the tree
//! was mutated underneath it.
//!
//! ## Landing Positions
//!
//! Only non-empty text nodes are landing nodes. Structural nodes (and empty
//! text nodes) are walked through but never stopped in, so stepping across
//! `<div>abc<b>def</b>ghi</div>` visits:
//!
//! ```text
//! (abc,0) (abc,1) (abc,2) (def,0) (def,1) (def,2) (ghi,0) (ghi,1) (ghi,2) (ghi,3)
//! ```
//!
//! A node boundary is represented by offset 0 of the following node. The only
//! position with `offset == length` is the very end of the content.
//!
//! ## Mutation
//!
//! The walker does not observe the tree. After every mutation the caller must
//! call [`PositionWalker::refresh`] before navigating again; stepping from a
//! node that is no longer under the container panics.

pub mod snapshot;

use std::fmt::Debug;
use std::hash::Hash;

use crate::tree::{DocumentTree, descendants, next_in_order, previous_in_order};
use snapshot::{Recovered, RecoverySnapshot};

/// A caret location: a node and a character offset into its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position<N> {
    pub node: N,
    pub offset: usize,
}

/// A span between two positions. Collapsed when both ends coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange<N> {
    pub start: Position<N>,
    pub end: Position<N>,
}

impl<N: Copy + Eq> TextRange<N> {
    pub fn collapsed(at: Position<N>) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WalkerError<N: Debug> {
    #[error("Node {node:?} is not inside container {container:?}")]
    OutsideContainer { node: N, container: N },
    #[error("Offset {offset} is past the end of {node:?} (length {len})")]
    OffsetOutOfRange { node: N, offset: usize, len: usize },
    #[error("Structural node {node:?} only accepts offset 0, got {offset}")]
    OffsetOnStructural { node: N, offset: usize },
    #[error("Offset {offset} is past the end of the text in {container:?} (length {len})")]
    OffsetPastContent {
        container: N,
        offset: usize,
        len: usize,
    },
}

/// Resolve a flat character offset into the text of `container` to the text
/// node and local offset the walker would reach after `offset` steps.
///
/// An offset on a node boundary resolves to the start of the following text
/// node. The total text length resolves to the end of the last text node, or
/// to the container itself when it holds no text.
///
/// ```text
/// <div>abc<b>def</b>ghi</div>
///
/// 2 → ("abc", 2)    3 → ("def", 0)    7 → ("ghi", 1)    9 → ("ghi", 3)
/// ```
pub fn position_at<T: DocumentTree>(
    tree: &T,
    container: T::Node,
    offset: usize,
) -> Result<Position<T::Node>, WalkerError<T::Node>> {
    let mut consumed = 0;
    let mut last = None;
    for node in descendants(tree, container) {
        let len = tree.text_len(node);
        if len == 0 {
            continue;
        }
        if consumed + len > offset {
            return Ok(Position {
                node,
                offset: offset - consumed,
            });
        }
        consumed += len;
        last = Some((node, len));
    }

    if offset != consumed {
        return Err(WalkerError::OffsetPastContent {
            container,
            offset,
            len: consumed,
        });
    }
    Ok(match last {
        Some((node, len)) => Position { node, offset: len },
        None => Position {
            node: container,
            offset: 0,
        },
    })
}

/// Range between two flat offsets into the text of `container`, each resolved
/// with [`position_at`]. The ends are not reordered.
pub fn range_between<T: DocumentTree>(
    tree: &T,
    container: T::Node,
    start: usize,
    end: usize,
) -> Result<TextRange<T::Node>, WalkerError<T::Node>> {
    Ok(TextRange {
        start: position_at(tree, container, start)?,
        end: position_at(tree, container, end)?,
    })
}

/// Tracks a logical position within one container.
///
/// The walker stores node handles only. Every operation borrows the live tree
/// for its duration, so the host stays free to mutate between calls.
#[derive(Debug, Clone)]
pub struct PositionWalker<N> {
    container: N,
    current: N,
    offset: usize,
    snapshot: RecoverySnapshot<N>,
}

impl<N: Copy + Eq + Hash + Debug> PositionWalker<N> {
    /// Bind to `container` at its first text position, or at the container
    /// itself when it holds no text.
    pub fn new<T: DocumentTree<Node = N>>(tree: &T, container: N) -> Self {
        let current = next_landing(tree, container, container).unwrap_or(container);
        Self {
            container,
            current,
            offset: 0,
            snapshot: RecoverySnapshot::take(tree, container),
        }
    }

    /// Bind to `container` at an explicit position.
    pub fn with_position<T: DocumentTree<Node = N>>(
        tree: &T,
        container: N,
        node: N,
        offset: usize,
    ) -> Result<Self, WalkerError<N>> {
        if !tree.is_inclusive_ancestor(container, node) {
            return Err(WalkerError::OutsideContainer { node, container });
        }
        if tree.is_text(node) {
            let len = tree.text_len(node);
            if offset > len {
                return Err(WalkerError::OffsetOutOfRange { node, offset, len });
            }
        } else if offset != 0 {
            return Err(WalkerError::OffsetOnStructural { node, offset });
        }

        Ok(Self {
            container,
            current: node,
            offset,
            snapshot: RecoverySnapshot::take(tree, container),
        })
    }

    pub fn container(&self) -> N {
        self.container
    }

    pub fn current_node(&self) -> N {
        self.current
    }

    pub fn local_offset(&self) -> usize {
        self.offset
    }

    pub fn position(&self) -> Position<N> {
        Position {
            node: self.current,
            offset: self.offset,
        }
    }

    pub fn is_at_beginning<T: DocumentTree<Node = N>>(&self, tree: &T) -> bool {
        self.offset == 0 && previous_landing(tree, self.container, self.current).is_none()
    }

    pub fn is_at_end<T: DocumentTree<Node = N>>(&self, tree: &T) -> bool {
        let at_node_end = !tree.is_text(self.current) || self.offset == tree.text_len(self.current);
        at_node_end && next_landing(tree, self.container, self.current).is_none()
    }

    /// Step forward by one character.
    ///
    /// From the last character of a text node the walker moves to offset 0 of
    /// the next text node, or to the node's length when no text follows.
    pub fn next_position<T: DocumentTree<Node = N>>(&mut self, tree: &T) {
        if self.is_at_end(tree) {
            return;
        }

        let len = tree.text_len(self.current);
        if tree.is_text(self.current) && self.offset + 1 < len {
            self.offset += 1;
            return;
        }

        match next_landing(tree, self.container, self.current) {
            Some(next) => {
                self.current = next;
                self.offset = 0;
            }
            None => self.offset = len,
        }
    }

    /// Step backward by one character, landing on the last character of the
    /// previous text node when leaving the current one.
    pub fn previous_position<T: DocumentTree<Node = N>>(&mut self, tree: &T) {
        if self.is_at_beginning(tree) {
            return;
        }

        if tree.is_text(self.current) && self.offset > 0 {
            self.offset -= 1;
            return;
        }

        if let Some(previous) = previous_landing(tree, self.container, self.current) {
            self.current = previous;
            self.offset = tree.text_len(previous) - 1;
        }
    }

    /// Zero-width range at the caret.
    pub fn range(&self) -> TextRange<N> {
        TextRange::collapsed(self.position())
    }

    /// Range covering the character about to be traversed, collapsed when
    /// there is none.
    pub fn caret_range<T: DocumentTree<Node = N>>(&self, tree: &T) -> TextRange<N> {
        let start = self.position();
        let mut end = start;
        if tree.is_text(self.current) && self.offset < tree.text_len(self.current) {
            end.offset += 1;
        }
        TextRange { start, end }
    }

    /// Bring the walker back to a valid position after the tree changed.
    ///
    /// - An empty container that gained text re-initialises to its first text
    ///   position.
    /// - A live anchor keeps its position (clamped to the node's new length);
    ///   when it sat at the end of its text it takes one step forward to pick
    ///   up appended content.
    /// - A removed anchor is re-homed through the snapshot: the next surviving
    ///   text node at offset 0, else the previous one at its end, else the
    ///   container itself.
    pub fn refresh<T: DocumentTree<Node = N>>(&mut self, tree: &T) {
        if self.current == self.container {
            if let Some(first) = next_landing(tree, self.container, self.container) {
                log::debug!("container {:?} gained content, re-initialising", self.container);
                self.current = first;
                self.offset = 0;
            }
        } else if tree.is_inclusive_ancestor(self.container, self.current) {
            let len = tree.text_len(self.current);
            if self.offset > len {
                log::debug!(
                    "text of {:?} shrank to {len}, clamping offset {}",
                    self.current,
                    self.offset
                );
                self.offset = len;
            } else if tree.is_text(self.current) && self.offset == len {
                self.next_position(tree);
            }
        } else {
            self.recover(tree);
        }

        self.snapshot = RecoverySnapshot::take(tree, self.container);
    }

    fn recover<T: DocumentTree<Node = N>>(&mut self, tree: &T) {
        match self.snapshot.recover(tree, self.container, self.current) {
            Some(Recovered::After(node)) => {
                log::debug!("anchor {:?} removed, moving forward to {node:?}", self.current);
                self.current = node;
                self.offset = 0;
            }
            Some(Recovered::Before(node)) => {
                log::debug!("anchor {:?} removed, moving back to {node:?}", self.current);
                self.current = node;
                self.offset = tree.text_len(node);
            }
            None => {
                log::warn!(
                    "anchor {:?} removed with no surviving text nearby, resetting to container",
                    self.current
                );
                self.current = self.container;
                self.offset = 0;
            }
        }
    }
}

fn is_landing<T: DocumentTree>(tree: &T, node: T::Node) -> bool {
    tree.text_len(node) > 0
}

/// First landing node strictly after `from` in document order.
fn next_landing<T: DocumentTree>(tree: &T, container: T::Node, from: T::Node) -> Option<T::Node> {
    let mut node = next_in_order(tree, container, from)?;
    while !is_landing(tree, node) {
        node = next_in_order(tree, container, node)?;
    }
    Some(node)
}

/// Last landing node strictly before `from` in document order.
fn previous_landing<T: DocumentTree>(
    tree: &T,
    container: T::Node,
    from: T::Node,
) -> Option<T::Node> {
    let mut node = previous_in_order(tree, container, from)?;
    while !is_landing(tree, node) {
        node = previous_in_order(tree, container, node)?;
    }
    Some(node)
}
