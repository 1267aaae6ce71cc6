//! # Cursor Manager
//!
//! [`CursorManager`] turns the walker's character steps into the caret
//! movements a user expects: forward/back over visible characters, Home/End
//! of the visual line, and Up/Down by one visual line.
//!
//! ## Lines From Geometry
//!
//! The tree has no line breaks. A position is treated as the end of a visual
//! line when the boxes of its caret range satisfy the [`LineWrapRule`]; the
//! position right after it is the start of the next line.
//!
//! ## The Remembered Column
//!
//! `current_x` is the horizontal coordinate of the caret. Horizontal moves
//! update it; vertical moves deliberately leave it alone so a run of Up/Down
//! presses keeps aiming for the column the run started from. Vertical moves
//! pick, on the target line, the position whose left edge is closest to that
//! column.
//!
//! ```text
//! hello_         down from "l" (x = 3)        hello
//! world    ──────────────────────────────▶    wor|ld
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use crate::geometry::{GeometryOracle, LineWrapRule, Rect, ZeroWidthPair};
use crate::tree::DocumentTree;
use crate::walker::PositionWalker;

/// Caret navigation over one container.
#[derive(Debug, Clone)]
pub struct CursorManager<N, R = ZeroWidthPair> {
    walker: PositionWalker<N>,
    current_x: Option<f64>,
    rule: R,
}

impl<N: Copy + Eq + Hash + Debug> CursorManager<N, ZeroWidthPair> {
    /// Cursor at the first text position of `container`, using the default
    /// line-wrap rule.
    pub fn new<T, G>(tree: &T, container: N, oracle: &G) -> Self
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        Self::with_rule(tree, container, oracle, ZeroWidthPair::default())
    }
}

impl<N: Copy + Eq + Hash + Debug, R: LineWrapRule> CursorManager<N, R> {
    pub fn with_rule<T, G>(tree: &T, container: N, oracle: &G, rule: R) -> Self
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        Self::from_walker(PositionWalker::new(tree, container), oracle, rule)
    }

    /// Wrap an existing walker, e.g. one placed with
    /// [`PositionWalker::with_position`].
    pub fn from_walker<G: GeometryOracle<N>>(walker: PositionWalker<N>, oracle: &G, rule: R) -> Self {
        let mut cursor = Self {
            walker,
            current_x: None,
            rule,
        };
        cursor.update_caret_x(oracle);
        cursor
    }

    /// Re-point the cursor at a different container.
    pub fn retarget<T, G>(&mut self, tree: &T, container: N, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        self.walker = PositionWalker::new(tree, container);
        self.update_caret_x(oracle);
    }

    pub fn walker(&self) -> &PositionWalker<N> {
        &self.walker
    }

    pub fn current_x(&self) -> Option<f64> {
        self.current_x
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Remember the left edge of the caret, or forget it when the caret is
    /// not rendered.
    pub fn update_caret_x<G: GeometryOracle<N>>(&mut self, oracle: &G) {
        self.current_x = oracle
            .boxes_for(&self.walker.range())
            .first()
            .map(|rect| rect.left);
    }

    /// Recover after a tree mutation. `oracle` must already reflect the
    /// mutated tree.
    pub fn refresh<T, G>(&mut self, tree: &T, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        self.walker.refresh(tree);
        self.update_caret_x(oracle);
    }

    fn caret_boxes<T, G>(&self, tree: &T, oracle: &G) -> Vec<Rect>
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        oracle.boxes_for(&self.walker.caret_range(tree))
    }

    fn at_line_wrap<T, G>(&self, tree: &T, oracle: &G) -> bool
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        self.rule.is_line_wrap(&self.caret_boxes(tree, oracle))
    }

    fn is_visible<T, G>(&self, tree: &T, oracle: &G) -> bool
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        !self.rule.is_degenerate(&self.caret_boxes(tree, oracle))
    }

    /// Move one visible character forward, skipping positions that do not
    /// render (collapsed whitespace).
    pub fn forward<T, G>(&mut self, tree: &T, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        loop {
            self.walker.next_position(tree);
            if self.walker.is_at_end(tree) || self.is_visible(tree, oracle) {
                break;
            }
        }
        self.update_caret_x(oracle);
        log::trace!("forward to {:?}", self.walker.position());
    }

    /// Move one visible character back.
    pub fn back<T, G>(&mut self, tree: &T, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        loop {
            self.walker.previous_position(tree);
            if self.walker.is_at_beginning(tree) || self.is_visible(tree, oracle) {
                break;
            }
        }
        self.update_caret_x(oracle);
        log::trace!("back to {:?}", self.walker.position());
    }

    /// Move to the end of the visual line: the line-wrap position, or the end
    /// of the content.
    pub fn end_of_line<T, G>(&mut self, tree: &T, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        while !self.walker.is_at_end(tree) && !self.at_line_wrap(tree, oracle) {
            self.walker.next_position(tree);
        }
        self.update_caret_x(oracle);
        log::trace!("end of line at {:?}", self.walker.position());
    }

    /// Move to the start of the visual line: just after the previous
    /// line-wrap position, or the beginning of the content.
    pub fn beginning_of_line<T, G>(&mut self, tree: &T, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        self.seek_line_start(tree, oracle);
        self.update_caret_x(oracle);
        log::trace!("beginning of line at {:?}", self.walker.position());
    }

    fn seek_line_start<T, G>(&mut self, tree: &T, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        while !self.walker.is_at_beginning(tree) {
            self.walker.previous_position(tree);
            if self.at_line_wrap(tree, oracle) {
                // That step crossed onto the previous line.
                self.walker.next_position(tree);
                break;
            }
        }
    }

    /// Move to the position on the next visual line closest to the
    /// remembered column. Leaves the remembered column unchanged.
    ///
    /// The target line's wrap position and the end of the content are
    /// measured as candidates before the scan stops at them, rather than
    /// stopping as soon as the boundary is reached. That is what lets the
    /// caret land at the end of a shorter line or on an empty one.
    pub fn down<T, G>(&mut self, tree: &T, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        let saved_x = self.current_x;
        let target = saved_x.unwrap_or(0.0);

        self.end_of_line(tree, oracle);
        if !self.walker.is_at_end(tree) {
            // Cross the wrap onto the first position of the next line.
            self.walker.next_position(tree);

            let mut best = None;
            loop {
                let boxes = self.caret_boxes(tree, oracle);
                if let Some(first) = boxes.first() {
                    let distance = (target - first.left).abs();
                    if best.is_some_and(|b| distance > b) {
                        self.walker.previous_position(tree);
                        break;
                    }
                    if best.is_none_or(|b| distance < b) {
                        best = Some(distance);
                    }
                }
                // A wrap here is the end of the target line.
                if self.rule.is_line_wrap(&boxes) || self.walker.is_at_end(tree) {
                    break;
                }
                self.walker.next_position(tree);
            }
        }

        self.current_x = saved_x;
        log::trace!("down to {:?}", self.walker.position());
    }

    /// Move to the position on the previous visual line closest to the
    /// remembered column. Leaves the remembered column unchanged.
    ///
    /// As with [`down`](Self::down), the beginning of the content is measured
    /// as a candidate before the scan stops there.
    pub fn up<T, G>(&mut self, tree: &T, oracle: &G)
    where
        T: DocumentTree<Node = N>,
        G: GeometryOracle<N>,
    {
        let saved_x = self.current_x;
        let target = saved_x.unwrap_or(0.0);

        self.seek_line_start(tree, oracle);
        if !self.walker.is_at_beginning(tree) {
            // Cross the wrap onto the last position of the previous line.
            self.walker.previous_position(tree);

            let mut best = None;
            loop {
                if let Some(first) = self.caret_boxes(tree, oracle).first() {
                    let distance = (target - first.left).abs();
                    if best.is_some_and(|b| distance > b) {
                        self.walker.next_position(tree);
                        break;
                    }
                    if best.is_none_or(|b| distance < b) {
                        best = Some(distance);
                    }
                }
                if self.walker.is_at_beginning(tree) {
                    break;
                }
                self.walker.previous_position(tree);
                if self.at_line_wrap(tree, oracle) {
                    // Reached the end of the line above the target.
                    self.walker.next_position(tree);
                    break;
                }
            }
        }

        self.current_x = saved_x;
        log::trace!("up to {:?}", self.walker.position());
    }
}
