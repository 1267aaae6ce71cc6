//! # Geometry
//!
//! The document tree has no notion of lines. Everything line-related is
//! inferred from the boxes a rendering collaborator reports for a range,
//! through the [`GeometryOracle`] trait.
//!
//! ## Line Wraps
//!
//! Whether a range sits on a line boundary is decided by a [`LineWrapRule`].
//! The default, [`ZeroWidthPair`], matches engines that report a range over
//! a wrapping space as two zero-width boxes: one at the end of the current
//! line and one at the start of the next. Engines that report wraps
//! differently plug in their own rule.

pub mod monospace;

use serde::{Deserialize, Serialize};

use crate::walker::TextRange;

pub use monospace::MonospaceLayout;

/// An axis-aligned box in the oracle's coordinate space. `top < bottom`
/// and `left <= right`; y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// True when the horizontal spans of the two boxes overlap, or one
    /// contains the other.
    pub fn horizontally_overlaps(&self, other: &Rect) -> bool {
        (other.left < self.right && other.left >= self.left)
            || (other.right >= self.left && other.right < self.right)
            || (other.left <= self.left && other.right > self.right)
    }
}

/// True when `r2`'s bottom edge lies past `r1`'s and the two share a
/// horizontal span.
pub fn is_above(r1: &Rect, r2: &Rect) -> bool {
    r2.bottom > r1.bottom && r1.horizontally_overlaps(r2)
}

/// True when `r2`'s top edge lies past `r1`'s and the two share a
/// horizontal span.
pub fn is_below(r1: &Rect, r2: &Rect) -> bool {
    r2.top > r1.top && r1.horizontally_overlaps(r2)
}

/// Maps a range to the boxes it renders as, in order. Empty when the range
/// is not rendered at all.
pub trait GeometryOracle<N> {
    fn boxes_for(&self, range: &TextRange<N>) -> Vec<Rect>;
}

/// Decides whether a range's boxes mark a visual line boundary, and which
/// boxes are too thin to count as a visible character.
pub trait LineWrapRule {
    fn is_line_wrap(&self, boxes: &[Rect]) -> bool;

    /// Defaults to [`is_degenerate`].
    fn is_degenerate(&self, boxes: &[Rect]) -> bool {
        is_degenerate(boxes)
    }
}

impl<F: Fn(&[Rect]) -> bool> LineWrapRule for F {
    fn is_line_wrap(&self, boxes: &[Rect]) -> bool {
        self(boxes)
    }
}

/// Exactly two boxes, both zero width, the first on a higher line than the
/// second.
///
/// Boxes narrower than `epsilon` count as zero width, for engines that
/// report sub-pixel slivers at wraps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZeroWidthPair {
    pub epsilon: f64,
}

impl ZeroWidthPair {
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl LineWrapRule for ZeroWidthPair {
    fn is_line_wrap(&self, boxes: &[Rect]) -> bool {
        match boxes {
            [first, second] => {
                first.width() <= self.epsilon
                    && second.width() <= self.epsilon
                    && first.top < second.top
            }
            _ => false,
        }
    }

    /// Slivers no wider than `epsilon` are invisible here too, so forward and
    /// back skip the same boxes line-wrap detection treats as zero width.
    fn is_degenerate(&self, boxes: &[Rect]) -> bool {
        match boxes {
            [] => true,
            [only] => only.width() <= self.epsilon,
            _ => false,
        }
    }
}

/// No boxes, or a single zero-width one. Collapsed whitespace usually
/// renders this way.
pub fn is_degenerate(boxes: &[Rect]) -> bool {
    match boxes {
        [] => true,
        [only] => only.width() == 0.0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn caret(top: f64, left: f64) -> Rect {
        Rect::new(top, left, top + 10.0, left)
    }

    fn cell(top: f64, left: f64) -> Rect {
        Rect::new(top, left, top + 10.0, left + 5.0)
    }

    #[test]
    fn two_zero_width_boxes_stepping_down_are_a_wrap() {
        assert!(ZeroWidthPair::default().is_line_wrap(&[caret(0.0, 40.0), caret(10.0, 0.0)]));
    }

    #[rstest]
    #[case::no_boxes(vec![])]
    #[case::one_box(vec![caret(0.0, 40.0)])]
    #[case::three_boxes(vec![caret(0.0, 40.0), caret(10.0, 0.0), caret(20.0, 0.0)])]
    #[case::wide_boxes(vec![cell(0.0, 40.0), cell(10.0, 0.0)])]
    #[case::same_line(vec![caret(0.0, 40.0), caret(0.0, 0.0)])]
    #[case::stepping_up(vec![caret(10.0, 0.0), caret(0.0, 40.0)])]
    fn other_box_patterns_are_not_wraps(#[case] boxes: Vec<Rect>) {
        assert!(!ZeroWidthPair::default().is_line_wrap(&boxes));
    }

    #[test]
    fn epsilon_tolerates_slivers() {
        let sliver = |top: f64| Rect::new(top, 0.0, top + 10.0, 0.25);
        let boxes = [sliver(0.0), sliver(10.0)];

        assert!(!ZeroWidthPair::default().is_line_wrap(&boxes));
        assert!(ZeroWidthPair::with_epsilon(0.5).is_line_wrap(&boxes));
    }

    #[test]
    fn epsilon_applies_to_degenerate_boxes() {
        let sliver = [Rect::new(0.0, 5.0, 10.0, 5.25)];

        assert!(!ZeroWidthPair::default().is_degenerate(&sliver));
        assert!(ZeroWidthPair::with_epsilon(0.5).is_degenerate(&sliver));
        assert!(!ZeroWidthPair::with_epsilon(0.5).is_degenerate(&[cell(0.0, 5.0)]));
        assert!(ZeroWidthPair::with_epsilon(0.5).is_degenerate(&[]));
    }

    #[test]
    fn closures_are_line_wrap_rules() {
        let single_box_jump = |boxes: &[Rect]| boxes.len() == 1 && boxes[0].left == 0.0;
        assert!(single_box_jump.is_line_wrap(&[caret(10.0, 0.0)]));
        assert!(!single_box_jump.is_line_wrap(&[caret(10.0, 5.0)]));
        assert!(single_box_jump.is_degenerate(&[caret(10.0, 5.0)]));
    }

    #[rstest]
    #[case::nothing(vec![], true)]
    #[case::collapsed(vec![caret(0.0, 5.0)], true)]
    #[case::visible(vec![cell(0.0, 5.0)], false)]
    #[case::wrap(vec![caret(0.0, 40.0), caret(10.0, 0.0)], false)]
    fn degenerate_geometry(#[case] boxes: Vec<Rect>, #[case] expected: bool) {
        assert_eq!(is_degenerate(&boxes), expected);
    }

    #[test]
    fn overlap_covers_containment_and_partial_spans() {
        let wide = Rect::new(0.0, 0.0, 10.0, 100.0);
        let inner = Rect::new(10.0, 20.0, 20.0, 30.0);
        let straddling = Rect::new(10.0, 90.0, 20.0, 120.0);
        let apart = Rect::new(10.0, 200.0, 20.0, 210.0);

        assert!(wide.horizontally_overlaps(&inner));
        assert!(inner.horizontally_overlaps(&wide));
        assert!(wide.horizontally_overlaps(&straddling));
        assert!(!wide.horizontally_overlaps(&apart));
    }

    #[test]
    fn vertical_relationships() {
        let upper = cell(0.0, 10.0);
        let lower = cell(10.0, 12.0);
        let lower_elsewhere = cell(10.0, 200.0);

        assert!(is_below(&upper, &lower));
        assert!(is_above(&upper, &lower));
        assert!(!is_below(&lower, &upper));
        assert!(!is_above(&lower, &upper));
        assert!(!is_below(&upper, &lower_elsewhere));
    }
}
