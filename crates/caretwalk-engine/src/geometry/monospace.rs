//! Reference [`GeometryOracle`] that lays text out on a fixed character
//! grid with greedy word wrap.
//!
//! The layout imitates how a browser reports client rects, so the cursor
//! heuristics can be exercised without one:
//!
//! | character                        | boxes                                   |
//! |----------------------------------|-----------------------------------------|
//! | visible glyph                    | one cell                                |
//! | space where the line wraps, `\n` | two zero-width boxes, line end + next line start |
//! | space after a space              | one zero-width box (collapsed)          |
//!
//! A collapsed range reports one zero-width box at the caret. The layout is a
//! snapshot of the tree; rebuild it after every mutation.

use std::collections::HashMap;
use std::hash::Hash;

use super::{GeometryOracle, Rect};
use crate::tree::{DocumentTree, descendants};
use crate::walker::{Position, TextRange};

#[derive(Debug, Clone)]
struct Glyph {
    boxes: Vec<Rect>,
}

/// Monospace grid layout of one container.
#[derive(Debug, Clone)]
pub struct MonospaceLayout<N> {
    cell_width: f64,
    line_height: f64,
    glyphs: Vec<Glyph>,
    /// Index of each text node's first glyph
    starts: HashMap<N, usize>,
    lines: Vec<String>,
}

/// Where the next glyph goes.
struct Pen {
    line: usize,
    column: usize,
    after_space: bool,
}

impl<N: Copy + Eq + Hash> MonospaceLayout<N> {
    /// Lay out with one unit per column and per line.
    pub fn new<T: DocumentTree<Node = N>>(tree: &T, container: N, columns: usize) -> Self {
        Self::with_metrics(tree, container, columns, 1.0, 1.0)
    }

    pub fn with_metrics<T: DocumentTree<Node = N>>(
        tree: &T,
        container: N,
        columns: usize,
        cell_width: f64,
        line_height: f64,
    ) -> Self {
        let columns = columns.max(1);
        let mut starts = HashMap::new();
        let mut chars = Vec::new();
        for node in descendants(tree, container) {
            if let Some(text) = tree.text(node) {
                starts.insert(node, chars.len());
                chars.extend(text.chars());
            }
        }

        let mut layout = Self {
            cell_width,
            line_height,
            glyphs: Vec::with_capacity(chars.len()),
            starts,
            lines: vec![String::new()],
        };
        layout.flow(&chars, columns);
        layout
    }

    fn flow(&mut self, chars: &[char], columns: usize) {
        let mut pen = Pen {
            line: 0,
            column: 0,
            after_space: true,
        };

        for (i, &ch) in chars.iter().enumerate() {
            let boxes = match ch {
                '\n' => self.break_line(&mut pen),
                ' ' | '\t' if pen.after_space => vec![self.caret_at(pen.line, pen.column)],
                ' ' | '\t' => {
                    let word = chars[i + 1..]
                        .iter()
                        .take_while(|c| !c.is_whitespace())
                        .count();
                    if word > 0 && pen.column + 1 + word > columns {
                        self.break_line(&mut pen)
                    } else if pen.column >= columns {
                        // Trailing space hangs past the edge.
                        pen.after_space = true;
                        vec![self.caret_at(pen.line, pen.column)]
                    } else {
                        pen.after_space = true;
                        vec![self.draw(&mut pen, ' ')]
                    }
                }
                _ => {
                    if pen.column >= columns {
                        self.lines.push(String::new());
                        pen.line += 1;
                        pen.column = 0;
                    }
                    pen.after_space = false;
                    vec![self.draw(&mut pen, ch)]
                }
            };
            self.glyphs.push(Glyph { boxes });
        }
    }

    fn break_line(&mut self, pen: &mut Pen) -> Vec<Rect> {
        let end = self.caret_at(pen.line, pen.column);
        self.lines.push(String::new());
        pen.line += 1;
        pen.column = 0;
        pen.after_space = true;
        vec![end, self.caret_at(pen.line, 0)]
    }

    fn draw(&mut self, pen: &mut Pen, ch: char) -> Rect {
        let mut rect = self.caret_at(pen.line, pen.column);
        rect.right += self.cell_width;
        if let Some(line) = self.lines.last_mut() {
            line.push(ch);
        }
        pen.column += 1;
        rect
    }

    fn caret_at(&self, line: usize, column: usize) -> Rect {
        let top = line as f64 * self.line_height;
        let left = column as f64 * self.cell_width;
        Rect::new(top, left, top + self.line_height, left)
    }

    /// The rendered rows, collapsed whitespace removed.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Grid cell `(line, column)` the caret occupies at `position`.
    pub fn caret_cell(&self, position: Position<N>) -> Option<(usize, usize)> {
        let rect = self.caret_box(self.glyph_index(position)?)?;
        Some((
            (rect.top / self.line_height).round() as usize,
            (rect.left / self.cell_width).round() as usize,
        ))
    }

    fn glyph_index(&self, position: Position<N>) -> Option<usize> {
        self.starts
            .get(&position.node)
            .map(|start| start + position.offset)
    }

    /// Zero-width box in front of glyph `index`, or after the last glyph when
    /// `index` is one past the end.
    fn caret_box(&self, index: usize) -> Option<Rect> {
        if let Some(glyph) = self.glyphs.get(index) {
            let first = glyph.boxes.first()?;
            return Some(Rect::new(first.top, first.left, first.bottom, first.left));
        }
        let last = self.glyphs.last()?.boxes.last()?;
        Some(Rect::new(last.top, last.right, last.bottom, last.right))
    }
}

impl<N: Copy + Eq + Hash> GeometryOracle<N> for MonospaceLayout<N> {
    fn boxes_for(&self, range: &TextRange<N>) -> Vec<Rect> {
        let (Some(start), Some(end)) = (self.glyph_index(range.start), self.glyph_index(range.end))
        else {
            return Vec::new();
        };

        if start >= end {
            return self.caret_box(start).into_iter().collect();
        }
        self.glyphs[start..end.min(self.glyphs.len())]
            .iter()
            .flat_map(|glyph| glyph.boxes.iter().copied())
            .collect()
    }
}
