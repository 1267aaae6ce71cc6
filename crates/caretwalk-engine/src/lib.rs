//! Caret positioning over hierarchical rich-text trees.
//!
//! - [`tree`]: the read-only view of a document the engine navigates
//! - [`dom`]: an arena-backed tree implementing it, plus a small markup loader
//! - [`walker`]: character-level positions and mutation recovery
//! - [`geometry`]: box predicates and the layout oracle seam
//! - [`cursor`]: line-aware caret movement built on the two above

pub mod cursor;
pub mod dom;
pub mod geometry;
pub mod tree;
pub mod walker;

// Re-export key types for easier usage
pub use cursor::CursorManager;
pub use dom::{Dom, DomError, MarkupError, NodeId, parse_markup};
pub use geometry::{
    GeometryOracle, LineWrapRule, MonospaceLayout, Rect, ZeroWidthPair, is_above, is_below,
    is_degenerate,
};
pub use tree::{DocumentTree, NodeKind};
pub use walker::{Position, PositionWalker, TextRange, WalkerError, position_at, range_between};
