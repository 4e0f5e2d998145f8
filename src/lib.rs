//! Markdown Grid — Markdown laid out onto a grid of styled terminal cells.
//!
//! The crate parses CommonMark (plus GFM tables, strikethrough and task
//! lists) into an owned node tree, then walks that tree writing one styled
//! glyph per cell into any [`CellSink`]:
//!
//! 1. `tree` folds the pulldown-cmark event stream into [`MdNode`]s
//! 2. `render` drives the cursor, wrapping, spacing and styles per node
//! 3. `table` sizes columns and draws bordered, wrapped cells
//!
//! Content that runs past the bottom of the area is dropped; nothing is
//! ever written outside it.
//!
//! ```
//! use markdown_grid::{Buffer, Markdown, MarkdownState, Style};
//!
//! let mut buf = Buffer::new(40, 5);
//! let state = MarkdownState::new("# Title\n\n- one\n- two");
//! Markdown::new(Style::EMPTY).render(buf.area(), &mut buf, &state);
//!
//! assert_eq!(buf.line_text(0), "# Title");
//! assert_eq!(buf.line_text(2), "• one");
//! ```

pub mod error;
pub mod render;
pub mod style;
pub mod table;
pub mod terminal;
pub mod text;
pub mod theme;
pub mod tree;
pub mod types;

pub use error::{Error, Result};
pub use render::{Markdown, MarkdownState};
pub use style::Style;
pub use theme::{parse_color, Theme};
pub use tree::{parse_document, MdNode, NodeKind};
pub use types::{Buffer, Cell, CellAttrs, CellSink, Rect};
