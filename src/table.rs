//! Table Module — Grid tables with bordered, word-wrapped cells.
//!
//! Responsibilities:
//! - Column count and natural column widths from flattened cell text
//! - Fair-share shrinking when the natural widths overflow the area
//! - Per-table traversal context (column offsets, row start, row height)
//! - Head separator, cell sub-areas, and vertical bars per row

use crate::render::{image_label, Renderer};
use crate::text::measure_text;
use crate::tree::{MdNode, NodeKind};
use crate::types::Rect;

// ============================================================================
// Column Widths
// ============================================================================

/// Number of cells in the first row of the table head, or 0 without a head.
pub fn count_columns(table: &MdNode) -> usize {
    table
        .children
        .iter()
        .find(|c| c.kind == NodeKind::TableHead)
        .and_then(|head| head.children.iter().find(|r| r.kind == NodeKind::TableRow))
        .map_or(0, |row| row.children.len())
}

/// Plain text of a cell as it is measured for column sizing.
pub fn flatten_text(node: &MdNode) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &MdNode, out: &mut String) {
    match &node.kind {
        NodeKind::Text(t) | NodeKind::Code(t) | NodeKind::HtmlInline(t) => out.push_str(t),
        NodeKind::SoftBreak => out.push(' '),
        NodeKind::Image { destination, title } => {
            out.push_str(&image_label(title.as_deref(), destination));
        }
        _ => {
            for child in &node.children {
                collect_text(child, out);
            }
        }
    }
}

fn collect_rows<'n>(node: &'n MdNode, rows: &mut Vec<&'n MdNode>) {
    for child in &node.children {
        match child.kind {
            NodeKind::TableRow => rows.push(child),
            NodeKind::TableHead | NodeKind::TableBody => collect_rows(child, rows),
            _ => {}
        }
    }
}

/// Widest flattened cell text per column across every row, at least 1.
/// Cells beyond `columns` are ignored.
pub fn natural_widths(table: &MdNode, columns: usize) -> Vec<usize> {
    let mut widths = vec![1; columns];
    let mut rows = Vec::new();
    collect_rows(table, &mut rows);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(&row.children) {
            *width = (*width).max(measure_text(&flatten_text(cell)));
        }
    }
    widths
}

/// Shrink `natural` widths to fit `available` columns.
///
/// Returns `natural` unchanged when it already fits. Otherwise columns are
/// visited narrowest first; each gets the smaller of its natural width and
/// an even split of what is left, so narrow columns keep their size and the
/// wide ones share the rest.
pub fn fair_share(natural: &[usize], available: usize) -> Vec<usize> {
    let total: usize = natural.iter().sum();
    if total <= available {
        return natural.to_vec();
    }

    let mut order: Vec<usize> = (0..natural.len()).collect();
    order.sort_by_key(|&i| natural[i]);

    let mut widths = vec![0; natural.len()];
    let mut remaining = available;
    let mut remaining_cols = natural.len();
    for i in order {
        let share = remaining / remaining_cols;
        widths[i] = natural[i].min(share);
        remaining -= widths[i];
        remaining_cols -= 1;
    }
    widths
}

/// Final column widths for a table laid out in an area `area_width` wide.
///
/// Borders take `3 * columns + 1` cells (`"| "` before each column, `" "`
/// after it, and a closing `"|"`). Every column keeps at least one cell.
pub fn column_widths(table: &MdNode, columns: usize, area_width: u16) -> Vec<usize> {
    fair_share(&natural_widths(table, columns), available_width(columns, area_width))
}

fn available_width(columns: usize, area_width: u16) -> usize {
    let borders = 3 * columns + 1;
    usize::from(area_width).saturating_sub(borders).max(columns)
}

// ============================================================================
// Traversal Context
// ============================================================================

/// Layout state for the table currently being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableContext {
    pub(crate) col_widths: Vec<usize>,
    /// Absolute x of each column's content (after `"| "`).
    pub(crate) col_xs: Vec<i32>,
    pub(crate) row_start_y: i32,
    pub(crate) current_col: usize,
    pub(crate) max_row_height: i32,
}

impl TableContext {
    pub(crate) fn new(col_widths: Vec<usize>, left: i32) -> Self {
        let mut col_xs = Vec::with_capacity(col_widths.len());
        let mut x = left;
        for &w in &col_widths {
            col_xs.push(x + 2);
            x += w as i32 + 3;
        }
        Self {
            col_widths,
            col_xs,
            row_start_y: 0,
            current_col: 0,
            max_row_height: 1,
        }
    }

    pub(crate) fn start_row(&mut self, y: i32) {
        self.row_start_y = y;
        self.current_col = 0;
        self.max_row_height = 1;
    }

    pub(crate) fn update_max_height(&mut self, height: i32) {
        self.max_row_height = self.max_row_height.max(height);
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl Renderer<'_> {
    pub(crate) fn visit_table(&mut self, node: &MdNode) {
        let columns = count_columns(node);
        if columns == 0 {
            self.visit_children(node);
            return;
        }

        let natural = natural_widths(node, columns);
        let widths = fair_share(&natural, available_width(columns, self.area.width));
        tracing::trace!(?natural, ?widths, area_width = self.area.width, "table columns");

        if !self.at_line_start() {
            self.advance_line();
            self.advance_line();
        }

        let ctx = TableContext::new(widths, self.left());
        let prev = self.table.replace(ctx);
        self.visit_children(node);
        self.table = prev;
        self.advance_line();
    }

    pub(crate) fn visit_table_head(&mut self, node: &MdNode) {
        self.visit_children(node);
        let Some(widths) = self.table.as_ref().map(|t| t.col_widths.clone()) else {
            return;
        };
        if self.out_of_bounds() {
            return;
        }

        let y = self.y;
        let mut x = self.left();
        for w in widths {
            self.put(x, y, "|");
            for dx in 1..=(w as i32 + 2) {
                self.put(x + dx, y, "-");
            }
            x += w as i32 + 3;
        }
        self.put(x, y, "|");

        self.y += 1;
        self.x = self.left();
    }

    pub(crate) fn visit_table_row(&mut self, node: &MdNode) {
        let y = self.y;
        let Some(ctx) = self.table.as_mut() else {
            self.visit_children(node);
            return;
        };
        ctx.start_row(y);

        self.visit_children(node);

        let Some(ctx) = self.table.as_ref() else {
            return;
        };
        let (row_start, height, widths) =
            (ctx.row_start_y, ctx.max_row_height, ctx.col_widths.clone());

        for line in 0..height {
            let y = row_start + line;
            if y >= self.bottom() {
                break;
            }
            let mut x = self.left();
            for &w in &widths {
                self.put(x, y, "|");
                x += w as i32 + 3;
            }
            self.put(x, y, "|");
        }

        self.y = row_start + height;
        self.x = self.left();
    }

    pub(crate) fn visit_table_cell(&mut self, node: &MdNode, header: bool) {
        let Some(ctx) = self.table.as_mut() else {
            self.visit_children(node);
            return;
        };
        let col = ctx.current_col;
        ctx.current_col += 1;
        if col >= ctx.col_widths.len() {
            return;
        }
        let (col_x, col_width, row_start) = (ctx.col_xs[col], ctx.col_widths[col], ctx.row_start_y);

        let cell_area = self.cell_area(col_x, col_width, row_start);
        let style = if header { self.style.bold() } else { self.style };
        let mut height = 0;

        self.with_area(cell_area, |r| {
            r.x = i32::from(cell_area.x);
            r.y = row_start;
            r.with_style(style, |r| r.visit_children(node));
            height = r.y - row_start + i32::from(!r.at_line_start());
        });

        if let Some(ctx) = self.table.as_mut() {
            ctx.update_max_height(height);
        }
    }

    /// Sub-area for one cell: its column band from the row start down to the
    /// bottom of the enclosing area, clipped to that area.
    fn cell_area(&self, col_x: i32, col_width: usize, row_start: i32) -> Rect {
        let right = self.right();
        let bottom = self.bottom();
        let x = col_x.clamp(self.left(), right);
        let width = (col_width as i32).min(right - x).max(0);
        let y = row_start.clamp(i32::from(self.area.y), bottom);
        let height = (bottom - y).max(0);
        Rect::new(x as u16, y as u16, width as u16, height as u16)
    }
}
