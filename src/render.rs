//! Render Module — Document tree to styled grid cells.
//!
//! Responsibilities:
//! - `Markdown` widget entry point: parse, then traverse into a cell sink
//! - Cursor/line engine over the active render area
//! - Word-wrapping text emission with vertical truncation
//! - Per-node spacing, prefix and style rules (tables live in `table.rs`)

use std::time::Instant;

use crate::style::Style;
use crate::table::TableContext;
use crate::text::{display_symbol, grapheme_width, is_line_feed, measure_text, split_wrap_units};
use crate::theme::Theme;
use crate::tree::{parse_document, MdNode, NodeKind};
use crate::types::{CellSink, Rect};
use unicode_segmentation::UnicodeSegmentation;

// ============================================================================
// Widget
// ============================================================================

/// Source text for a [`Markdown`] widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownState {
    text: String,
}

impl MarkdownState {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// Renders Markdown into a rectangular area of a cell grid. Content that
/// does not fit below the area is dropped.
#[derive(Debug, Clone, Default)]
pub struct Markdown {
    base_style: Style,
    theme: Theme,
}

impl Markdown {
    pub fn new(base_style: Style) -> Self {
        Self {
            base_style,
            theme: Theme::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Parse `state`'s text and lay it out into `area`. No-op for empty text.
    pub fn render(&self, area: Rect, sink: &mut dyn CellSink, state: &MarkdownState) {
        if state.text().is_empty() {
            return;
        }
        let document = parse_document(state.text());
        self.render_document(area, sink, &document);
    }

    /// Lay out an already parsed document into `area`.
    pub fn render_document(&self, area: Rect, sink: &mut dyn CellSink, document: &MdNode) {
        let start = Instant::now();
        let mut renderer = Renderer::new(area, sink, self.base_style, &self.theme);
        renderer.visit(document, None);

        tracing::debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            rows = renderer.y - i32::from(area.y),
            truncated = renderer.truncated,
            "render markdown"
        );
        if renderer.truncated {
            tracing::debug!(?area, "content truncated at bottom of area");
        }
    }
}

// ============================================================================
// Traversal State
// ============================================================================

/// Mutable state threaded through one depth-first traversal.
pub(crate) struct Renderer<'a> {
    sink: &'a mut dyn CellSink,
    theme: &'a Theme,
    /// Active area; narrowed to a column band while inside a table cell.
    pub(crate) area: Rect,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) style: Style,
    list_number: u64,
    pub(crate) table: Option<TableContext>,
    truncated: bool,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        area: Rect,
        sink: &'a mut dyn CellSink,
        base_style: Style,
        theme: &'a Theme,
    ) -> Self {
        Self {
            sink,
            theme,
            area,
            x: i32::from(area.x),
            y: i32::from(area.y),
            style: base_style,
            list_number: 1,
            table: None,
            truncated: false,
        }
    }

    // ------------------------------------------------------------------------
    // Cursor / line engine
    // ------------------------------------------------------------------------

    pub(crate) fn left(&self) -> i32 {
        i32::from(self.area.x)
    }

    pub(crate) fn right(&self) -> i32 {
        i32::from(self.area.right())
    }

    pub(crate) fn bottom(&self) -> i32 {
        i32::from(self.area.bottom())
    }

    pub(crate) fn advance_line(&mut self) {
        self.x = self.left();
        self.y += 1;
    }

    pub(crate) fn at_line_start(&self) -> bool {
        self.x == self.left()
    }

    pub(crate) fn out_of_bounds(&self) -> bool {
        self.y >= self.bottom()
    }

    /// Write one glyph with the current style if it lies inside the area.
    pub(crate) fn put(&mut self, x: i32, y: i32, symbol: &str) {
        let inside = x >= self.left()
            && x < self.right()
            && y >= i32::from(self.area.y)
            && y < self.bottom();
        if inside {
            self.sink.set_symbol(x as u16, y as u16, symbol, self.style);
        }
    }

    // ------------------------------------------------------------------------
    // Scoped overrides
    // ------------------------------------------------------------------------

    /// Run `f` with `style` in effect; the previous style is restored after.
    pub(crate) fn with_style(&mut self, style: Style, f: impl FnOnce(&mut Self)) {
        let prev = std::mem::replace(&mut self.style, style);
        f(self);
        self.style = prev;
    }

    /// Run `f` with `area` as the active area; the previous area is restored
    /// after. The cursor is left where `f` put it.
    pub(crate) fn with_area(&mut self, area: Rect, f: impl FnOnce(&mut Self)) {
        let prev = std::mem::replace(&mut self.area, area);
        f(self);
        self.area = prev;
    }

    // ------------------------------------------------------------------------
    // Text emission
    // ------------------------------------------------------------------------

    /// Write `text` at the cursor, wrapping at unit boundaries and breaking
    /// units that are wider than a whole line.
    pub(crate) fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.out_of_bounds() {
            self.truncated = true;
            return;
        }

        for unit in split_wrap_units(text) {
            if is_line_feed(unit) {
                self.advance_line();
                continue;
            }

            let width = measure_text(unit) as i32;
            if self.x + width > self.right() && !self.at_line_start() {
                self.advance_line();
            }
            if self.out_of_bounds() {
                self.truncated = true;
                return;
            }

            for grapheme in unit.graphemes(true) {
                let w = grapheme_width(grapheme) as i32;
                if w == 0 {
                    continue;
                }
                if self.x + w > self.right() && !self.at_line_start() {
                    self.advance_line();
                    if self.out_of_bounds() {
                        self.truncated = true;
                        return;
                    }
                }
                if self.x + w > self.right() {
                    // Wider than the whole area
                    continue;
                }
                self.put(self.x, self.y, display_symbol(grapheme));
                self.x += w;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Node dispatcher
    // ------------------------------------------------------------------------

    pub(crate) fn visit_children(&mut self, node: &MdNode) {
        for child in &node.children {
            self.visit(child, Some(&node.kind));
        }
    }

    pub(crate) fn visit(&mut self, node: &MdNode, parent: Option<&NodeKind>) {
        let theme = self.theme;
        match &node.kind {
            NodeKind::Document | NodeKind::TableBody | NodeKind::Unknown => {
                self.visit_children(node)
            }
            NodeKind::Heading { level } => {
                let style = self.style.bold().fg(theme.heading_fg);
                self.with_style(style, |r| {
                    if !r.at_line_start() {
                        r.advance_line();
                    }
                    r.emit(&format!("{} ", "#".repeat(usize::from(*level))));
                    r.visit_children(node);
                });
                self.advance_line();
                self.advance_line();
            }
            NodeKind::Paragraph => {
                let in_list_item = matches!(parent, Some(NodeKind::ListItem));
                let in_quote = matches!(parent, Some(NodeKind::BlockQuote));
                if !self.at_line_start() && !in_list_item && !in_quote {
                    self.advance_line();
                }
                self.visit_children(node);
                self.advance_line();
                if !in_list_item {
                    self.advance_line();
                }
            }
            NodeKind::Text(literal) => self.emit(literal),
            NodeKind::Strong => {
                let style = self.style.bold();
                self.with_style(style, |r| r.visit_children(node));
            }
            NodeKind::Emphasis => {
                let style = self.style.italic();
                self.with_style(style, |r| r.visit_children(node));
            }
            NodeKind::Strikethrough => {
                let style = self.style.fg(theme.strikethrough_fg).italic();
                self.with_style(style, |r| r.visit_children(node));
            }
            NodeKind::Code(literal) => {
                let style = self.style.fg(theme.code_fg).bg(theme.code_bg);
                self.with_style(style, |r| r.emit(literal));
            }
            NodeKind::SoftBreak => self.emit(" "),
            NodeKind::HardBreak => self.advance_line(),
            NodeKind::BulletList => {
                self.visit_children(node);
                self.advance_line();
            }
            NodeKind::OrderedList { start } => {
                let prev = std::mem::replace(&mut self.list_number, *start);
                self.visit_children(node);
                self.list_number = prev;
                self.advance_line();
            }
            NodeKind::ListItem => {
                if !self.at_line_start() {
                    self.advance_line();
                }
                if !is_task_item(node) {
                    if matches!(parent, Some(NodeKind::OrderedList { .. })) {
                        let prefix = format!("{}. ", self.list_number);
                        self.list_number += 1;
                        self.emit(&prefix);
                    } else {
                        self.emit(&format!("{} ", theme.bullet));
                    }
                }
                self.visit_children(node);
            }
            NodeKind::TaskMarker { checked } => {
                self.emit(if *checked { "[x] " } else { "[ ] " });
            }
            NodeKind::BlockQuote => {
                let style = self.style.italic().fg(theme.quote_fg);
                self.with_style(style, |r| {
                    if !r.at_line_start() {
                        r.advance_line();
                    }
                    r.emit("> ");
                    r.visit_children(node);
                });
            }
            NodeKind::FencedCode { literal, .. } | NodeKind::IndentedCode { literal } => {
                let style = self.style.fg(theme.code_fg).bg(theme.code_bg);
                self.literal_block(literal, style);
            }
            NodeKind::HtmlBlock(literal) => {
                let style = self.style.fg(theme.html_fg);
                self.literal_block(literal, style);
            }
            NodeKind::HtmlInline(literal) => {
                let style = self.style.fg(theme.html_fg);
                self.with_style(style, |r| r.emit(literal));
            }
            NodeKind::ThematicBreak => {
                if !self.at_line_start() {
                    self.advance_line();
                }
                self.emit("---");
                self.advance_line();
                self.advance_line();
            }
            NodeKind::Link { .. } => {
                let style = self.style.fg(theme.link_fg).underlined();
                self.with_style(style, |r| r.visit_children(node));
            }
            NodeKind::Image { destination, title } => {
                // Title doubles as the alt text; the alt children are not shown
                let style = self.style.fg(theme.link_fg).underlined();
                let label = image_label(title.as_deref(), destination);
                self.with_style(style, |r| r.emit(&label));
            }
            NodeKind::LinkReferenceDefinition { .. } => {}
            NodeKind::Table => self.visit_table(node),
            NodeKind::TableHead => self.visit_table_head(node),
            NodeKind::TableRow => self.visit_table_row(node),
            NodeKind::TableCell { header } => self.visit_table_cell(node, *header),
        }
    }

    /// Code and HTML blocks: own lines, literal text, blank line after.
    fn literal_block(&mut self, literal: &str, style: Style) {
        if !self.at_line_start() {
            self.advance_line();
        }
        let body = literal.strip_suffix('\n').unwrap_or(literal);
        let body = body.strip_suffix('\r').unwrap_or(body);
        self.with_style(style, |r| r.emit(body));
        self.advance_line();
        self.advance_line();
    }
}

/// A list item is a task item when its first paragraph opens with a
/// checkbox marker; the marker then replaces the bullet.
fn is_task_item(item: &MdNode) -> bool {
    match item.first_child() {
        Some(first) if first.kind == NodeKind::Paragraph => matches!(
            first.first_child().map(|c| &c.kind),
            Some(NodeKind::TaskMarker { .. })
        ),
        _ => false,
    }
}

pub(crate) fn image_label(title: Option<&str>, destination: &str) -> String {
    format!("![{}]({})", title.unwrap_or("Image"), destination)
}

// ============================================================================
// Tests
// ============================================================================
