//! Shared types, enums, and constants.
//!
//! Everything that crosses module boundaries lives here: the render area
//! rectangle, the colour encoding, cell attributes, and the cell grid that
//! rendering writes into.

use bitflags::bitflags;
use unicode_width::UnicodeWidthStr;

use crate::style::Style;

// ============================================================================
// Rect
// ============================================================================

/// A rectangle in absolute grid coordinates. `right()` and `bottom()` are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Shrink the rect by `margin` cells on every side.
    pub fn inner(self, margin: u16) -> Self {
        let doubled = margin.saturating_mul(2);
        Self {
            x: self.x.saturating_add(margin),
            y: self.y.saturating_add(margin),
            width: self.width.saturating_sub(doubled),
            height: self.height.saturating_sub(doubled),
        }
    }
}

// ============================================================================
// Color Encoding (u32)
// ============================================================================
//
// Bits 31-24: Mode tag
//   0x00 = Default (terminal default)
//   0x01 = RGB truecolor (bits 23-0 = 0xRRGGBB)
//   0x02 = Indexed (bits 7-0 = palette index 0-255)

pub const COLOR_DEFAULT: u32 = 0x00000000;

pub fn color_tag(color: u32) -> u8 {
    ((color >> 24) & 0xFF) as u8
}

pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0x01000000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

pub const fn indexed(index: u8) -> u32 {
    0x02000000 | (index as u32)
}

/// The sixteen-colour ANSI palette, encoded as indexed colours.
pub mod color {
    use super::indexed;

    pub const BLACK: u32 = indexed(0);
    pub const RED: u32 = indexed(1);
    pub const GREEN: u32 = indexed(2);
    pub const YELLOW: u32 = indexed(3);
    pub const BLUE: u32 = indexed(4);
    pub const MAGENTA: u32 = indexed(5);
    pub const CYAN: u32 = indexed(6);
    pub const GRAY: u32 = indexed(7);
    pub const DARK_GRAY: u32 = indexed(8);
    pub const LIGHT_RED: u32 = indexed(9);
    pub const LIGHT_GREEN: u32 = indexed(10);
    pub const LIGHT_YELLOW: u32 = indexed(11);
    pub const LIGHT_BLUE: u32 = indexed(12);
    pub const LIGHT_MAGENTA: u32 = indexed(13);
    pub const LIGHT_CYAN: u32 = indexed(14);
    pub const WHITE: u32 = indexed(15);

    /// Look up a palette colour by its snake_case name.
    pub fn by_name(name: &str) -> Option<u32> {
        let c = match name {
            "black" => BLACK,
            "red" => RED,
            "green" => GREEN,
            "yellow" => YELLOW,
            "blue" => BLUE,
            "magenta" => MAGENTA,
            "cyan" => CYAN,
            "gray" | "grey" => GRAY,
            "dark_gray" | "dark_grey" => DARK_GRAY,
            "light_red" => LIGHT_RED,
            "light_green" => LIGHT_GREEN,
            "light_yellow" => LIGHT_YELLOW,
            "light_blue" => LIGHT_BLUE,
            "light_magenta" => LIGHT_MAGENTA,
            "light_cyan" => LIGHT_CYAN,
            "white" => WHITE,
            _ => return None,
        };
        Some(c)
    }
}

pub fn color_to_crossterm(color: u32) -> Option<crossterm::style::Color> {
    match color_tag(color) {
        0x00 => None, // Default: no override
        0x01 => {
            let r = ((color >> 16) & 0xFF) as u8;
            let g = ((color >> 8) & 0xFF) as u8;
            let b = (color & 0xFF) as u8;
            Some(crossterm::style::Color::Rgb { r, g, b })
        }
        0x02 => {
            let index = (color & 0xFF) as u8;
            Some(crossterm::style::Color::AnsiValue(index))
        }
        _ => None, // Unknown tag, treated as default
    }
}

// ============================================================================
// Cell Attributes (bitflags)
// ============================================================================

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellAttrs: u8 {
        const BOLD      = 0b0000_0001;
        const ITALIC    = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
    }
}

// ============================================================================
// Cell & Buffer
// ============================================================================

/// One grid position: the grapheme cluster shown there and its style.
/// A continuation cell of a double-width glyph has an empty symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub symbol: String,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: " ".to_string(),
            style: Style::EMPTY,
        }
    }
}

/// Anything rendering can write styled glyphs into.
pub trait CellSink {
    /// Place `symbol` at (`x`, `y`). Implementations ignore coordinates
    /// outside their own bounds.
    fn set_symbol(&mut self, x: u16, y: u16, symbol: &str, style: Style);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = (width as usize) * (height as usize);
        self.cells.resize(size, Cell::default());
        self.clear();
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Text of one row: symbols left to right with leading and trailing
    /// blanks removed. Continuation cells contribute nothing.
    pub fn line_text(&self, y: u16) -> String {
        let mut line = String::new();
        let mut seen = false;
        for x in 0..self.width {
            let Some(cell) = self.get(x, y) else { break };
            if cell.symbol.is_empty() {
                continue;
            }
            if cell.symbol == " " {
                if seen {
                    line.push(' ');
                }
            } else {
                line.push_str(&cell.symbol);
                seen = true;
            }
        }
        line.trim_end().to_string()
    }
}

impl CellSink for Buffer {
    fn set_symbol(&mut self, x: u16, y: u16, symbol: &str, style: Style) {
        let Some(i) = self.index(x, y) else { return };
        self.cells[i] = Cell {
            symbol: symbol.to_string(),
            style,
        };
        if UnicodeWidthStr::width(symbol) > 1 {
            if let Some(next) = x.checked_add(1).and_then(|nx| self.index(nx, y)) {
                self.cells[next] = Cell {
                    symbol: String::new(),
                    style,
                };
            }
        }
    }
}
