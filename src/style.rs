//! Style Module — Immutable cell style values.
//!
//! Responsibilities:
//! - Foreground/background colour plus attribute flags per cell
//! - Composition: every setter derives a new value and leaves the
//!   receiver untouched, so scoped overrides restore exactly

use crate::types::{CellAttrs, COLOR_DEFAULT};

/// Colours use the u32 encoding from [`crate::types`]; `0` means the
/// terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: u32,
    pub bg: u32,
    pub attrs: CellAttrs,
}

impl Style {
    pub const EMPTY: Style = Style {
        fg: COLOR_DEFAULT,
        bg: COLOR_DEFAULT,
        attrs: CellAttrs::empty(),
    };

    pub fn bold(self) -> Self {
        self.add_attrs(CellAttrs::BOLD)
    }

    pub fn italic(self) -> Self {
        self.add_attrs(CellAttrs::ITALIC)
    }

    pub fn underlined(self) -> Self {
        self.add_attrs(CellAttrs::UNDERLINE)
    }

    pub fn fg(self, color: u32) -> Self {
        Self { fg: color, ..self }
    }

    pub fn bg(self, color: u32) -> Self {
        Self { bg: color, ..self }
    }

    pub fn add_attrs(self, attrs: CellAttrs) -> Self {
        Self {
            attrs: self.attrs | attrs,
            ..self
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::color;

    #[test]
    fn test_setters_preserve_other_fields() {
        let base = Style::EMPTY.fg(color::RED).italic();
        let derived = base.bold().bg(color::DARK_GRAY);

        assert_eq!(derived.fg, color::RED);
        assert_eq!(derived.bg, color::DARK_GRAY);
        assert!(derived.attrs.contains(CellAttrs::ITALIC | CellAttrs::BOLD));
        // Receiver is unchanged
        assert_eq!(base.bg, COLOR_DEFAULT);
        assert!(!base.attrs.contains(CellAttrs::BOLD));
    }

    #[test]
    fn test_fg_overrides_only_colour() {
        let s = Style::EMPTY.underlined().fg(color::BLUE).fg(color::CYAN);
        assert_eq!(s.fg, color::CYAN);
        assert!(s.attrs.contains(CellAttrs::UNDERLINE));
    }

    #[test]
    fn test_default_is_empty() {
        assert_eq!(Style::default(), Style::EMPTY);
        assert!(Style::default().attrs.is_empty());
    }
}
