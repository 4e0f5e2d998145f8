//! Theme Module — Colour palette used by the node dispatcher.
//!
//! Responsibilities:
//! - Built-in default palette (cyan headings, yellow-on-dark-gray code,
//!   gray quotes/HTML, blue links)
//! - JSON theme files, where any omitted field keeps its default

use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::types::{color, rgb};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    #[serde(deserialize_with = "de_color")]
    pub heading_fg: u32,
    #[serde(deserialize_with = "de_color")]
    pub code_fg: u32,
    #[serde(deserialize_with = "de_color")]
    pub code_bg: u32,
    #[serde(deserialize_with = "de_color")]
    pub quote_fg: u32,
    #[serde(deserialize_with = "de_color")]
    pub html_fg: u32,
    #[serde(deserialize_with = "de_color")]
    pub link_fg: u32,
    #[serde(deserialize_with = "de_color")]
    pub strikethrough_fg: u32,
    /// Prefix glyph for unordered list items.
    pub bullet: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            heading_fg: color::CYAN,
            code_fg: color::YELLOW,
            code_bg: color::DARK_GRAY,
            quote_fg: color::GRAY,
            html_fg: color::GRAY,
            link_fg: color::BLUE,
            strikethrough_fg: color::DARK_GRAY,
            bullet: "•".to_string(),
        }
    }
}

impl Theme {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let theme = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded theme");
        Ok(theme)
    }
}

/// Parse a colour string: palette name, `#rrggbb`, or a palette index.
pub fn parse_color(value: &str) -> Result<u32> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("default") || value.eq_ignore_ascii_case("reset") {
        return Ok(0);
    }
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 6 {
            if let Ok(v) = u32::from_str_radix(hex, 16) {
                return Ok(rgb((v >> 16) as u8, (v >> 8) as u8, v as u8));
            }
        }
        return Err(Error::InvalidColor(value.to_string()));
    }
    if let Ok(index) = value.parse::<u8>() {
        return Ok(crate::types::indexed(index));
    }
    color::by_name(&value.to_ascii_lowercase()).ok_or_else(|| Error::InvalidColor(value.to_string()))
}

fn de_color<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_color(&raw).map_err(serde::de::Error::custom)
}
