//! TerminalBackend trait + CrosstermBackend implementation.
//!
//! The demo binary presents rendered buffers through this trait rather than
//! through crossterm directly, so a headless backend can stand in for tests.
//! Every frame is drawn in full; there is no diffing.

use std::time::Duration;

use crossterm::event::KeyCode;

use crate::error::{Error, Result};
use crate::types::Buffer;

// ============================================================================
// TerminalBackend Trait
// ============================================================================

pub trait TerminalBackend {
    fn init(&mut self) -> Result<()>;
    fn shutdown(&mut self) -> Result<()>;
    fn size(&self) -> (u16, u16);
    fn draw(&mut self, buffer: &Buffer) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    /// Wait up to `timeout` for a key press. Resize events update `size()`
    /// and yield `None`.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>>;
}

// ============================================================================
// CrosstermBackend
// ============================================================================

pub struct CrosstermBackend {
    width: u16,
    height: u16,
}

impl CrosstermBackend {
    pub fn new() -> Self {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        Self {
            width: w,
            height: h,
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalBackend for CrosstermBackend {
    fn init(&mut self) -> Result<()> {
        use crossterm::{
            cursor,
            terminal::{enable_raw_mode, EnterAlternateScreen},
            ExecutableCommand,
        };

        enable_raw_mode().map_err(Error::terminal("raw mode"))?;
        let mut stdout = std::io::stdout();
        stdout
            .execute(EnterAlternateScreen)
            .map_err(Error::terminal("alternate screen"))?;
        stdout
            .execute(cursor::Hide)
            .map_err(Error::terminal("hide cursor"))?;

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        self.width = w;
        self.height = h;
        tracing::debug!(width = w, height = h, "terminal initialised");

        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        use crossterm::{
            cursor,
            terminal::{disable_raw_mode, LeaveAlternateScreen},
            ExecutableCommand,
        };

        let mut stdout = std::io::stdout();
        stdout
            .execute(cursor::Show)
            .map_err(Error::terminal("show cursor"))?;
        stdout
            .execute(LeaveAlternateScreen)
            .map_err(Error::terminal("leave alternate screen"))?;
        disable_raw_mode().map_err(Error::terminal("disable raw mode"))?;

        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or((self.width, self.height))
    }

    fn draw(&mut self, buffer: &Buffer) -> Result<()> {
        use crate::types::{color_to_crossterm, CellAttrs};
        use crossterm::{
            cursor::MoveTo,
            style::{
                Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
            },
            terminal::{Clear, ClearType},
            QueueableCommand,
        };

        let mut stdout = std::io::stdout();
        stdout
            .queue(Clear(ClearType::All))
            .map_err(Error::terminal("clear"))?;

        for y in 0..buffer.height {
            stdout
                .queue(MoveTo(0, y))
                .map_err(Error::terminal("move"))?;

            for x in 0..buffer.width {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                // Continuation of a wide glyph; the terminal already advanced
                if cell.symbol.is_empty() {
                    continue;
                }

                let fg = color_to_crossterm(cell.style.fg).unwrap_or(Color::Reset);
                let bg = color_to_crossterm(cell.style.bg).unwrap_or(Color::Reset);
                stdout
                    .queue(SetForegroundColor(fg))
                    .map_err(Error::terminal("fg"))?;
                stdout
                    .queue(SetBackgroundColor(bg))
                    .map_err(Error::terminal("bg"))?;

                let attrs = cell.style.attrs;
                if attrs.contains(CellAttrs::BOLD) {
                    stdout
                        .queue(SetAttribute(Attribute::Bold))
                        .map_err(Error::terminal("bold"))?;
                }
                if attrs.contains(CellAttrs::ITALIC) {
                    stdout
                        .queue(SetAttribute(Attribute::Italic))
                        .map_err(Error::terminal("italic"))?;
                }
                if attrs.contains(CellAttrs::UNDERLINE) {
                    stdout
                        .queue(SetAttribute(Attribute::Underlined))
                        .map_err(Error::terminal("underline"))?;
                }

                stdout
                    .queue(Print(&cell.symbol))
                    .map_err(Error::terminal("print"))?;

                // Reset attributes after each cell
                stdout
                    .queue(SetAttribute(Attribute::Reset))
                    .map_err(Error::terminal("reset"))?;
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush().map_err(Error::terminal("flush"))
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>> {
        use crossterm::event::{self, Event, KeyEventKind};

        if !event::poll(timeout).map_err(Error::terminal("poll"))? {
            return Ok(None);
        }
        match event::read().map_err(Error::terminal("read"))? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key.code)),
            Event::Resize(w, h) => {
                self.width = w;
                self.height = h;
                tracing::debug!(width = w, height = h, "terminal resized");
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

// ============================================================================
// HeadlessBackend (for testing and CI environments)
// ============================================================================

/// Fixed-size backend that records every drawn frame and replays queued keys.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub width: u16,
    pub height: u16,
    pub frames: Vec<Buffer>,
    pub queued_keys: Vec<KeyCode>,
    pub active: bool,
}

impl HeadlessBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }
}

impl TerminalBackend for HeadlessBackend {
    fn init(&mut self) -> Result<()> {
        self.active = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.active = false;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn draw(&mut self, buffer: &Buffer) -> Result<()> {
        self.frames.push(buffer.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<KeyCode>> {
        if self.queued_keys.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.queued_keys.remove(0)))
        }
    }
}
