//! `markdown_grid` — render a Markdown file full-screen in the terminal.
//!
//! The document is laid out inside a margin and held on screen until a key
//! is pressed or the hold time elapses. Resizing re-lays the document out.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use markdown_grid::terminal::{CrosstermBackend, TerminalBackend};
use markdown_grid::{Buffer, Markdown, MarkdownState, Style, Theme};

const SAMPLE: &str = include_str!("../demos/sample.md");

#[derive(Parser)]
#[command(name = "markdown_grid")]
#[command(about = "Render Markdown onto the terminal cell grid")]
struct Cli {
    /// Markdown file to show (defaults to a bundled sample)
    file: Option<PathBuf>,

    /// JSON theme file; omitted colours keep their defaults
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Blank cells kept around the document on every side
    #[arg(long, default_value_t = 2)]
    margin: u16,

    /// How long to keep the document on screen, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    hold_ms: u64,

    /// Write tracing output to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Install a file-backed subscriber. Nothing may print to the terminal while
/// the alternate screen is active, so without a file no subscriber is set.
fn setup_logging(path: &Path) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        setup_logging(path)?;
    }

    let text = match &cli.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => SAMPLE.to_string(),
    };
    let theme = match &cli.theme {
        Some(path) => Theme::load(path)?,
        None => Theme::default(),
    };

    let widget = Markdown::new(Style::EMPTY).with_theme(theme);
    let state = MarkdownState::new(text);

    let mut backend = CrosstermBackend::new();
    backend.init()?;
    let shown = show(&mut backend, &widget, &state, &cli);
    // Restore the terminal even when drawing failed
    let restored = backend.shutdown();
    shown?;
    restored?;
    Ok(())
}

/// Draw until a key press or the hold time runs out, redrawing on resize.
fn show(
    backend: &mut dyn TerminalBackend,
    widget: &Markdown,
    state: &MarkdownState,
    cli: &Cli,
) -> Result<()> {
    let deadline = Instant::now() + Duration::from_millis(cli.hold_ms);
    let mut drawn_size = None;
    let mut buffer = Buffer::new(0, 0);

    loop {
        let size = backend.size();
        if drawn_size != Some(size) {
            buffer.resize(size.0, size.1);
            buffer.clear();
            widget.render(buffer.area().inner(cli.margin), &mut buffer, state);
            backend.draw(&buffer)?;
            backend.flush()?;
            drawn_size = Some(size);
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        let wait = (deadline - now).min(Duration::from_millis(250));
        if backend.poll_key(wait)?.is_some() {
            return Ok(());
        }
    }
}
