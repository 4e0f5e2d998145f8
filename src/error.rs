//! Error types for the fallible edges of the crate.
//!
//! Layout never fails; only theme loading and terminal I/O do.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid theme: {0}")]
    ThemeParse(#[from] serde_json::Error),

    #[error("invalid colour {0:?}: expected a palette name, #rrggbb, or 0-255")]
    InvalidColor(String),

    #[error("terminal {op}: {source}")]
    Terminal {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn terminal(op: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Terminal { op, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
