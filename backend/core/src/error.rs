use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the pagetree command engine.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("malformed page description in {}: {reason}", .path.display())]
    MalformedPage { path: PathBuf, reason: String },

    #[error("trying to load non-existing stable configuration: {}", .0.display())]
    MissingStableSnapshot(PathBuf),

    #[error("command /{command} failed its dry run: {message}")]
    ValidationFailure { command: String, message: String },

    #[error("duplicate command /{0}")]
    DuplicateCommand(String),

    #[error("page /{command} renders to {len} characters, the limit is {limit}")]
    PageTooLong {
        command: String,
        len: usize,
        limit: usize,
    },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stable configuration failed to load: {0}")]
    StableSnapshotBroken(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BotError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedPage {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
