//! Error types for the core crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the local data layer.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No frame with the given id exists in the store.
    #[error("frame {0} does not exist")]
    FrameNotFound(String),

    /// A state file exists, is non-empty and cannot be parsed.
    #[error("invalid file {path}: {reason}")]
    InvalidFile {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// A state file could not be read or written.
    #[error("impossible to access {path}: {source}")]
    Io {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `start` was called while a project is already running.
    #[error("project {0} is already started")]
    AlreadyStarted(String),

    /// `stop` or `cancel` was called with no project running.
    #[error("no project started")]
    NotStarted,

    /// `start` was called with an empty project name.
    #[error("no project given")]
    EmptyProject,
}

impl CoreError {
    /// Creates an [`CoreError::Io`] carrying the file path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an [`CoreError::InvalidFile`] carrying the file path.
    pub fn invalid_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
