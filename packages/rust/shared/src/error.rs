//! Error types for doxbook.
//!
//! Library crates use [`DoxbookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all doxbook operations.
#[derive(Debug, thiserror::Error)]
pub enum DoxbookError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed doc comment in a source file.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Comment records could not be rendered to markdown.
    #[error("render error: {0}")]
    Render(String),

    /// Source glob pattern could not be compiled or expanded.
    #[error("glob error: {message}")]
    Glob { message: String },

    /// Book metadata persistence error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty summary, bad config value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A fan-out task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DoxbookError>;

impl DoxbookError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a glob error from any displayable message.
    pub fn glob(msg: impl Into<String>) -> Self {
        Self::Glob {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DoxbookError::config("concurrency must be at least 1");
        assert_eq!(err.to_string(), "config error: concurrency must be at least 1");

        let err = DoxbookError::parse("unterminated comment at line 3");
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn io_error_names_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DoxbookError::io("dox/a.md", source);
        let msg = err.to_string();
        assert!(msg.contains("dox/a.md"));
        assert!(msg.contains("gone"));
    }
}
