//! Error types for scrollback storage.

use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Persistence errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from disk-backed scrollback.
#[derive(Debug)]
pub enum PersistError {
    /// I/O error while writing or compacting the scrollback file.
    Io(io::Error),
    /// The buffer already persists to a file.
    AlreadyPersistent(PathBuf),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "I/O error: {e}"),
            PersistError::AlreadyPersistent(path) => {
                write!(f, "buffer already persists to {}", path.display())
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::AlreadyPersistent(_) => None,
        }
    }
}

impl From<io::Error> for PersistError {
    fn from(e: io::Error) -> Self {
        PersistError::Io(e)
    }
}

/// Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

// ─────────────────────────────────────────────────────────────────────────────
// Buffer errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from line-level buffer edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A replacement line had a `\n` before its end.
    EmbeddedNewline { index: usize },
    /// The line only exists in the persisted file and cannot be edited.
    LineOnDisk { index: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::EmbeddedNewline { index } => {
                write!(f, "line {index} must not contain embedded newlines")
            }
            BufferError::LineOnDisk { index } => {
                write!(f, "line {index} is persisted and cannot be modified")
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// Result type for buffer edits.
pub type BufferResult<T> = Result<T, BufferError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_errors_keep_their_source() {
        let err = PersistError::from(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        assert!(err.to_string().contains("nope"));
        assert!(err.source().is_some());
    }

    #[test]
    fn display_messages() {
        let err = PersistError::AlreadyPersistent(PathBuf::from("/tmp/serenity.log"));
        assert!(err.to_string().contains("serenity.log"));
        assert!(err.source().is_none());
        assert_eq!(
            BufferError::EmbeddedNewline { index: 3 }.to_string(),
            "line 3 must not contain embedded newlines"
        );
    }
}
