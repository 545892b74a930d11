//! Errors for the display engine facade.
//!
//! Each lower crate keeps its own error enum; [`Error`] wraps them so engine
//! callers can use `?` across crate boundaries.

use std::fmt;

use mudterm_layout::{LayoutError, WindowId};
use mudterm_scrollback::{BufferError, PersistError};

/// Errors from a single window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// Only focusable windows have a status line.
    NotFocusable(WindowId),
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFocusable(id) => write!(f, "{id} cannot be focused and has no status line"),
        }
    }
}

impl std::error::Error for WindowError {}

/// Errors from render transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionError {
    /// `finish_update` without a matching `begin_update`.
    Unbalanced,
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbalanced => write!(f, "finish_update called outside of an update"),
        }
    }
}

impl std::error::Error for TransactionError {}

/// Any engine error.
#[derive(Debug)]
pub enum Error {
    Persist(PersistError),
    Buffer(BufferError),
    Layout(LayoutError),
    Window(WindowError),
    Transaction(TransactionError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persist(e) => write!(f, "scrollback persistence: {e}"),
            Self::Buffer(e) => write!(f, "scrollback: {e}"),
            Self::Layout(e) => write!(f, "layout: {e}"),
            Self::Window(e) => write!(f, "window: {e}"),
            Self::Transaction(e) => write!(f, "render transaction: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Persist(e) => Some(e),
            Self::Buffer(e) => Some(e),
            Self::Layout(e) => Some(e),
            Self::Window(e) => Some(e),
            Self::Transaction(e) => Some(e),
        }
    }
}

impl From<PersistError> for Error {
    fn from(e: PersistError) -> Self {
        Self::Persist(e)
    }
}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

impl From<LayoutError> for Error {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<WindowError> for Error {
    fn from(e: WindowError) -> Self {
        Self::Window(e)
    }
}

impl From<TransactionError> for Error {
    fn from(e: TransactionError) -> Self {
        Self::Transaction(e)
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
