//! Layout errors.

use std::fmt;

use crate::tree::{Orientation, WindowId};

/// Errors from [`LayoutTree`](crate::LayoutTree) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The window is not part of this layout.
    WindowNotFound(WindowId),
    /// The window is already part of this layout.
    DuplicateWindow(WindowId),
    /// The primary window cannot be closed.
    CannotClosePrimary,
    /// Only row stacking is supported.
    UnsupportedOrientation(Orientation),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowNotFound(id) => write!(f, "no such window on this tabpage: {id}"),
            Self::DuplicateWindow(id) => write!(f, "{id} is already on this tabpage"),
            Self::CannotClosePrimary => write!(f, "you cannot close the primary window"),
            Self::UnsupportedOrientation(orientation) => {
                write!(f, "unsupported split orientation: {orientation:?}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Result alias for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
