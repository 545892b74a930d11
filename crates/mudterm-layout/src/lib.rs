#![forbid(unsafe_code)]

//! Window layout for the mudterm display engine.
//!
//! A [`LayoutTree`] divides a tabpage's rows among its windows. Windows are
//! stacked top to bottom with one separator row between neighbours; new
//! windows go to the top of the stack.
//!
//! # Example
//! ```
//! use mudterm_layout::{LayoutTree, Orientation, SplitSize, WindowId};
//!
//! let primary = WindowId::next();
//! let mut tree = LayoutTree::new(primary, 80, 8);
//!
//! let status = WindowId::next();
//! tree.split(primary, status, Orientation::Rows, SplitSize::Rows(2))?;
//!
//! // Two rows plus a status line, one separator, and the rest for the primary.
//! assert_eq!(tree.height_of(status), Some(3));
//! assert_eq!(tree.height_of(primary), Some(4));
//! assert_eq!(tree.separator_rows(), [3]);
//! # Ok::<(), mudterm_layout::LayoutError>(())
//! ```

pub mod error;
pub mod tree;

pub use error::{LayoutError, LayoutResult};
pub use tree::{
    DEFAULT_MIN_HEIGHT, LayoutTree, NodeId, NodeKind, NodeRecord, Orientation, Placement,
    SplitSize, WindowId,
};
