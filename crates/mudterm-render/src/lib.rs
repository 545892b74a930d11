#![forbid(unsafe_code)]

//! Character grid that mudterm windows render into.
//!
//! # Example
//! ```
//! use mudterm_render::DisplaySurface;
//! use mudterm_text::StyledText;
//!
//! let mut surface = DisplaySurface::new(20, 2);
//! surface.write_text(0, 1, 20, &StyledText::plain("Take my love"));
//! assert_eq!(surface.to_lines(), ["", "Take my love"]);
//! ```

pub mod cell;
pub mod surface;

pub use cell::{Cell, CellFlags};
pub use surface::DisplaySurface;
