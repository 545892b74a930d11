#![forbid(unsafe_code)]

//! Text primitives for the mudterm display engine.
//!
//! - [`StyledText`] - characters with a flavor each, plus a trailing flavor
//! - [`StyledSlice`] - borrowed view into styled text
//! - [`wrap`] - splitting logical lines into fixed-width display rows
//! - [`WrapCache`] - LRU cache of wrapped row counts
//! - [`ansi`] - SGR escape encoding used for persistence
//! - [`search`] - case-insensitive keyword search
//!
//! # Example
//! ```
//! use mudterm_style::Flavor;
//! use mudterm_text::{StyledText, WrapOptions, ansi, wrap};
//!
//! let mut line = StyledText::new();
//! line.push_str("Take ", Flavor::new().bold());
//! line.push_str("my love", Flavor::DEFAULT);
//!
//! assert_eq!(wrap::rendered_line_count(&line, WrapOptions::new(8)), 2);
//! assert_eq!(ansi::to_ansi(&line), "\x1b[1mTake \x1b[0mmy love");
//! ```

pub mod ansi;
pub mod line_cache;
pub mod search;
pub mod styled;
pub mod wrap;

pub use line_cache::{CacheStats, WrapCache};
pub use styled::{Chunk, LineSink, Run, StyledSlice, StyledText};
pub use wrap::{WrapOptions, display_width, rendered_line_count};
