#![forbid(unsafe_code)]

//! Scrollback storage for the mudterm display engine.
//!
//! A [`ScrollbackBuffer`] keeps the newest `capacity` logical lines. In
//! memory mode evicted lines are dropped; in persistent mode they move to an
//! append-only file of SGR-encoded lines that is read back lazily and
//! compacted on [`flush`](ScrollbackBuffer::flush).
//!
//! # Example
//! ```no_run
//! use mudterm_scrollback::ScrollbackBuffer;
//! use mudterm_text::StyledText;
//!
//! let mut buffer = ScrollbackBuffer::new(20_000);
//! buffer.set_persistent("serenity.log")?;
//! buffer.append_line(&StyledText::plain("Take my love"));
//! buffer.set_not_persistent()?;
//! # Ok::<(), mudterm_scrollback::PersistError>(())
//! ```

pub mod buffer;
pub mod disk;
pub mod error;
pub mod persistent;
pub mod ring;

pub use buffer::{
    BufferId, BufferStamp, DEFAULT_SCROLLBACK_LINES, ScrollbackBuffer, SharedBuffer,
};
pub use error::{BufferError, BufferResult, PersistError, PersistResult};
pub use persistent::{DEFAULT_READ_CACHE_LINES, DiskBackedLines};
