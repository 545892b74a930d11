//! The operations every window on a tabpage supports.

use mudterm_layout::WindowId;
use mudterm_scrollback::SharedBuffer;
use mudterm_text::StyledText;

use crate::error::WindowError;

/// Result of [`Viewport::search_for_keyword`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SearchOutcome {
    /// The match starts at character `offset` of buffer line `line`.
    Found { line: usize, offset: usize },
    /// No match anywhere in that direction. Nothing moved.
    NotFound,
}

impl SearchOutcome {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// A rectangular view onto a scrollback buffer.
///
/// Scroll positions count display rows, so they stay meaningful when lines
/// wrap. Line indices are buffer indices, oldest first.
pub trait Viewport {
    fn id(&self) -> WindowId;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// The buffer whose lines this view shows.
    fn buffer(&self) -> &SharedBuffer;

    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);

    fn resize(&mut self, width: usize, height: usize);

    fn set_word_wrap(&mut self, word_wrap: bool);

    /// Exactly `height()` rows, top to bottom, none wider than `width()`.
    ///
    /// Each row's trailing flavor is the flavor the rest of its span should be
    /// filled with.
    fn display_lines(&mut self) -> Vec<StyledText>;

    /// Cursor column on the last row while a status line with a cursor is
    /// shown.
    fn status_cursor_column(&self) -> Option<usize>;

    /// Append text, continuing the newest line if it is still open.
    fn append(&mut self, text: &StyledText);

    fn append_line(&mut self, line: &StyledText);

    /// Buffer lines scrolled past at the bottom.
    fn scrollback(&self) -> usize;

    /// Scroll `count` display rows toward older output (positive) or newer
    /// output (negative).
    fn scroll_lines(&mut self, count: isize);

    /// Scroll by whole visible heights.
    fn scroll_pages(&mut self, count: isize);

    /// Scroll by the configured amount in the direction of `count`.
    fn scroll_by_setting(&mut self, count: isize);

    fn scroll_to_bottom(&mut self);

    /// Make the row holding `offset` of buffer line `line` visible.
    ///
    /// # Panics
    ///
    /// Panics if `line` is not in the buffer.
    fn scroll_to_buffer_line(&mut self, line: usize, offset: usize);

    /// Find `word` ignoring case, toward older output when `direction > 0`
    /// and newer output otherwise, continuing from the previous match.
    fn search_for_keyword(&mut self, word: &str, direction: isize) -> SearchOutcome;

    /// Show `text` in place of the status line until the next scroll or
    /// search.
    fn echo(&mut self, text: StyledText);

    fn clear_echo(&mut self);

    /// Replace the status line. `cursor` is a character index into `line`.
    fn update_status_line(
        &mut self,
        line: StyledText,
        cursor: Option<usize>,
    ) -> Result<(), WindowError>;
}
