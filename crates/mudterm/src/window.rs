//! A scrollable, searchable window onto a scrollback buffer.
//!
//! The scroll position is a pair: `scrollback_bottom` counts buffer lines
//! hidden below the bottom of the window, and `scrollback_offset` counts the
//! display rows of the bottom line that are hidden as well. `(0, 0)` is the
//! live bottom of the buffer.
//!
//! Buffers are shared, so a window cannot rely on seeing every append. It
//! keeps the [`BufferStamp`] it last synced with and, before doing anything,
//! catches up: lines pushed while it was scrolled move its position so the
//! visible rows stay put.

use std::ops::Range;
use std::sync::Arc;

use mudterm_layout::WindowId;
use mudterm_scrollback::{BufferStamp, ScrollbackBuffer, SharedBuffer};
use mudterm_style::Flavor;
use mudterm_text::search::{find_ignore_case, rfind_ignore_case};
use mudterm_text::wrap::{self, WrapOptions, char_width};
use mudterm_text::{CacheStats, StyledText, WrapCache};

use crate::config::EngineConfig;
use crate::error::WindowError;
use crate::viewport::{SearchOutcome, Viewport};

const ELLIPSIS: char = '…';

#[derive(Debug, Default)]
struct SearchState {
    keyword: Vec<char>,
    /// `(line, offset)` of the current match.
    result: Option<(usize, usize)>,
}

/// A view onto a [`SharedBuffer`].
///
/// Focusable windows reserve their last row for a status line. A window whose
/// status line overlays its output hides the newest display row beneath it
/// instead.
#[derive(Debug)]
pub struct Window {
    id: WindowId,
    buffer: SharedBuffer,
    width: usize,
    height: usize,
    focusable: bool,
    status_overlays_output: bool,
    focused: bool,
    status: StyledText,
    status_cursor: Option<usize>,
    echo: Option<StyledText>,
    word_wrap: bool,
    scroll_setting: usize,
    scrollback_bottom: usize,
    scrollback_offset: usize,
    search: SearchState,
    synced: BufferStamp,
    synced_len: usize,
    last_line_rows: usize,
    wrap_cache: WrapCache,
}

impl Window {
    /// An unfocusable, word-wrapping window.
    pub fn new(buffer: SharedBuffer, width: usize, height: usize) -> Self {
        let mut window = Self {
            id: WindowId::next(),
            buffer,
            width,
            height,
            focusable: false,
            status_overlays_output: false,
            focused: false,
            status: StyledText::new(),
            status_cursor: None,
            echo: None,
            word_wrap: true,
            scroll_setting: 0,
            scrollback_bottom: 0,
            scrollback_offset: 0,
            search: SearchState::default(),
            synced: BufferStamp::default(),
            synced_len: 0,
            last_line_rows: 0,
            wrap_cache: WrapCache::default(),
        };
        window.resync();
        window
    }

    /// A window using the wrap, scroll and cache settings of `config`.
    pub fn from_config(
        buffer: SharedBuffer,
        width: usize,
        height: usize,
        config: &EngineConfig,
    ) -> Self {
        let mut window = Self::new(buffer, width, height).with_scroll_setting(config.scroll);
        window.word_wrap = config.word_wrap;
        window.wrap_cache = WrapCache::new(config.wrap_cache_lines);
        window.resync();
        window
    }

    #[must_use]
    pub fn with_focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    #[must_use]
    pub fn with_status_overlays_output(mut self, overlays: bool) -> Self {
        self.status_overlays_output = overlays;
        self
    }

    #[must_use]
    pub fn with_word_wrap(mut self, word_wrap: bool) -> Self {
        self.word_wrap = word_wrap;
        self.resync();
        self
    }

    /// Rows moved by [`scroll_by_setting`](Viewport::scroll_by_setting);
    /// zero means half the visible height.
    #[must_use]
    pub fn with_scroll_setting(mut self, rows: usize) -> Self {
        self.scroll_setting = rows;
        self
    }

    #[must_use]
    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    #[must_use]
    pub fn word_wrap(&self) -> bool {
        self.word_wrap
    }

    pub fn set_scroll_setting(&mut self, rows: usize) {
        self.scroll_setting = rows;
    }

    /// Display rows of the bottom line hidden below the window.
    #[must_use]
    pub fn scrollback_offset(&self) -> usize {
        self.scrollback_offset
    }

    #[must_use]
    pub fn status(&self) -> &StyledText {
        &self.status
    }

    #[must_use]
    pub fn echo_text(&self) -> Option<&StyledText> {
        self.echo.as_ref()
    }

    /// `(line, offset)` of the highlighted search match.
    #[must_use]
    pub fn search_result(&self) -> Option<(usize, usize)> {
        self.search.result
    }

    #[must_use]
    pub fn wrap_cache_stats(&self) -> CacheStats {
        self.wrap_cache.stats()
    }

    /// Rows available to buffer content.
    #[must_use]
    pub fn content_height(&self) -> usize {
        if self.focusable {
            self.height.saturating_sub(1)
        } else {
            self.height
        }
    }

    fn options(&self) -> WrapOptions {
        WrapOptions::new(self.width).word_wrap(self.word_wrap)
    }

    fn at_bottom(&self) -> bool {
        self.scrollback_bottom == 0 && self.scrollback_offset == 0
    }

    // ─────────────────────────────────────────────────────────────────────
    // Buffer tracking
    // ─────────────────────────────────────────────────────────────────────

    fn rows_of(&mut self, buffer: &mut ScrollbackBuffer, index: usize) -> usize {
        let options = self.options();
        self.wrap_cache.rendered_line_count(buffer.line(index), options)
    }

    fn last_rows(&mut self, buffer: &mut ScrollbackBuffer) -> usize {
        match buffer.len() {
            0 => 0,
            len => self.rows_of(buffer, len - 1),
        }
    }

    /// Catch up with changes made to the buffer since the last sync.
    fn sync(&mut self, buffer: &mut ScrollbackBuffer) {
        let stamp = buffer.stamp();
        if stamp == self.synced {
            return;
        }
        let len = buffer.len();
        if stamp.generation == self.synced.generation {
            let added = stamp.pushed.saturating_sub(self.synced.pushed);
            let added = usize::try_from(added).unwrap_or(usize::MAX);
            // Evicted lines shift every index down.
            let evicted = self.synced_len.saturating_add(added).saturating_sub(len);
            self.search.result = self
                .search
                .result
                .and_then(|(line, offset)| Some((line.checked_sub(evicted)?, offset)));
            if !self.at_bottom() {
                if self.scrollback_bottom == 0 && added < len {
                    // The line we are offset into may have grown.
                    let rows = self.rows_of(buffer, len - 1 - added);
                    self.scrollback_offset += rows.saturating_sub(self.last_line_rows);
                }
                self.scrollback_bottom = self.scrollback_bottom.saturating_add(added);
            }
        } else {
            self.search.result = None;
        }
        self.search.result = self.search.result.filter(|&(line, _)| line < len);
        self.clamp(buffer);
        self.synced = stamp;
        self.synced_len = len;
        self.last_line_rows = self.last_rows(buffer);
    }

    fn clamp(&mut self, buffer: &mut ScrollbackBuffer) {
        let len = buffer.len();
        if len == 0 {
            self.scrollback_bottom = 0;
            self.scrollback_offset = 0;
            return;
        }
        self.scrollback_bottom = self.scrollback_bottom.min(len - 1);
        let rows = self.rows_of(buffer, len - 1 - self.scrollback_bottom);
        self.scrollback_offset = self.scrollback_offset.min(rows - 1);
    }

    /// Sync, then re-clamp for a new width or wrap mode.
    fn resync(&mut self) {
        let buffer = Arc::clone(&self.buffer);
        let mut buffer = buffer.lock();
        self.sync(&mut buffer);
        self.clamp(&mut buffer);
        self.last_line_rows = self.last_rows(&mut buffer);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Visible rows
    // ─────────────────────────────────────────────────────────────────────

    /// `(line, row)` of the lowest row showing buffer content.
    fn bottom_row(&mut self, buffer: &mut ScrollbackBuffer) -> Option<(usize, usize)> {
        let len = buffer.len();
        if len == 0 || self.content_height() == 0 {
            return None;
        }
        let line = len - 1 - self.scrollback_bottom;
        let rows = self.rows_of(buffer, line);
        let bottom = (line, rows - 1 - self.scrollback_offset);
        if self.focusable && self.status_overlays_output {
            self.row_above(buffer, bottom)
        } else {
            Some(bottom)
        }
    }

    fn row_above(
        &mut self,
        buffer: &mut ScrollbackBuffer,
        (line, row): (usize, usize),
    ) -> Option<(usize, usize)> {
        if row > 0 {
            Some((line, row - 1))
        } else if line > 0 {
            let rows = self.rows_of(buffer, line - 1);
            Some((line - 1, rows - 1))
        } else {
            None
        }
    }

    /// Visible `(line, row)` pairs, bottom first.
    fn visible_rows(&mut self, buffer: &mut ScrollbackBuffer) -> Vec<(usize, usize)> {
        let mut rows = Vec::with_capacity(self.content_height());
        let mut current = self.bottom_row(buffer);
        while let Some(position) = current {
            rows.push(position);
            if rows.len() == self.content_height() {
                break;
            }
            current = self.row_above(buffer, position);
        }
        rows
    }

    /// Scroll so `offset` of `line` is visible, moving only if it is not.
    fn reveal(&mut self, buffer: &mut ScrollbackBuffer, line: usize, offset: usize) {
        let options = self.options();
        let text = buffer.line(line);
        let rows = wrap::rendered_line_count(text, options);
        let row = wrap::split_index_of_offset(text, options, offset).unwrap_or(rows - 1);
        if self.visible_rows(buffer).contains(&(line, row)) {
            return;
        }
        let len = buffer.len();
        let (line, row, rows) = if self.focusable && self.status_overlays_output {
            // The status line covers the anchor row.
            if row + 1 < rows {
                (line, row + 1, rows)
            } else if line + 1 < len {
                (line + 1, 0, self.rows_of(buffer, line + 1))
            } else {
                (line, row, rows)
            }
        } else {
            (line, row, rows)
        };
        self.scrollback_bottom = len - 1 - line;
        self.scrollback_offset = rows - 1 - row;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    fn status_row(&self) -> StyledText {
        if !self.focused {
            return StyledText::plain(&"-".repeat(self.width));
        }
        match &self.echo {
            Some(echo) => clip(echo, 0, echo.len(), self.width, None),
            None => fit_status_line(&self.status, self.status_cursor, self.width).0,
        }
    }

    fn content_rows(&mut self, buffer: &mut ScrollbackBuffer) -> Vec<StyledText> {
        let content = self.content_height();
        let len = buffer.len();
        if len == 0 || content == 0 {
            return Vec::new();
        }

        let options = self.options();
        let width = self.width;
        let keyword_len = self.search.keyword.len();
        let result = self.search.result;

        let start = len - 1 - self.scrollback_bottom;
        let end = start.saturating_sub(content);
        let mut workspace = Vec::new();
        for index in end..=start {
            let line = buffer.line(index);
            let ranges = wrap::wrap(line, options);
            let last = ranges.len() - 1;
            for (row, &(from, to)) in ranges.iter().enumerate() {
                let highlight = result
                    .filter(|&(l, _)| l == index)
                    .map(|(_, offset)| offset..offset + keyword_len);
                let mut text = clip(line, from, to, width, highlight);
                let fill = if row == last {
                    line.trailing_flavor()
                        .or_else(|| newline_flavor(line))
                        .or_else(|| text.last_flavor())
                } else {
                    text.last_flavor()
                };
                text.set_trailing_flavor(fill);
                workspace.push(text);
            }
        }

        let mut display_end = workspace.len().saturating_sub(self.scrollback_offset);
        if self.focusable && self.status_overlays_output {
            display_end = display_end.saturating_sub(1);
        }
        let display_start = display_end.saturating_sub(content);
        workspace.truncate(display_end);
        workspace.drain(..display_start);
        workspace
    }
}

/// Copy `from..to` of `line`, dropping whatever does not fit in `width`
/// columns and inverting characters in `highlight`.
fn clip(
    line: &StyledText,
    from: usize,
    to: usize,
    width: usize,
    highlight: Option<Range<usize>>,
) -> StyledText {
    let mut row = StyledText::new();
    let mut used = 0;
    for index in from..to {
        let ch = line.chars()[index];
        let mut flavor = line.flavor_at(index);
        let w = char_width(ch, flavor.is_hidden());
        if used + w > width {
            break;
        }
        used += w;
        if highlight.as_ref().is_some_and(|r| r.contains(&index)) {
            flavor = flavor.inverse();
        }
        row.push(ch, flavor);
    }
    row
}

fn newline_flavor(line: &StyledText) -> Option<Flavor> {
    line.ends_with_newline().then(|| line.flavor_at(line.len() - 1))
}

/// Fit a status line into `width` columns, keeping `cursor` on screen.
///
/// Returns the visible part and the cursor column. Lines at least `width`
/// long are paged: the page holding the cursor is shown, or the half page
/// before it when the cursor sits near the start of its page. A `…` marks
/// text cut off on either side.
#[must_use]
pub fn fit_status_line(
    line: &StyledText,
    cursor: Option<usize>,
    width: usize,
) -> (StyledText, Option<usize>) {
    let len = line.len();
    if width == 0 {
        return (StyledText::new(), None);
    }
    if len < width {
        return (clip(line, 0, len, width, None), cursor);
    }

    let cursor = cursor.map(|c| c.min(len));
    let position = cursor.unwrap_or(0);
    let page = position / width;
    let page_cursor = position % width;
    let visual = width / 2;
    let (start, shift) = if page > 0 && page_cursor < visual {
        (page * width - visual, visual)
    } else {
        (page * width, 0)
    };
    let end = len.min(start + width);
    let more_before = page > 0;
    let more_after = end < len;

    let inner_start = if more_before { start + 1 } else { start };
    let inner_end = if more_after { end - 1 } else { end };
    let mut out = StyledText::new();
    if more_before {
        out.push(ELLIPSIS, Flavor::DEFAULT);
    }
    if inner_start < inner_end {
        out.append_slice(line.slice(inner_start, inner_end));
    }
    if more_after {
        out.push(ELLIPSIS, Flavor::DEFAULT);
    }
    let out = clip(&out, 0, out.len(), width, None);
    (out, cursor.map(|_| page_cursor + shift))
}

impl Viewport for Window {
    fn id(&self) -> WindowId {
        self.id
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn resize(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.resync();
    }

    fn set_word_wrap(&mut self, word_wrap: bool) {
        if self.word_wrap != word_wrap {
            self.word_wrap = word_wrap;
            self.resync();
        }
    }

    fn display_lines(&mut self) -> Vec<StyledText> {
        if self.height == 0 {
            return Vec::new();
        }
        let content = {
            let buffer = Arc::clone(&self.buffer);
            let mut buffer = buffer.lock();
            self.sync(&mut buffer);
            self.content_rows(&mut buffer)
        };

        let mut rows = Vec::with_capacity(self.height);
        let blank = self.content_height() - content.len();
        rows.extend((0..blank).map(|_| StyledText::new()));
        rows.extend(content);
        if self.focusable {
            rows.push(self.status_row());
        }
        rows
    }

    fn status_cursor_column(&self) -> Option<usize> {
        if !(self.focusable && self.focused) || self.echo.is_some() {
            return None;
        }
        fit_status_line(&self.status, self.status_cursor, self.width).1
    }

    fn append(&mut self, text: &StyledText) {
        let buffer = Arc::clone(&self.buffer);
        let mut buffer = buffer.lock();
        self.sync(&mut buffer);
        buffer.append(text);
        self.sync(&mut buffer);
    }

    fn append_line(&mut self, line: &StyledText) {
        let buffer = Arc::clone(&self.buffer);
        let mut buffer = buffer.lock();
        self.sync(&mut buffer);
        buffer.append_line(line);
        self.sync(&mut buffer);
    }

    fn scrollback(&self) -> usize {
        self.scrollback_bottom
    }

    fn scroll_lines(&mut self, count: isize) {
        self.echo = None;
        self.search.result = None;
        let buffer = Arc::clone(&self.buffer);
        let mut buffer = buffer.lock();
        self.sync(&mut buffer);
        let len = buffer.len();
        if len == 0 || count == 0 {
            return;
        }

        let last = len - 1;
        let mut remaining = count.unsigned_abs();
        if count > 0 {
            loop {
                let rows = self.rows_of(&mut buffer, last - self.scrollback_bottom);
                let room = rows - 1 - self.scrollback_offset;
                if remaining <= room {
                    self.scrollback_offset += remaining;
                    break;
                }
                if self.scrollback_bottom == last {
                    // The oldest row stays on screen.
                    self.scrollback_offset = rows - 1;
                    break;
                }
                remaining -= room + 1;
                self.scrollback_bottom += 1;
                self.scrollback_offset = 0;
            }
        } else {
            loop {
                if remaining <= self.scrollback_offset {
                    self.scrollback_offset -= remaining;
                    break;
                }
                if self.scrollback_bottom == 0 {
                    self.scrollback_offset = 0;
                    break;
                }
                remaining -= self.scrollback_offset + 1;
                self.scrollback_bottom -= 1;
                self.scrollback_offset = self.rows_of(&mut buffer, last - self.scrollback_bottom) - 1;
            }
        }
        tracing::trace!(
            window = self.id.get(),
            count,
            bottom = self.scrollback_bottom,
            offset = self.scrollback_offset,
            "scrolled"
        );
    }

    fn scroll_pages(&mut self, count: isize) {
        let page = isize::try_from(self.content_height()).unwrap_or(isize::MAX);
        self.scroll_lines(page.saturating_mul(count));
    }

    fn scroll_by_setting(&mut self, count: isize) {
        let amount = match self.scroll_setting {
            0 => self.content_height() / 2,
            rows => rows,
        };
        let amount = isize::try_from(amount).unwrap_or(isize::MAX);
        self.scroll_lines(amount * count.signum());
    }

    fn scroll_to_bottom(&mut self) {
        self.echo = None;
        self.search.result = None;
        self.scrollback_bottom = 0;
        self.scrollback_offset = 0;
    }

    fn scroll_to_buffer_line(&mut self, line: usize, offset: usize) {
        self.echo = None;
        let buffer = Arc::clone(&self.buffer);
        let mut buffer = buffer.lock();
        self.sync(&mut buffer);
        let len = buffer.len();
        assert!(line < len, "line {line} out of range (len {len})");
        self.reveal(&mut buffer, line, offset);
    }

    fn search_for_keyword(&mut self, word: &str, direction: isize) -> SearchOutcome {
        self.echo = None;
        let keyword: Vec<char> = word.chars().collect();
        if keyword != self.search.keyword {
            self.search = SearchState {
                keyword,
                result: None,
            };
        }
        if self.search.keyword.is_empty() {
            return SearchOutcome::NotFound;
        }

        let buffer = Arc::clone(&self.buffer);
        let mut buffer = buffer.lock();
        self.sync(&mut buffer);
        let len = buffer.len();
        if len == 0 {
            return SearchOutcome::NotFound;
        }

        let options = self.options();
        let fallback = len - 1 - self.scrollback_bottom;
        let found = if direction > 0 {
            let (mut line, mut before) = match self.search.result {
                Some(position) => position,
                None => match self.visible_rows(&mut buffer).first() {
                    Some(&(line, row)) => (line, wrap::wrap(buffer.line(line), options)[row].1),
                    None => (fallback, usize::MAX),
                },
            };
            loop {
                let text = buffer.line(line);
                if let Some(at) = rfind_ignore_case(text.chars(), &self.search.keyword, before) {
                    break Some((line, at));
                }
                if line == 0 {
                    break None;
                }
                line -= 1;
                before = usize::MAX;
            }
        } else {
            let (mut line, mut from) = match self.search.result {
                Some((line, offset)) => (line, offset + 1),
                None => match self.visible_rows(&mut buffer).last() {
                    Some(&(line, row)) => (line, wrap::wrap(buffer.line(line), options)[row].0),
                    None => (fallback, 0),
                },
            };
            loop {
                let text = buffer.line(line);
                if let Some(at) = find_ignore_case(text.chars(), &self.search.keyword, from) {
                    break Some((line, at));
                }
                if line + 1 >= len {
                    break None;
                }
                line += 1;
                from = 0;
            }
        };

        match found {
            Some((line, offset)) => {
                self.search.result = Some((line, offset));
                self.reveal(&mut buffer, line, offset);
                SearchOutcome::Found { line, offset }
            }
            None => {
                tracing::debug!(window = self.id.get(), keyword = word, direction, "search miss");
                SearchOutcome::NotFound
            }
        }
    }

    fn echo(&mut self, text: StyledText) {
        self.echo = Some(text);
    }

    fn clear_echo(&mut self) {
        self.echo = None;
    }

    fn update_status_line(
        &mut self,
        line: StyledText,
        cursor: Option<usize>,
    ) -> Result<(), WindowError> {
        if !self.focusable {
            return Err(WindowError::NotFocusable(self.id));
        }
        self.status = line;
        self.status_cursor = cursor;
        Ok(())
    }
}
