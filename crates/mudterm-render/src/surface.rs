#![forbid(unsafe_code)]

//! The display surface.
//!
//! A [`DisplaySurface`] is a fixed `width x height` grid of [`Cell`]s plus a
//! cursor. Windows render into rectangular regions of it row by row with
//! [`write_line`](DisplaySurface::write_line), which always fills the whole
//! requested span so stale content never survives a redraw.
//!
//! # Invariants
//!
//! 1. Every row holds exactly `width` cells.
//! 2. A [`CellFlags::WIDE`](crate::CellFlags::WIDE) cell is always followed by its continuation.
//! 3. The cursor stays inside the grid (clamped on resize).

use std::collections::VecDeque;
use std::io::{self, Write};

use mudterm_style::{Flavor, sgr};
use mudterm_text::wrap::char_width;
use mudterm_text::{StyledSlice, StyledText};

use crate::cell::Cell;

/// Fixed-size grid of styled cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySurface {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<Cell>>,
    cursor_row: usize,
    cursor_col: usize,
}

impl DisplaySurface {
    /// A blank surface.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: (0..height).map(|_| vec![Cell::BLANK; width]).collect(),
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Cursor position as `(row, col)`.
    #[must_use]
    pub const fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Move the cursor, clamped to the grid.
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.cursor_row = row.min(self.height.saturating_sub(1));
        self.cursor_col = col.min(self.width.saturating_sub(1));
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.rows.get(y).and_then(|row| row.get(x))
    }

    /// Cells of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[must_use]
    pub fn row_cells(&self, y: usize) -> &[Cell] {
        self.check_row(y);
        &self.rows[y]
    }

    fn check_row(&self, y: usize) {
        assert!(
            y < self.height,
            "attempted to update non-existent row {y}; surface height {}",
            self.height
        );
    }

    fn check_span(&self, x: usize, y: usize, width: usize) {
        self.check_row(y);
        assert!(
            x + width <= self.width,
            "span {x}..{} on row {y} exceeds surface width {}",
            x + width,
            self.width
        );
    }

    /// Before overwriting `from..to` of row `y`, blank any wide character
    /// that straddles either edge.
    fn split_wide_edges(&mut self, y: usize, from: usize, to: usize) {
        let row = &mut self.rows[y];
        if from > 0 && from < row.len() && row[from].is_continuation() {
            row[from - 1].clear();
        }
        if to < row.len() && row[to].is_continuation() {
            row[to].clear();
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Writing
    // ─────────────────────────────────────────────────────────────────────

    /// Write `content` at `(x, y)` and blank the rest of the `width` cells
    /// after `x`. Returns the number of columns the content took.
    ///
    /// Hidden and zero-width characters take no cells.
    ///
    /// # Panics
    ///
    /// Panics if the span leaves the surface or the content is wider than
    /// `width`.
    pub fn write_line(&mut self, x: usize, y: usize, width: usize, content: StyledSlice<'_>) -> usize {
        self.write_line_filled(x, y, width, content, Flavor::DEFAULT)
    }

    /// [`write_line`](Self::write_line), blanking the rest of the span with
    /// `fill` instead of the default flavor.
    pub fn write_line_filled(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        content: StyledSlice<'_>,
        fill: Flavor,
    ) -> usize {
        self.check_span(x, y, width);
        self.split_wide_edges(y, x, x + width);

        let end = x + width;
        let row = &mut self.rows[y];
        let mut col = x;
        for chunk in content.chunks() {
            let hidden = chunk.flavor.is_hidden();
            for &ch in chunk.text {
                let w = char_width(ch, hidden);
                if w == 0 {
                    continue;
                }
                assert!(
                    col + w <= end,
                    "wrote on row {y} past span width {width}: {content}"
                );
                if w == 1 {
                    row[col] = Cell::new(ch, chunk.flavor);
                } else {
                    let (lead, cont) = Cell::wide(ch, chunk.flavor);
                    row[col] = lead;
                    row[col + 1] = cont;
                }
                col += w;
            }
        }
        let written = col - x;
        row[col..end].fill(Cell::new(' ', fill));
        written
    }

    /// [`write_line`](Self::write_line) for a whole [`StyledText`]. The rest
    /// of the span takes the text's trailing flavor, if it has one.
    pub fn write_text(&mut self, x: usize, y: usize, width: usize, content: &StyledText) -> usize {
        let fill = content.trailing_flavor().unwrap_or(Flavor::DEFAULT);
        self.write_line_filled(x, y, width, content.as_slice(), fill)
    }

    /// Blank cells `x + from .. x + to` of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the range leaves the surface.
    pub fn clear_line(&mut self, x: usize, y: usize, from: usize, to: usize) {
        if to <= from {
            return;
        }
        self.check_span(x + from, y, to - from);
        self.split_wide_edges(y, x + from, x + to);
        self.rows[y][x + from..x + to].fill(Cell::BLANK);
    }

    /// Blank the whole surface.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::BLANK);
        }
    }

    /// Shift row references by `amount`: positive moves content down,
    /// negative moves it up. Rows shifted past an edge reappear on the other
    /// side; callers redraw them.
    pub fn scroll(&mut self, amount: isize) {
        if self.height == 0 {
            return;
        }
        let by = amount.unsigned_abs() % self.height;
        if amount > 0 {
            self.rows.rotate_right(by);
        } else {
            self.rows.rotate_left(by);
        }
    }

    /// Change the size in place. Surviving cells keep their content.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        self.rows.resize_with(height, || vec![Cell::BLANK; width]);
        for row in &mut self.rows {
            row.resize(width, Cell::BLANK);
            if let Some(last) = row.last_mut()
                && last.is_wide()
            {
                last.clear();
            }
        }
        tracing::debug!(
            from_width = self.width,
            from_height = self.height,
            width,
            height,
            "resized display surface"
        );
        self.width = width;
        self.height = height;
        self.set_cursor(self.cursor_row, self.cursor_col);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────

    /// Row `y` as styled text, one character per visible glyph.
    #[must_use]
    pub fn row_text(&self, y: usize) -> StyledText {
        let mut text = StyledText::new();
        for cell in self.row_cells(y) {
            if !cell.is_continuation() {
                text.push(cell.ch, cell.flavor);
            }
        }
        text
    }

    /// Plain text of every row, trailing blanks removed.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| self.row_text(y).to_string().trim_end().to_string())
            .collect()
    }

    /// Every row encoded with SGR escapes.
    #[must_use]
    pub fn ansi_lines(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| mudterm_text::ansi::to_ansi(&self.row_text(y)))
            .collect()
    }

    /// Paint the whole surface to a terminal: each row addressed absolutely,
    /// then the cursor placed.
    pub fn render_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut line = String::with_capacity(self.width * 2);
        for (y, row) in self.rows.iter().enumerate() {
            line.clear();
            let mut flavor = Flavor::DEFAULT;
            for cell in row.iter().filter(|c| !c.is_continuation()) {
                sgr::write_transition(flavor, cell.flavor, &mut line);
                flavor = cell.flavor;
                line.push(cell.ch);
            }
            sgr::write_transition(flavor, Flavor::DEFAULT, &mut line);
            write!(out, "\x1b[{};1H{line}", y + 1)?;
        }
        write!(out, "\x1b[{};{}H", self.cursor_row + 1, self.cursor_col + 1)?;
        out.flush()
    }
}

impl Default for DisplaySurface {
    fn default() -> Self {
        Self::new(80, 24)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use mudterm_text::{WrapOptions, wrap};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn wrapped_rows_always_fit(text in "[a-z 日本]{0,40}", width in 2usize..12) {
            let line = StyledText::plain(&text);
            let mut surface = DisplaySurface::new(width, 1);
            for (start, end) in wrap::wrap(&line, WrapOptions::new(width)) {
                let used = surface.write_line(0, 0, width, line.slice(start, end));
                prop_assert!(used <= width);
                prop_assert_eq!(surface.row_cells(0).len(), width);
            }
        }

        #[test]
        fn scroll_round_trips(amount in -8isize..8, height in 1usize..6) {
            let mut surface = DisplaySurface::new(3, height);
            for y in 0..height {
                surface.write_text(0, y, 3, &StyledText::plain(&y.to_string()));
            }
            let before = surface.clone();
            surface.scroll(amount);
            surface.scroll(-amount);
            prop_assert_eq!(surface, before);
        }
    }
}
