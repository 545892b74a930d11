//! The display engine: one tabpage drawn onto one surface.
//!
//! Every mutating call runs inside a render transaction. Transactions nest;
//! only the outermost [`finish_update`](DisplayEngine::finish_update) renders,
//! so a burst of changes costs one frame.

use std::path::PathBuf;
use std::sync::Arc;

use mudterm_layout::{Orientation, SplitSize, WindowId};
use mudterm_render::DisplaySurface;
use mudterm_scrollback::{ScrollbackBuffer, SharedBuffer};
use mudterm_text::StyledText;

use crate::config::EngineConfig;
use crate::error::{Result, TransactionError};
use crate::tabpage::Tabpage;
use crate::viewport::{SearchOutcome, Viewport};

/// Owns the surface, the tabpage and the primary scrollback buffer.
#[derive(Debug)]
pub struct DisplayEngine {
    config: EngineConfig,
    surface: DisplaySurface,
    tabpage: Tabpage,
    depth: usize,
    suppressed: usize,
    frames: u64,
}

impl DisplayEngine {
    /// An engine with an empty primary buffer, rendered once.
    pub fn new(config: EngineConfig, width: usize, height: usize) -> Self {
        let buffer = Self::new_buffer(&config);
        Self::with_buffer(config, buffer, width, height)
    }

    /// An engine showing `buffer` in its primary window.
    pub fn with_buffer(
        config: EngineConfig,
        buffer: SharedBuffer,
        width: usize,
        height: usize,
    ) -> Self {
        let tabpage = Tabpage::new(buffer, width, height, config.clone());
        let mut engine = Self {
            config,
            surface: DisplaySurface::new(width, height),
            tabpage,
            depth: 0,
            suppressed: 0,
            frames: 0,
        };
        engine.render();
        engine
    }

    fn new_buffer(config: &EngineConfig) -> SharedBuffer {
        ScrollbackBuffer::new(config.scrollback_lines)
            .with_read_cache(config.read_cache_lines)
            .shared()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    #[must_use]
    pub fn tabpage(&self) -> &Tabpage {
        &self.tabpage
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Plain text of every surface row, trailing blanks removed.
    #[must_use]
    pub fn display_lines(&self) -> Vec<String> {
        self.surface.to_lines()
    }

    #[must_use]
    pub fn primary_buffer(&self) -> SharedBuffer {
        Arc::clone(self.tabpage.primary().buffer())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────

    pub fn begin_update(&mut self) {
        self.depth += 1;
    }

    /// End an update, rendering if it was the outermost one.
    pub fn finish_update(&mut self) -> std::result::Result<(), TransactionError> {
        if self.depth == 0 {
            return Err(TransactionError::Unbalanced);
        }
        self.depth -= 1;
        if self.depth == 0 && self.suppressed == 0 {
            self.render();
        }
        Ok(())
    }

    /// Run `f` inside an update.
    pub fn in_transaction<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_update();
        let result = f(self);
        if let Err(e) = self.finish_update() {
            tracing::warn!(error = %e, "render transaction unbalanced");
        }
        result
    }

    /// Run `f` without rendering any frame, even if it finishes an update.
    pub fn without_rendering<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.suppressed += 1;
        let result = f(self);
        self.suppressed -= 1;
        result
    }

    #[must_use]
    pub fn in_update(&self) -> bool {
        self.depth > 0
    }

    fn render(&mut self) {
        self.tabpage.render(&mut self.surface);
        match self.tabpage.cursor() {
            Some((row, col)) => self.surface.set_cursor(row, col),
            None => self
                .surface
                .set_cursor(self.surface.height().saturating_sub(1), 0),
        }
        self.frames += 1;
        tracing::trace!(frame = self.frames, "rendered");
    }

    /// Run `f` on the tabpage inside an update.
    pub fn with_tabpage<R>(&mut self, f: impl FnOnce(&mut Tabpage) -> R) -> R {
        self.in_transaction(|engine| f(&mut engine.tabpage))
    }

    fn with_current<R>(&mut self, f: impl FnOnce(&mut dyn Viewport) -> R) -> R {
        self.in_transaction(|engine| f(engine.tabpage.current_window_mut()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────

    /// Append text to the primary window.
    pub fn append(&mut self, text: &StyledText) {
        self.in_transaction(|engine| engine.tabpage.primary_mut().append(text));
    }

    pub fn append_line(&mut self, line: &StyledText) {
        self.in_transaction(|engine| engine.tabpage.primary_mut().append_line(line));
    }

    /// Drop all primary output.
    pub fn clear(&mut self) {
        let buffer = self.primary_buffer();
        self.in_transaction(|_| buffer.lock().clear());
    }

    /// Persist primary output to `path`, loading what is already there.
    pub fn set_persistent(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let buffer = self.primary_buffer();
        let path = path.into();
        self.in_transaction(|_| buffer.lock().set_persistent(path))?;
        Ok(())
    }

    pub fn set_not_persistent(&mut self) -> Result<()> {
        let buffer = self.primary_buffer();
        self.in_transaction(|_| buffer.lock().set_not_persistent())?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Screen
    // ─────────────────────────────────────────────────────────────────────

    pub fn resize(&mut self, width: usize, height: usize) {
        self.in_transaction(|engine| {
            engine.surface.resize(width, height);
            engine.tabpage.resize(width, height);
        });
    }

    pub fn set_word_wrap(&mut self, word_wrap: bool) {
        self.config.word_wrap = word_wrap;
        self.in_transaction(|engine| engine.tabpage.set_word_wrap(word_wrap));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Current window
    // ─────────────────────────────────────────────────────────────────────

    pub fn scroll_lines(&mut self, count: isize) {
        self.with_current(|window| window.scroll_lines(count));
    }

    pub fn scroll_pages(&mut self, count: isize) {
        self.with_current(|window| window.scroll_pages(count));
    }

    pub fn scroll_by_setting(&mut self, count: isize) {
        self.with_current(|window| window.scroll_by_setting(count));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.with_current(|window| window.scroll_to_bottom());
    }

    /// See [`Viewport::scroll_to_buffer_line`].
    pub fn scroll_to_buffer_line(&mut self, line: usize, offset: usize) {
        self.with_current(|window| window.scroll_to_buffer_line(line, offset));
    }

    /// Search the current window. A miss is echoed as
    /// `Pattern not found: <word>`.
    pub fn search_for_keyword(&mut self, word: &str, direction: isize) -> SearchOutcome {
        self.with_current(|window| {
            let outcome = window.search_for_keyword(word, direction);
            if outcome == SearchOutcome::NotFound {
                window.echo(StyledText::plain(&format!("Pattern not found: {word}")));
            }
            outcome
        })
    }

    pub fn echo(&mut self, text: StyledText) {
        self.with_current(|window| window.echo(text));
    }

    pub fn clear_echo(&mut self) {
        self.with_current(|window| window.clear_echo());
    }

    /// Replace the current window's status line.
    pub fn update_status_line(&mut self, line: StyledText, cursor: Option<usize>) -> Result<()> {
        self.with_current(|window| window.update_status_line(line, cursor))?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Windows
    // ─────────────────────────────────────────────────────────────────────

    /// Split the current window over a fresh buffer.
    pub fn split(&mut self, orientation: Orientation, size: SplitSize) -> Result<WindowId> {
        let buffer = Self::new_buffer(&self.config);
        self.split_with_buffer(orientation, size, buffer)
    }

    pub fn split_with_buffer(
        &mut self,
        orientation: Orientation,
        size: SplitSize,
        buffer: SharedBuffer,
    ) -> Result<WindowId> {
        let id = self.with_tabpage(|tabpage| tabpage.split(orientation, size, buffer))?;
        Ok(id)
    }

    pub fn unsplit(&mut self) {
        self.with_tabpage(Tabpage::unsplit);
    }

    pub fn close(&mut self, window: WindowId) -> Result<()> {
        self.with_tabpage(|tabpage| tabpage.close(window))?;
        Ok(())
    }

    pub fn resize_window(&mut self, window: WindowId, height: usize) -> Result<()> {
        self.with_tabpage(|tabpage| tabpage.resize_window(window, height))?;
        Ok(())
    }

    pub fn set_current_window(&mut self, window: WindowId) -> Result<()> {
        self.with_tabpage(|tabpage| tabpage.set_current_window(window))?;
        Ok(())
    }

    pub fn focus_up(&mut self, count: usize) {
        self.with_tabpage(|tabpage| tabpage.focus_up(count));
    }

    pub fn focus_down(&mut self, count: usize) {
        self.with_tabpage(|tabpage| tabpage.focus_down(count));
    }
}
