//! A tabpage: the primary window plus any split windows, laid out in rows.

use std::collections::BTreeMap;

use mudterm_layout::{LayoutError, LayoutResult, LayoutTree, Orientation, SplitSize, WindowId};
use mudterm_render::DisplaySurface;
use mudterm_scrollback::{BufferId, SharedBuffer};

use crate::config::EngineConfig;
use crate::primary::PrimaryWindow;
use crate::viewport::Viewport;
use crate::window::Window;

/// Windows sharing one screen.
///
/// Exactly one window is current; it is the only focused one.
#[derive(Debug)]
pub struct Tabpage {
    layout: LayoutTree,
    primary: PrimaryWindow,
    windows: BTreeMap<WindowId, Window>,
    current: WindowId,
    config: EngineConfig,
}

impl Tabpage {
    /// A tabpage holding only a primary window over `buffer`.
    pub fn new(buffer: SharedBuffer, width: usize, height: usize, config: EngineConfig) -> Self {
        let mut primary = PrimaryWindow::new(buffer, width, height, &config);
        primary.set_focused(true);
        let current = primary.id();
        let layout = LayoutTree::new(current, width, height).with_min_height(config.min_row_height);
        let mut tabpage = Self {
            layout,
            primary,
            windows: BTreeMap::new(),
            current,
            config,
        };
        tabpage.apply_layout();
        tabpage
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.layout.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.layout.height()
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    #[must_use]
    pub fn primary(&self) -> &PrimaryWindow {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut PrimaryWindow {
        &mut self.primary
    }

    #[must_use]
    pub fn current_window_id(&self) -> WindowId {
        self.current
    }

    pub fn current_window_mut(&mut self) -> &mut dyn Viewport {
        match self.windows.get_mut(&self.current) {
            Some(window) => window as &mut dyn Viewport,
            None => &mut self.primary as &mut dyn Viewport,
        }
    }

    #[must_use]
    pub fn current_window(&self) -> &dyn Viewport {
        match self.windows.get(&self.current) {
            Some(window) => window as &dyn Viewport,
            None => &self.primary as &dyn Viewport,
        }
    }

    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&dyn Viewport> {
        if id == self.primary.id() {
            return Some(&self.primary as &dyn Viewport);
        }
        self.windows.get(&id).map(|w| w as &dyn Viewport)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut dyn Viewport> {
        if id == self.primary.id() {
            return Some(&mut self.primary as &mut dyn Viewport);
        }
        self.windows.get_mut(&id).map(|w| w as &mut dyn Viewport)
    }

    /// Window ids, top to bottom.
    #[must_use]
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.layout.windows()
    }

    /// The topmost window showing buffer `id`.
    #[must_use]
    pub fn find_window_by_buffer(&self, id: BufferId) -> Option<WindowId> {
        self.layout.windows().into_iter().find(|&window| {
            self.window(window)
                .is_some_and(|w| w.buffer().lock().id() == id)
        })
    }

    #[must_use]
    pub fn y_position_of(&self, id: WindowId) -> Option<usize> {
        self.layout.y_position_of(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Focus
    // ─────────────────────────────────────────────────────────────────────

    /// Make `id` the current, focused window.
    pub fn set_current_window(&mut self, id: WindowId) -> LayoutResult<()> {
        if !self.layout.contains(id) {
            return Err(LayoutError::WindowNotFound(id));
        }
        self.current_window_mut().set_focused(false);
        self.current = id;
        self.current_window_mut().set_focused(true);
        Ok(())
    }

    /// Focus the window `count` windows up, stopping at the top.
    pub fn focus_up(&mut self, count: usize) {
        if let Some(id) = self.layout.window_above(self.current, count) {
            self.focus_existing(id);
        }
    }

    /// Focus the window `count` windows down, stopping at the bottom.
    pub fn focus_down(&mut self, count: usize) {
        if let Some(id) = self.layout.window_below(self.current, count) {
            self.focus_existing(id);
        }
    }

    fn focus_existing(&mut self, id: WindowId) {
        if let Err(e) = self.set_current_window(id) {
            tracing::warn!(window = id.get(), error = %e, "layout returned an unknown window");
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────

    /// Split the current window, showing `buffer` in a new focusable window
    /// above it. The new window becomes current.
    pub fn split(
        &mut self,
        orientation: Orientation,
        size: SplitSize,
        buffer: SharedBuffer,
    ) -> LayoutResult<WindowId> {
        let window =
            Window::from_config(buffer, self.width(), 1, &self.config).with_focusable(true);
        let id = window.id();
        self.layout.split(self.current, id, orientation, size)?;
        self.windows.insert(id, window);
        self.set_current_window(id)?;
        self.apply_layout();
        tracing::debug!(
            window = id.get(),
            height = self.layout.height_of(id),
            windows = self.layout.len(),
            "split window"
        );
        Ok(id)
    }

    /// Close window `id`. If it was current, the window below it (or the
    /// bottom window) becomes current.
    pub fn close(&mut self, id: WindowId) -> LayoutResult<()> {
        let index = self.layout.windows().iter().position(|&w| w == id);
        self.layout.close(id)?;
        self.windows.remove(&id);
        if self.current == id {
            let remaining = self.layout.windows();
            let next = index
                .and_then(|i| remaining.get(i))
                .or_else(|| remaining.last())
                .copied()
                .unwrap_or_else(|| self.primary.id());
            self.current = next;
            self.current_window_mut().set_focused(true);
        }
        self.apply_layout();
        tracing::debug!(window = id.get(), windows = self.layout.len(), "closed window");
        Ok(())
    }

    /// Close every window but the primary, which becomes current.
    pub fn unsplit(&mut self) {
        self.layout.unsplit();
        self.windows.clear();
        self.current = self.primary.id();
        self.primary.set_focused(true);
        self.apply_layout();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.layout.resize(width, height);
        self.apply_layout();
    }

    /// Request `height` rows for window `id`.
    pub fn resize_window(&mut self, id: WindowId, height: usize) -> LayoutResult<()> {
        self.layout.resize_window(id, height)?;
        self.apply_layout();
        Ok(())
    }

    pub fn set_word_wrap(&mut self, word_wrap: bool) {
        self.config.word_wrap = word_wrap;
        self.primary.set_word_wrap(word_wrap);
        for window in self.windows.values_mut() {
            window.set_word_wrap(word_wrap);
        }
    }

    fn apply_layout(&mut self) {
        for placement in self.layout.placements() {
            if let Some(window) = self.window_mut(placement.window) {
                window.resize(placement.width, placement.height);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    /// Draw every window and blank the separator rows.
    ///
    /// # Panics
    ///
    /// Panics if a window produces a different number of rows than its
    /// height, or the layout does not fit on `surface`.
    pub fn render(&mut self, surface: &mut DisplaySurface) {
        for placement in self.layout.placements() {
            let Some(window) = self.window_mut(placement.window) else {
                continue;
            };
            let rows = window.display_lines();
            assert_eq!(
                rows.len(),
                placement.height,
                "{} rendered {} rows into a height of {}",
                placement.window,
                rows.len(),
                placement.height
            );
            for (i, row) in rows.iter().enumerate() {
                surface.write_text(placement.x, placement.y + i, placement.width, row);
            }
        }
        let width = self.width();
        for y in self.layout.separator_rows() {
            surface.clear_line(0, y, 0, width);
        }
    }

    /// Surface position `(row, col)` of the current window's status cursor.
    #[must_use]
    pub fn cursor(&self) -> Option<(usize, usize)> {
        let window = self.current_window();
        let col = window.status_cursor_column()?;
        let placement = self.layout.placement_of(self.current)?;
        let row = (placement.y + placement.height).checked_sub(1)?;
        Some((row, col.min(placement.width.saturating_sub(1))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mudterm_scrollback::ScrollbackBuffer;

    fn tabpage(width: usize, height: usize) -> Tabpage {
        let buffer = ScrollbackBuffer::new(100).shared();
        Tabpage::new(buffer, width, height, EngineConfig::default())
    }

    fn empty() -> SharedBuffer {
        ScrollbackBuffer::new(10).shared()
    }

    #[test]
    fn primary_starts_focused() {
        let tabpage = tabpage(12, 7);
        assert!(tabpage.current_window().is_focused());
        assert_eq!(tabpage.current_window_id(), tabpage.primary().id());
        assert_eq!(tabpage.primary().height(), 7);
    }

    #[test]
    fn split_focuses_new_window() {
        let mut tabpage = tabpage(12, 7);
        let id = tabpage
            .split(Orientation::Rows, SplitSize::Rows(2), empty())
            .unwrap();
        assert_eq!(tabpage.current_window_id(), id);
        assert!(!tabpage.primary().is_focused());
        assert_eq!(tabpage.window(id).map(|w| w.height()), Some(3));
        assert_eq!(tabpage.primary().height(), 3);
        assert_eq!(tabpage.y_position_of(tabpage.primary().id()), Some(4));
    }

    #[test]
    fn column_split_is_rejected() {
        let mut tabpage = tabpage(12, 7);
        let err = tabpage
            .split(Orientation::Columns, SplitSize::Rows(2), empty())
            .unwrap_err();
        assert_eq!(err, LayoutError::UnsupportedOrientation(Orientation::Columns));
        assert_eq!(tabpage.window_ids().len(), 1);
        assert_eq!(tabpage.current_window_id(), tabpage.primary().id());
    }

    #[test]
    fn closing_current_focuses_window_below() {
        let mut tabpage = tabpage(20, 12);
        let middle = tabpage
            .split(Orientation::Rows, SplitSize::Rows(2), empty())
            .unwrap();
        let top = tabpage
            .split(Orientation::Rows, SplitSize::Rows(2), empty())
            .unwrap();
        tabpage.close(top).unwrap();
        assert_eq!(tabpage.current_window_id(), middle);
        assert!(tabpage.window(middle).unwrap().is_focused());
        tabpage.close(middle).unwrap();
        assert_eq!(tabpage.current_window_id(), tabpage.primary().id());
    }

    #[test]
    fn closing_primary_fails() {
        let mut tabpage = tabpage(20, 12);
        let primary = tabpage.primary().id();
        assert_eq!(tabpage.close(primary), Err(LayoutError::CannotClosePrimary));
    }

    #[test]
    fn find_window_by_buffer_id() {
        let mut tabpage = tabpage(20, 12);
        let buffer = empty();
        let buffer_id = buffer.lock().id();
        let id = tabpage
            .split(Orientation::Rows, SplitSize::Rows(2), buffer)
            .unwrap();
        assert_eq!(tabpage.find_window_by_buffer(buffer_id), Some(id));
        let primary_buffer = tabpage.primary().buffer().lock().id();
        assert_eq!(
            tabpage.find_window_by_buffer(primary_buffer),
            Some(tabpage.primary().id())
        );
        assert_eq!(tabpage.find_window_by_buffer(empty().lock().id()), None);
    }

    #[test]
    fn set_current_rejects_unknown_window() {
        let mut tabpage = tabpage(20, 12);
        let stranger = WindowId::next();
        assert_eq!(
            tabpage.set_current_window(stranger),
            Err(LayoutError::WindowNotFound(stranger))
        );
    }

    #[test]
    fn cursor_follows_status_of_current_window() {
        let mut tabpage = tabpage(12, 7);
        tabpage
            .primary_mut()
            .update_status_line(mudterm_text::StyledText::plain(":look"), Some(5))
            .unwrap();
        assert_eq!(tabpage.cursor(), Some((6, 5)));
        let id = tabpage
            .split(Orientation::Rows, SplitSize::Rows(2), empty())
            .unwrap();
        assert_eq!(tabpage.cursor(), None);
        tabpage
            .window_mut(id)
            .unwrap()
            .update_status_line(mudterm_text::StyledText::plain("<s>"), Some(1))
            .unwrap();
        assert_eq!(tabpage.cursor(), Some((2, 1)));
    }
}
