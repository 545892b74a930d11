//! The primary window: connection output above a prompt.

use mudterm_layout::WindowId;
use mudterm_scrollback::{ScrollbackBuffer, SharedBuffer};
use mudterm_text::StyledText;

use crate::config::EngineConfig;
use crate::error::WindowError;
use crate::viewport::{SearchOutcome, Viewport};
use crate::window::Window;

/// Lines kept by a prompt buffer.
pub const PROMPT_BUFFER_LINES: usize = 64;

/// Output window stacked on a prompt window.
///
/// The output window is never focusable. The prompt window holds the status
/// line, which overlays the newest prompt line, and shows echoes. Scrolling
/// and searching act on the output and clear any echo.
#[derive(Debug)]
pub struct PrimaryWindow {
    id: WindowId,
    width: usize,
    height: usize,
    prompt_height: usize,
    output: Window,
    prompt: Window,
}

impl PrimaryWindow {
    pub fn new(buffer: SharedBuffer, width: usize, height: usize, config: &EngineConfig) -> Self {
        let prompt_height = config.prompt_height.max(1);
        let output = Window::from_config(
            buffer,
            width,
            height.saturating_sub(prompt_height),
            config,
        );
        let prompt_buffer = ScrollbackBuffer::new(PROMPT_BUFFER_LINES).shared();
        let prompt = Window::from_config(prompt_buffer, width, prompt_height.min(height), config)
            .with_focusable(true)
            .with_status_overlays_output(true);
        Self {
            id: WindowId::next(),
            width,
            height,
            prompt_height,
            output,
            prompt,
        }
    }

    #[must_use]
    pub fn output(&self) -> &Window {
        &self.output
    }

    #[must_use]
    pub fn prompt(&self) -> &Window {
        &self.prompt
    }

    #[must_use]
    pub fn prompt_height(&self) -> usize {
        self.prompt_height
    }

    /// Change the prompt height (at least 1) and re-divide the window.
    pub fn set_prompt_height(&mut self, height: usize) {
        self.prompt_height = height.max(1);
        self.layout();
    }

    #[must_use]
    pub fn prompt_buffer(&self) -> &SharedBuffer {
        self.prompt.buffer()
    }

    /// Replace the prompt buffer's lines with the lines of `prompt`.
    pub fn set_prompt(&mut self, prompt: &StyledText) {
        let lines = prompt.lines();
        self.prompt.buffer().lock().set_lines(&lines);
    }

    fn layout(&mut self) {
        let prompt = self.prompt_height.min(self.height);
        self.prompt.resize(self.width, prompt);
        self.output.resize(self.width, self.height - prompt);
    }
}

impl Viewport for PrimaryWindow {
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
        self.output.buffer()
    }

    fn is_focused(&self) -> bool {
        self.prompt.is_focused()
    }

    fn set_focused(&mut self, focused: bool) {
        self.prompt.set_focused(focused);
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.layout();
    }

    fn set_word_wrap(&mut self, word_wrap: bool) {
        self.output.set_word_wrap(word_wrap);
        self.prompt.set_word_wrap(word_wrap);
    }

    fn display_lines(&mut self) -> Vec<StyledText> {
        let mut rows = self.output.display_lines();
        rows.extend(self.prompt.display_lines());
        rows
    }

    fn status_cursor_column(&self) -> Option<usize> {
        self.prompt.status_cursor_column()
    }

    fn append(&mut self, text: &StyledText) {
        self.output.append(text);
    }

    fn append_line(&mut self, line: &StyledText) {
        self.output.append_line(line);
    }

    fn scrollback(&self) -> usize {
        self.output.scrollback()
    }

    fn scroll_lines(&mut self, count: isize) {
        self.prompt.clear_echo();
        self.output.scroll_lines(count);
    }

    fn scroll_pages(&mut self, count: isize) {
        self.prompt.clear_echo();
        self.output.scroll_pages(count);
    }

    fn scroll_by_setting(&mut self, count: isize) {
        self.prompt.clear_echo();
        self.output.scroll_by_setting(count);
    }

    fn scroll_to_bottom(&mut self) {
        self.prompt.clear_echo();
        self.output.scroll_to_bottom();
    }

    fn scroll_to_buffer_line(&mut self, line: usize, offset: usize) {
        self.prompt.clear_echo();
        self.output.scroll_to_buffer_line(line, offset);
    }

    fn search_for_keyword(&mut self, word: &str, direction: isize) -> SearchOutcome {
        self.prompt.clear_echo();
        self.output.search_for_keyword(word, direction)
    }

    fn echo(&mut self, text: StyledText) {
        self.prompt.echo(text);
    }

    fn clear_echo(&mut self) {
        self.prompt.clear_echo();
    }

    fn update_status_line(
        &mut self,
        line: StyledText,
        cursor: Option<usize>,
    ) -> Result<(), WindowError> {
        self.prompt.update_status_line(line, cursor)
    }
}
