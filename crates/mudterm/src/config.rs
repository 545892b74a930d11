//! Engine configuration.

use mudterm_layout::DEFAULT_MIN_HEIGHT;
use mudterm_scrollback::{DEFAULT_READ_CACHE_LINES, DEFAULT_SCROLLBACK_LINES};
use mudterm_text::line_cache::DEFAULT_WRAP_CACHE_CAPACITY;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for a [`DisplayEngine`](crate::DisplayEngine).
///
/// ```
/// use mudterm::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_scrollback_lines(5_000)
///     .with_word_wrap(false);
/// assert_eq!(config.scrollback_lines, 5_000);
/// assert_eq!(config.min_row_height, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EngineConfig {
    /// Lines kept by each new scrollback buffer.
    pub scrollback_lines: usize,
    /// Break long lines at word boundaries.
    pub word_wrap: bool,
    /// Smallest height a split row can be squeezed to.
    pub min_row_height: usize,
    /// Rows moved by [`scroll_by_setting`](crate::Viewport::scroll_by_setting).
    /// Zero means half the visible height.
    pub scroll: usize,
    /// Persisted lines cached in memory per buffer.
    pub read_cache_lines: usize,
    /// Wrap results cached per window.
    pub wrap_cache_lines: usize,
    /// Height of the primary window's prompt.
    pub prompt_height: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scrollback_lines: DEFAULT_SCROLLBACK_LINES,
            word_wrap: true,
            min_row_height: DEFAULT_MIN_HEIGHT,
            scroll: 0,
            read_cache_lines: DEFAULT_READ_CACHE_LINES,
            wrap_cache_lines: DEFAULT_WRAP_CACHE_CAPACITY,
            prompt_height: 1,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_scrollback_lines(mut self, lines: usize) -> Self {
        self.scrollback_lines = lines;
        self
    }

    #[must_use]
    pub fn with_word_wrap(mut self, word_wrap: bool) -> Self {
        self.word_wrap = word_wrap;
        self
    }

    /// Set the minimum split row height. Clamped to at least 1.
    #[must_use]
    pub fn with_min_row_height(mut self, height: usize) -> Self {
        self.min_row_height = height.max(1);
        self
    }

    #[must_use]
    pub fn with_scroll(mut self, rows: usize) -> Self {
        self.scroll = rows;
        self
    }

    #[must_use]
    pub fn with_read_cache_lines(mut self, lines: usize) -> Self {
        self.read_cache_lines = lines;
        self
    }

    #[must_use]
    pub fn with_wrap_cache_lines(mut self, lines: usize) -> Self {
        self.wrap_cache_lines = lines;
        self
    }

    /// Set the prompt height. Clamped to at least 1.
    #[must_use]
    pub fn with_prompt_height(mut self, height: usize) -> Self {
        self.prompt_height = height.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.scrollback_lines, 20_000);
        assert!(config.word_wrap);
        assert_eq!(config.scroll, 0);
        assert_eq!(config.prompt_height, 1);
        assert_eq!(config.wrap_cache_lines, 1024);
    }

    #[test]
    fn heights_are_at_least_one() {
        let config = EngineConfig::default()
            .with_prompt_height(0)
            .with_min_row_height(0);
        assert_eq!(config.prompt_height, 1);
        assert_eq!(config.min_row_height, 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"scrollback_lines": 300, "word_wrap": false}"#).unwrap();
        assert_eq!(config.scrollback_lines, 300);
        assert!(!config.word_wrap);
        assert_eq!(config.read_cache_lines, 512);
    }
}
