#![forbid(unsafe_code)]

//! Line wrapping of styled text into fixed-width display rows.
//!
//! A row is a `(start, end)` range of character indices into the line. Every
//! line produces at least one row; an empty line produces `(0, 0)`. A trailing
//! `\n` is never part of a row.
//!
//! # Example
//! ```
//! use mudterm_text::StyledText;
//! use mudterm_text::wrap::{WrapOptions, wrap};
//!
//! let line = StyledText::plain("Captain Mal Reynolds");
//! let rows = wrap(&line, WrapOptions::new(8));
//! assert_eq!(rows, vec![(0, 7), (8, 11), (12, 20)]);
//! ```

use unicode_width::UnicodeWidthChar;

use crate::styled::StyledText;

/// Options for wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapOptions {
    /// Row width in cells.
    pub width: usize,
    /// Break at word boundaries when possible.
    pub word_wrap: bool,
    /// Keep whitespace at the start and end of wrapped rows.
    pub preserve_whitespace: bool,
}

impl WrapOptions {
    /// Word-wrapping options for `width` columns.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width,
            word_wrap: true,
            preserve_whitespace: false,
        }
    }

    #[must_use]
    pub fn word_wrap(mut self, word_wrap: bool) -> Self {
        self.word_wrap = word_wrap;
        self
    }

    #[must_use]
    pub fn preserve_whitespace(mut self, preserve: bool) -> Self {
        self.preserve_whitespace = preserve;
        self
    }
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self::new(80)
    }
}

/// Display width of one character. Hidden and control characters take no
/// cells.
#[inline]
#[must_use]
pub fn char_width(ch: char, hidden: bool) -> usize {
    if hidden || ch.is_control() {
        0
    } else {
        ch.width().unwrap_or(0)
    }
}

/// Display width of a whole text.
#[must_use]
pub fn display_width(text: &StyledText) -> usize {
    text.chunks()
        .map(|chunk| {
            let hidden = chunk.flavor.is_hidden();
            chunk.text.iter().map(|&c| char_width(c, hidden)).sum::<usize>()
        })
        .sum()
}

fn widths(text: &StyledText) -> Vec<usize> {
    let mut out = Vec::with_capacity(text.len());
    for chunk in text.chunks() {
        let hidden = chunk.flavor.is_hidden();
        out.extend(chunk.text.iter().map(|&c| char_width(c, hidden)));
    }
    out
}

/// Call `emit(start, end)` for every display row of `text`.
pub fn for_each_row<F>(text: &StyledText, options: WrapOptions, mut emit: F)
where
    F: FnMut(usize, usize),
{
    let chars = text.chars();
    let mut len = chars.len();
    if len == 0 {
        emit(0, 0);
        return;
    }
    if chars[len - 1] == '\n' {
        len -= 1;
    }

    let width = options.width.max(1);
    let word_wrap = options.word_wrap;
    let preserve = options.preserve_whitespace;
    if !preserve {
        while len > 0 && chars[len - 1].is_whitespace() {
            len -= 1;
        }
    }

    let widths = widths(text);
    let mut emitted = false;
    let mut line_start = 0;
    let mut i = 0;
    let mut current_width = 0;
    let mut last_word_end = 0;
    let mut last_word_start = 0;
    let mut was_in_word = false;

    while i < len {
        let ch = chars[i];
        let w = widths[i];

        // A wide glyph that does not fit starts the next row.
        if w > 1 && current_width > 0 && current_width + w > width {
            emit(line_start, i);
            emitted = true;
            line_start = i;
            last_word_start = i;
            current_width = 0;
        }

        let in_word = !ch.is_whitespace();
        if was_in_word && !in_word {
            last_word_end = i;
        } else if !was_in_word && in_word {
            last_word_start = i;
        }
        was_in_word = in_word;

        let new_width = current_width + w;
        i += 1;

        if new_width < width {
            current_width = new_width;
            continue;
        }

        if word_wrap && in_word && (i == len || chars[i].is_whitespace()) {
            // Exactly on a word boundary.
            emit(line_start, i);
            line_start = i;
            current_width = 0;
        } else if word_wrap && !in_word && last_word_end > line_start {
            // Whitespace filled the row right after a word.
            emit(line_start, if preserve { i } else { last_word_end });
            line_start = i;
            current_width = 0;
        } else if word_wrap && last_word_end > line_start {
            emit(
                line_start,
                if preserve { last_word_start } else { last_word_end },
            );
            if last_word_start == line_start {
                line_start = i;
                current_width = 0;
            } else {
                line_start = last_word_start;
                current_width = widths[line_start..i].iter().sum();
            }
        } else {
            emit(line_start, i);
            line_start = i;
            last_word_start = i;
            current_width = 0;
        }
        emitted = true;

        if !preserve && word_wrap {
            while line_start < len && chars[line_start].is_whitespace() {
                line_start += 1;
                i += 1;
            }
        }
    }

    if current_width > 0 || !emitted {
        emit(line_start, i);
    }
}

/// All display rows of `text`.
#[must_use]
pub fn wrap(text: &StyledText, options: WrapOptions) -> Vec<(usize, usize)> {
    let mut rows = Vec::new();
    for_each_row(text, options, |start, end| rows.push((start, end)));
    rows
}

/// Number of display rows `text` occupies. Always at least 1.
#[must_use]
pub fn rendered_line_count(text: &StyledText, options: WrapOptions) -> usize {
    let mut count = 0;
    for_each_row(text, options, |_, _| count += 1);
    count
}

/// Index of the row holding character `offset`.
#[must_use]
pub fn split_index_of_offset(
    text: &StyledText,
    options: WrapOptions,
    offset: usize,
) -> Option<usize> {
    wrap(text, options)
        .iter()
        .position(|&(start, end)| (start..end).contains(&offset))
}

/// Column of character `offset` within the row holding it.
#[must_use]
pub fn split_offset_of_offset(
    text: &StyledText,
    options: WrapOptions,
    offset: usize,
) -> Option<usize> {
    wrap(text, options)
        .iter()
        .find(|&&(start, end)| (start..end).contains(&offset))
        .map(|&(start, _)| offset - start)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hard_rows_concatenate_to_text(text in "[a-z ]{0,60}", width in 1usize..20) {
            let line = StyledText::plain(&text);
            let rows = wrap(&line, WrapOptions::new(width).word_wrap(false));
            let joined: String = rows
                .iter()
                .flat_map(|&(s, e)| line.chars()[s..e].iter())
                .collect();
            prop_assert_eq!(joined.as_str(), text.trim_end());
            for &(s, e) in &rows {
                prop_assert!(e - s <= width);
            }
        }

        #[test]
        fn word_wrap_only_splits_long_words(
            words in proptest::collection::vec("[a-z]{1,12}", 1..10),
            width in 1usize..16,
        ) {
            let text = words.join(" ");
            let line = StyledText::plain(&text);
            let rows = wrap(&line, WrapOptions::new(width));
            let chars = line.chars();
            for &(s, e) in &rows {
                prop_assert!(e - s <= width);
                // A row that ends inside a word belongs to a word wider than
                // the row.
                if e < chars.len() && !chars[e].is_whitespace() && e > s && !chars[e - 1].is_whitespace() {
                    let ws = chars[..e].iter().rposition(|c| c.is_whitespace()).map_or(0, |p| p + 1);
                    let we = chars[e..].iter().position(|c| c.is_whitespace()).map_or(chars.len(), |p| e + p);
                    prop_assert!(we - ws > width);
                }
            }
        }
    }
}
