#![forbid(unsafe_code)]

//! Styled text: characters paired with a [`Flavor`] each.
//!
//! Flavors are stored as runs next to an owned character vector, so the
//! "one flavor per character" invariant holds by construction. A
//! [`StyledText`] may also carry a *trailing flavor*: the flavor that text
//! appended later should start with. Network output arrives in chunks and an
//! SGR sequence can end one chunk while the text it colors begins the next.
//!
//! # Example
//! ```
//! use mudterm_style::Flavor;
//! use mudterm_text::StyledText;
//!
//! let mut text = StyledText::plain("Mal");
//! text.set_trailing_flavor(Some(Flavor::new().bold()));
//! text.append_plain(" Reynolds");
//! assert_eq!(text.to_string(), "Mal Reynolds");
//! assert!(text.flavor_at(4).is_bold());
//! assert!(!text.flavor_at(0).is_bold());
//! ```

use std::fmt;

use mudterm_style::Flavor;
use smallvec::SmallVec;

/// A maximal range of characters sharing one flavor. `end` is exclusive and
/// the run starts where the previous one ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    pub end: usize,
    pub flavor: Flavor,
}

/// A contiguous piece of text with a single flavor, produced by
/// [`StyledText::chunks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub text: &'a [char],
    pub flavor: Flavor,
}

/// Append-only styled text.
#[derive(Debug, Clone, Default)]
pub struct StyledText {
    chars: Vec<char>,
    runs: SmallVec<[Run; 2]>,
    trailing: Option<Flavor>,
}

impl StyledText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text with the default flavor.
    #[must_use]
    pub fn plain(text: &str) -> Self {
        Self::styled(text, Flavor::DEFAULT)
    }

    /// Text with a single flavor.
    #[must_use]
    pub fn styled(text: &str, flavor: Flavor) -> Self {
        let mut out = Self::new();
        out.push_str(text, flavor);
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    #[must_use]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Flavor of the character at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn flavor_at(&self, index: usize) -> Flavor {
        assert!(
            index < self.len(),
            "flavor index {index} out of bounds (len {})",
            self.len()
        );
        let run = self.runs.partition_point(|r| r.end <= index);
        self.runs[run].flavor
    }

    /// Flavor of the last character, if any.
    #[must_use]
    pub fn last_flavor(&self) -> Option<Flavor> {
        self.runs.last().map(|r| r.flavor)
    }

    #[must_use]
    pub fn trailing_flavor(&self) -> Option<Flavor> {
        self.trailing
    }

    pub fn set_trailing_flavor(&mut self, flavor: Option<Flavor>) {
        self.trailing = flavor;
    }

    /// Append one character. A tab becomes two spaces with the tab's flavor.
    pub fn push(&mut self, ch: char, flavor: Flavor) {
        if ch == '\t' {
            self.push_raw(' ', flavor);
            self.push_raw(' ', flavor);
        } else {
            self.push_raw(ch, flavor);
        }
    }

    fn push_raw(&mut self, ch: char, flavor: Flavor) {
        self.chars.push(ch);
        match self.runs.last_mut() {
            Some(run) if run.flavor == flavor => run.end += 1,
            _ => self.runs.push(Run {
                end: self.chars.len(),
                flavor,
            }),
        }
    }

    pub fn push_str(&mut self, text: &str, flavor: Flavor) {
        self.chars.reserve(text.len());
        for ch in text.chars() {
            self.push(ch, flavor);
        }
    }

    /// Append unstyled text.
    ///
    /// The new characters take the trailing flavor if one is set, otherwise
    /// the flavor of the last character, otherwise the default. The trailing
    /// flavor is consumed by anything except a lone newline.
    pub fn append_plain(&mut self, text: &str) {
        let flavor = self
            .trailing
            .or_else(|| self.last_flavor())
            .unwrap_or_default();
        let mut count = 0;
        let mut content = false;
        for ch in text.chars() {
            count += 1;
            content |= ch != '\n';
            self.push(ch, flavor);
        }
        if count > 1 || content {
            self.trailing = None;
        }
    }

    /// Append another styled text and adopt its trailing flavor.
    ///
    /// If we have a trailing flavor, the leading default-flavored characters
    /// of `other` take it.
    pub fn append_styled(&mut self, other: &StyledText) {
        self.append_slice(other.as_slice());
        self.trailing = other.trailing;
    }

    /// Append a borrowed view. The trailing flavor applies as in
    /// [`append_styled`](Self::append_styled) but is left unchanged afterwards.
    pub fn append_slice(&mut self, other: StyledSlice<'_>) {
        let mut carry = self.trailing;
        self.chars.reserve(other.len());
        for chunk in other.chunks() {
            let flavor = match carry {
                Some(trailing) if chunk.flavor.is_default() => trailing,
                _ => {
                    carry = None;
                    chunk.flavor
                }
            };
            for &ch in chunk.text {
                self.push_raw(ch, flavor);
            }
        }
    }

    /// Borrow the whole text as a slice.
    #[must_use]
    pub fn as_slice(&self) -> StyledSlice<'_> {
        StyledSlice {
            text: self,
            start: 0,
            end: self.len(),
        }
    }

    /// Borrow `start..end`.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted or out of bounds.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> StyledSlice<'_> {
        assert!(
            start <= end && end <= self.len(),
            "slice {start}..{end} out of bounds (len {})",
            self.len()
        );
        StyledSlice {
            text: self,
            start,
            end,
        }
    }

    /// Deep-copy `start..end` into a new, independent text.
    ///
    /// The copy's trailing flavor is, in order of preference: ours when the
    /// range reaches our end, the `trailing` argument, or the flavor of the
    /// copied trailing newline.
    #[must_use]
    pub fn to_independent_copy(
        &self,
        start: usize,
        end: usize,
        trailing: Option<Flavor>,
    ) -> StyledText {
        let slice = self.slice(start, end);
        let mut copy = StyledText::new();
        copy.append_slice(slice);
        copy.trailing = if end == self.len() && self.trailing.is_some() {
            self.trailing
        } else if trailing.is_some() {
            trailing
        } else if end > start && self.chars[end - 1] == '\n' {
            Some(self.flavor_at(end - 1))
        } else {
            None
        };
        copy
    }

    /// Iterate flavor runs.
    pub fn chunks(&self) -> Chunks<'_> {
        self.as_slice().chunks()
    }

    #[must_use]
    pub fn ends_with_newline(&self) -> bool {
        self.chars.last() == Some(&'\n')
    }

    /// Drop a trailing `\n`. Returns whether one was removed.
    pub fn remove_trailing_newline(&mut self) -> bool {
        if self.ends_with_newline() {
            self.truncate(self.len() - 1);
            true
        } else {
            false
        }
    }

    /// Shorten to `len` characters. No-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        self.chars.truncate(len);
        if len == 0 {
            self.runs.clear();
            return;
        }
        let keep = self.runs.partition_point(|r| r.end < len);
        self.runs.truncate(keep + 1);
        self.runs[keep].end = len;
    }

    /// Split after every `\n` into `dest`.
    ///
    /// With `continue_incomplete`, the first piece is appended to the newest
    /// line of `dest` if that line is still open (no `\n`). Empty text adds
    /// one empty line unless continuing.
    pub fn split_at_newlines<S: LineSink + ?Sized>(&self, dest: &mut S, continue_incomplete: bool) {
        if self.is_empty() {
            if !continue_incomplete {
                let mut empty = StyledText::new();
                empty.trailing = self.trailing;
                dest.push_line(empty);
            }
            return;
        }

        let len = self.len();
        let mut start = 0;
        while start < len {
            let end = self.chars[start..]
                .iter()
                .position(|&c| c == '\n')
                .map_or(len, |p| start + p + 1);
            let piece = self.to_independent_copy(start, end, None);
            let open = if start == 0 && continue_incomplete {
                dest.open_line_mut()
            } else {
                None
            };
            match open {
                Some(line) => line.append_styled(&piece),
                None => dest.push_line(piece),
            }
            start = end;
        }
    }

    /// Split after every `\n` into a new vector.
    #[must_use]
    pub fn lines(&self) -> Vec<StyledText> {
        let mut out = Vec::new();
        self.split_at_newlines(&mut out, false);
        out
    }
}

impl PartialEq for StyledText {
    fn eq(&self, other: &Self) -> bool {
        self.chars == other.chars && self.runs == other.runs
    }
}

impl Eq for StyledText {}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for StyledText {
    fn from(text: String) -> Self {
        Self::plain(&text)
    }
}

/// Destination for [`StyledText::split_at_newlines`].
pub trait LineSink {
    /// The newest line, if it does not end in `\n` yet.
    fn open_line_mut(&mut self) -> Option<&mut StyledText>;

    fn push_line(&mut self, line: StyledText);
}

impl LineSink for Vec<StyledText> {
    fn open_line_mut(&mut self) -> Option<&mut StyledText> {
        self.last_mut().filter(|line| !line.ends_with_newline())
    }

    fn push_line(&mut self, line: StyledText) {
        self.push(line);
    }
}

/// A borrowed view into a [`StyledText`].
#[derive(Debug, Clone, Copy)]
pub struct StyledSlice<'a> {
    text: &'a StyledText,
    start: usize,
    end: usize,
}

impl<'a> StyledSlice<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Start offset in the underlying text.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    #[must_use]
    pub fn chars(&self) -> &'a [char] {
        &self.text.chars[self.start..self.end]
    }

    /// Flavor at `index`, relative to the slice start.
    #[must_use]
    pub fn flavor_at(&self, index: usize) -> Flavor {
        assert!(index < self.len(), "slice index {index} out of bounds");
        self.text.flavor_at(self.start + index)
    }

    pub fn chunks(&self) -> Chunks<'a> {
        Chunks {
            text: self.text,
            pos: self.start,
            end: self.end,
            run: self.text.runs.partition_point(|r| r.end <= self.start),
        }
    }

    /// Sub-view, relative to this slice.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> StyledSlice<'a> {
        assert!(start <= end && end <= self.len(), "slice {start}..{end} out of bounds");
        StyledSlice {
            text: self.text,
            start: self.start + start,
            end: self.start + end,
        }
    }

    /// Deep copy ("freeze") this view.
    #[must_use]
    pub fn to_styled_text(&self, trailing: Option<Flavor>) -> StyledText {
        self.text.to_independent_copy(self.start, self.end, trailing)
    }
}

impl fmt::Display for StyledSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;
        for &ch in self.chars() {
            f.write_char(ch)?;
        }
        Ok(())
    }
}

impl PartialEq<&str> for StyledSlice<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.chars().iter().copied().eq(other.chars())
    }
}

/// Iterator over the flavor runs of a slice.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a StyledText,
    pos: usize,
    end: usize,
    run: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        if self.pos >= self.end {
            return None;
        }
        let run = self.text.runs.get(self.run)?;
        let stop = run.end.min(self.end);
        let chunk = Chunk {
            text: &self.text.chars[self.pos..stop],
            flavor: run.flavor,
        };
        self.pos = stop;
        self.run += 1;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mudterm_style::Color;

    fn bold() -> Flavor {
        Flavor::new().bold()
    }

    fn italic() -> Flavor {
        Flavor::new().italic()
    }

    fn strings(lines: &[StyledText]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn plain_round_trips_to_string() {
        assert_eq!(StyledText::plain("mreynolds").to_string(), "mreynolds");
    }

    #[test]
    fn basic_append() {
        let mut b = StyledText::plain("Mal");
        b.append_plain(" Reynolds");
        assert_eq!(b.to_string(), "Mal Reynolds");
        assert_eq!(b.len(), 12);
    }

    #[test]
    fn append_empty_text() {
        let mut b = StyledText::new();
        b.push('m', Flavor::DEFAULT);
        b.append_styled(&StyledText::new());
        assert_eq!(b.to_string(), "m");
    }

    #[test]
    fn tabs_expand_to_two_spaces() {
        let mut b = StyledText::new();
        b.push_str("mal\treynolds", bold());
        assert_eq!(b.to_string(), "mal  reynolds");
        assert_eq!(b.flavor_at(4), bold());
    }

    #[test]
    fn adjacent_equal_flavors_share_a_run() {
        let mut b = StyledText::new();
        b.push_str("Take ", bold());
        b.push_str("my ", bold());
        b.push_str("love", italic());
        assert_eq!(b.runs().len(), 2);
        assert_eq!(b.runs()[0].end, 8);
    }

    // =========================================================================
    // Trailing flavor
    // =========================================================================

    #[test]
    fn plain_append_continues_trailing_flavor() {
        let mut b = StyledText::plain("Mal");
        b.set_trailing_flavor(Some(bold()));
        b.append_plain(" Reynolds");
        assert_eq!(b.to_string(), "Mal Reynolds");
        assert_eq!(b.flavor_at(3), bold());
        assert_eq!(b.flavor_at(11), bold());
        assert_eq!(b.trailing_flavor(), None);
    }

    #[test]
    fn plain_append_continues_last_flavor() {
        let mut b = StyledText::styled("Mal", italic());
        b.append_plain("colm");
        assert_eq!(b.flavor_at(6), italic());
    }

    #[test]
    fn lone_newline_keeps_trailing_flavor() {
        let mut b = StyledText::plain("Mal");
        b.set_trailing_flavor(Some(bold()));
        b.append_plain("\n");
        assert_eq!(b.trailing_flavor(), Some(bold()));
        b.append_plain("\n\n");
        assert_eq!(b.trailing_flavor(), None);
    }

    #[test]
    fn styled_append_continues_trailing_flavor() {
        let mut b = StyledText::plain("Mal");
        b.set_trailing_flavor(Some(bold()));
        b.append_styled(&StyledText::plain(" Reynolds"));
        assert_eq!(b.to_string(), "Mal Reynolds");
        assert_eq!(b.flavor_at(3), bold());
        assert_eq!(b.flavor_at(11), bold());
    }

    #[test]
    fn styled_append_keeps_new_flavor() {
        let mut b = StyledText::plain("Mal");
        b.set_trailing_flavor(Some(bold()));
        b.append_styled(&StyledText::styled(" Reynolds", italic()));
        assert_eq!(b.flavor_at(2), Flavor::DEFAULT);
        assert_eq!(b.flavor_at(3), italic());
    }

    #[test]
    fn styled_append_keeps_partial_new_flavor() {
        let mut other = StyledText::plain(" Rey");
        other.push_str("nolds", italic());
        let mut b = StyledText::plain("Mal");
        b.set_trailing_flavor(Some(bold()));
        b.append_styled(&other);
        assert_eq!(b.to_string(), "Mal Reynolds");
        for i in 3..7 {
            assert_eq!(b.flavor_at(i), bold(), "index {i}");
        }
        assert_eq!(b.flavor_at(7), italic());
    }

    #[test]
    fn styled_append_adopts_trailing_flavor() {
        let mut other = StyledText::plain("zoe");
        other.set_trailing_flavor(Some(italic()));
        let mut b = StyledText::plain("wash ");
        b.append_styled(&other);
        assert_eq!(b.trailing_flavor(), Some(italic()));
    }

    // =========================================================================
    // Slices and copies
    // =========================================================================

    #[test]
    fn slice_views() {
        let b = StyledText::plain("mreynolds");
        assert_eq!(b.slice(1, 4), "rey");
        assert_eq!(b.slice(0, 0), "");
        assert_eq!(b.slice(0, 9), "mreynolds");
        assert_eq!(b.slice(9, 9), "");
    }

    #[test]
    fn append_to_copied_slice() {
        let b = StyledText::plain("mreynolds");
        let mut sub = b.slice(1, 4).to_styled_text(None);
        sub.append_slice(b.slice(4, 8));
        assert_eq!(sub.to_string(), "reynold");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn slice_past_end_panics() {
        let _ = StyledText::plain("zoe").slice(1, 4);
    }

    #[test]
    fn copy_to_end_keeps_source_trailing() {
        let mut b = StyledText::plain("zoe");
        b.set_trailing_flavor(Some(bold()));
        let copy = b.to_independent_copy(1, 3, Some(italic()));
        assert_eq!(copy.trailing_flavor(), Some(bold()));
    }

    #[test]
    fn copy_uses_argument_trailing() {
        let b = StyledText::plain("zoe\n");
        let copy = b.to_independent_copy(0, 2, Some(italic()));
        assert_eq!(copy.trailing_flavor(), Some(italic()));
    }

    #[test]
    fn copy_ending_in_newline_takes_its_flavor() {
        let mut b = StyledText::new();
        b.push_str("wash\n", bold());
        b.push_str("zoe", italic());
        let copy = b.to_independent_copy(0, 5, None);
        assert_eq!(copy.trailing_flavor(), Some(bold()));
        assert_eq!(b.to_independent_copy(0, 3, None).trailing_flavor(), None);
    }

    #[test]
    fn equality_ignores_trailing_flavor() {
        let a = StyledText::plain("kaylee");
        let mut b = StyledText::plain("kaylee");
        b.set_trailing_flavor(Some(bold()));
        assert_eq!(a, b);
        assert_ne!(a, StyledText::styled("kaylee", bold()));
    }

    #[test]
    fn chunks_follow_runs_within_slice() {
        let mut b = StyledText::new();
        b.push_str("Take ", bold());
        b.push_str("my ", Flavor::new().fg(Color::simple(2)));
        b.push_str("love", italic());
        let chunks: Vec<String> = b
            .slice(2, 10)
            .chunks()
            .map(|c| c.text.iter().collect())
            .collect();
        assert_eq!(chunks, vec!["ke ", "my ", "lo"]);
    }

    #[test]
    fn truncate_trims_runs() {
        let mut b = StyledText::new();
        b.push_str("Take ", bold());
        b.push_str("my", italic());
        b.truncate(3);
        assert_eq!(b, StyledText::styled("Tak", bold()));
        b.truncate(0);
        assert!(b.is_empty());
        assert!(b.runs().is_empty());
    }

    #[test]
    fn remove_trailing_newline() {
        let mut b = StyledText::plain("wash\n");
        assert!(b.ends_with_newline());
        assert!(b.remove_trailing_newline());
        assert_eq!(b.to_string(), "wash");
        assert!(!b.remove_trailing_newline());
    }

    // =========================================================================
    // split_at_newlines
    // =========================================================================

    #[test]
    fn split_empty_string() {
        assert_eq!(strings(&StyledText::new().lines()), vec![""]);
    }

    #[test]
    fn split_only_newline() {
        assert_eq!(strings(&StyledText::plain("\n").lines()), vec!["\n"]);
    }

    #[test]
    fn split_without_newline() {
        assert_eq!(
            strings(&StyledText::plain("Take my love").lines()),
            vec!["Take my love"]
        );
        assert_eq!(
            strings(&StyledText::plain("Take my love\n").lines()),
            vec!["Take my love\n"]
        );
    }

    #[test]
    fn split_includes_newlines() {
        assert_eq!(
            strings(&StyledText::plain("Take\nmy\nlove\n").lines()),
            vec!["Take\n", "my\n", "love\n"]
        );
    }

    #[test]
    fn split_continues_a_single_line() {
        let mut dest = vec![StyledText::plain("Take my")];
        StyledText::plain(" love").split_at_newlines(&mut dest, true);
        assert_eq!(strings(&dest), vec!["Take my love"]);
    }

    #[test]
    fn split_continues_multiple_lines() {
        let mut dest = vec![StyledText::plain("Ta")];
        StyledText::plain("ke\nmy\nlove\n").split_at_newlines(&mut dest, true);
        assert_eq!(strings(&dest), vec!["Take\n", "my\n", "love\n"]);
    }

    #[test]
    fn split_does_not_continue_closed_line() {
        let mut dest = vec![StyledText::plain("Take\n")];
        StyledText::plain("my").split_at_newlines(&mut dest, true);
        assert_eq!(strings(&dest), vec!["Take\n", "my"]);
    }

    #[test]
    fn split_empty_while_continuing_adds_nothing() {
        let mut dest = vec![StyledText::plain("Take")];
        StyledText::new().split_at_newlines(&mut dest, true);
        assert_eq!(dest.len(), 1);
    }
}
