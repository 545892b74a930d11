//! Fixed-capacity ring of logical lines.
//!
//! Uses a `VecDeque` for O(1) push and eviction. When full, pushing evicts
//! the oldest line (front of the deque) and hands it back to the caller, which
//! either drops it or migrates it to disk.

use std::collections::VecDeque;

use mudterm_text::StyledText;

/// Ring of lines, index 0 = oldest.
#[derive(Debug, Clone)]
pub struct LineRing {
    lines: VecDeque<StyledText>,
    capacity: usize,
}

impl LineRing {
    /// A capacity of `0` drops every push.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.lines.len() >= self.capacity
    }

    /// Append a line, returning the evicted oldest line when full.
    pub fn push(&mut self, line: StyledText) -> Option<StyledText> {
        if self.capacity == 0 {
            return None;
        }
        let evicted = if self.lines.len() == self.capacity {
            self.lines.pop_front()
        } else {
            None
        };
        self.lines.push_back(line);
        evicted
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StyledText> {
        self.lines.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut StyledText> {
        self.lines.get_mut(index)
    }

    pub fn last_mut(&mut self) -> Option<&mut StyledText> {
        self.lines.back_mut()
    }

    pub fn pop_back(&mut self) -> Option<StyledText> {
        self.lines.pop_back()
    }

    /// Remove the `count` oldest lines.
    pub fn drain_front(&mut self, count: usize) -> impl Iterator<Item = StyledText> + '_ {
        let count = count.min(self.lines.len());
        self.lines.drain(..count)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StyledText> + ExactSizeIterator {
        self.lines.iter()
    }
}
