#![forbid(unsafe_code)]

//! The scrollback buffer.
//!
//! A [`ScrollbackBuffer`] is an ordered list of logical lines, oldest first,
//! holding at most `capacity` lines. Each line ends in `\n` except possibly
//! the newest, which stays open until its newline arrives.
//!
//! Storage is either an in-memory ring, where evicted lines are dropped, or a
//! [`DiskBackedLines`] whose evicted lines move to the scrollback file. Every
//! mutation advances the buffer's [`BufferStamp`] so that windows viewing the
//! buffer can keep their visible rows in place.
//!
//! # Example
//! ```
//! use mudterm_scrollback::ScrollbackBuffer;
//! use mudterm_text::StyledText;
//!
//! let mut buffer = ScrollbackBuffer::new(2);
//! buffer.append(&StyledText::plain("Take my"));
//! buffer.append(&StyledText::plain(" love\nTake my land\n"));
//! buffer.append_line(&StyledText::plain("Take me where I cannot stand"));
//!
//! assert_eq!(buffer.len(), 2);
//! assert_eq!(buffer.line(0).to_string(), "Take my land\n");
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mudterm_style::Flavor;
use mudterm_text::{LineSink, StyledText};
use parking_lot::Mutex;

use crate::error::{BufferError, BufferResult, PersistError, PersistResult};
use crate::persistent::{DEFAULT_READ_CACHE_LINES, DiskBackedLines};
use crate::ring::LineRing;

/// Default number of lines a buffer keeps.
pub const DEFAULT_SCROLLBACK_LINES: usize = 20_000;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique buffer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    fn next() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Change counters of a buffer.
///
/// `pushed` counts lines ever added at the end. `generation` changes on edits
/// that invalidate line positions (clear, delete, replace, persistence
/// switches). `revision` changes on every mutation, including text added to
/// the open newest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStamp {
    pub generation: u64,
    pub pushed: u64,
    pub revision: u64,
}

#[derive(Debug)]
enum Storage {
    Memory(LineRing),
    Disk(DiskBackedLines),
}

/// A buffer shared between windows.
pub type SharedBuffer = Arc<Mutex<ScrollbackBuffer>>;

/// Bounded list of logical lines.
#[derive(Debug)]
pub struct ScrollbackBuffer {
    id: BufferId,
    capacity: usize,
    read_cache: usize,
    storage: Storage,
    stamp: BufferStamp,
}

impl ScrollbackBuffer {
    /// An in-memory buffer of `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            id: BufferId::next(),
            capacity,
            read_cache: DEFAULT_READ_CACHE_LINES,
            storage: Storage::Memory(LineRing::new(capacity)),
            stamp: BufferStamp::default(),
        }
    }

    /// Set how many persisted lines are kept decoded once the buffer is
    /// made persistent.
    #[must_use]
    pub fn with_read_cache(mut self, lines: usize) -> Self {
        self.read_cache = lines;
        self
    }

    /// Wrap into a [`SharedBuffer`].
    #[must_use]
    pub fn shared(self) -> SharedBuffer {
        Arc::new(Mutex::new(self))
    }

    #[must_use]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn stamp(&self) -> BufferStamp {
        self.stamp
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Memory(ring) => ring.len(),
            Storage::Disk(lines) => lines.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.storage, Storage::Disk(_))
    }

    #[must_use]
    pub fn persistent_path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::Memory(_) => None,
            Storage::Disk(lines) => Some(lines.path()),
        }
    }

    /// Line `index`, oldest first.
    ///
    /// Takes `&mut self` because persisted lines are read and cached lazily.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn line(&mut self, index: usize) -> &StyledText {
        match &mut self.storage {
            Storage::Memory(ring) => {
                let len = ring.len();
                match ring.get(index) {
                    Some(line) => line,
                    None => panic!("line {index} out of range (len {len})"),
                }
            }
            Storage::Disk(lines) => lines.get(index),
        }
    }

    /// The newest line.
    pub fn last_line(&mut self) -> Option<&StyledText> {
        let len = self.len();
        if len == 0 {
            None
        } else {
            Some(self.line(len - 1))
        }
    }

    /// Copies of every line, oldest first.
    pub fn to_lines(&mut self) -> Vec<StyledText> {
        match &mut self.storage {
            Storage::Memory(ring) => ring.iter().cloned().collect(),
            Storage::Disk(lines) => lines.to_lines(),
        }
    }

    fn touch(&mut self) {
        self.stamp.revision += 1;
    }

    fn invalidate(&mut self) {
        self.stamp.generation += 1;
        self.touch();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Appending
    // ─────────────────────────────────────────────────────────────────────

    /// Append text, continuing the newest line if it is still open.
    pub fn append(&mut self, text: &StyledText) {
        text.split_at_newlines(self, true);
        self.touch();
    }

    /// Append `line` as one or more complete lines. A missing `\n` is added.
    pub fn append_line(&mut self, line: &StyledText) {
        let mut line = line.clone();
        if !line.ends_with_newline() {
            line.append_plain("\n");
        }
        line.split_at_newlines(self, false);
        self.touch();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────

    /// Drop every line. A persistent buffer also deletes its file and stays
    /// persistent.
    pub fn clear(&mut self) {
        match &mut self.storage {
            Storage::Memory(ring) => ring.clear(),
            Storage::Disk(lines) => {
                if let Err(e) = lines.clear() {
                    tracing::warn!(
                        path = %lines.path().display(),
                        error = %e,
                        "failed to delete scrollback file"
                    );
                }
            }
        }
        self.invalidate();
    }

    /// Remove and return the newest line.
    ///
    /// Fails with [`BufferError::LineOnDisk`] if the newest line has already
    /// been flushed.
    pub fn delete_last(&mut self) -> BufferResult<Option<StyledText>> {
        let len = self.len();
        let removed = match &mut self.storage {
            Storage::Memory(ring) => ring.pop_back(),
            Storage::Disk(lines) => {
                if lines.pending_len() == 0 && len > 0 {
                    return Err(BufferError::LineOnDisk { index: len - 1 });
                }
                lines.pop_pending()
            }
        };
        if removed.is_some() {
            self.invalidate();
        }
        Ok(removed)
    }

    /// Replace the newest line with `line`, or append it to an empty buffer.
    pub fn replace_last_line(&mut self, line: &StyledText) -> BufferResult<()> {
        self.delete_last()?;
        self.append_line(line);
        self.invalidate();
        Ok(())
    }

    /// Replace line `index`. A missing `\n` is added.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set_line(&mut self, index: usize, line: &StyledText) -> BufferResult<()> {
        let len = self.len();
        assert!(index < len, "line {index} out of range (len {len})");
        let body = line.len().saturating_sub(1);
        if line.chars()[..body].contains(&'\n') {
            return Err(BufferError::EmbeddedNewline { index });
        }

        let mut line = line.clone();
        if !line.ends_with_newline() {
            line.append_plain("\n");
        }
        let slot = match &mut self.storage {
            Storage::Memory(ring) => ring.get_mut(index),
            Storage::Disk(lines) => lines.pending_mut(index),
        };
        match slot {
            Some(slot) => *slot = line,
            None => return Err(BufferError::LineOnDisk { index }),
        }
        self.invalidate();
        Ok(())
    }

    /// Replace the whole contents with `lines`.
    pub fn set_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a StyledText>) {
        self.clear();
        for line in lines {
            self.append_line(line);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────

    /// Back the buffer with the file at `path`.
    ///
    /// The current in-memory lines are replaced by the file's history. When
    /// the file held any lines, an inverse banner noting how many were loaded
    /// and a blank line are appended.
    pub fn set_persistent(&mut self, path: impl Into<PathBuf>) -> PersistResult<()> {
        if let Storage::Disk(lines) = &self.storage {
            return Err(PersistError::AlreadyPersistent(lines.path().to_path_buf()));
        }
        let path = path.into();
        let lines = DiskBackedLines::open(&path, self.capacity, self.read_cache);
        let loaded = lines.len();
        self.storage = Storage::Disk(lines);
        self.invalidate();

        if loaded > 0 {
            let banner = format!(
                "^^^ Loaded {loaded} lines at {}\n",
                chrono::Local::now().format("%a %b %e %H:%M:%S %Y")
            );
            self.append_line(&StyledText::styled(&banner, Flavor::new().inverse()));
            self.append_line(&StyledText::new());
        }
        tracing::info!(
            buffer = self.id.get(),
            path = %path.display(),
            lines = loaded,
            "scrollback persistence enabled"
        );
        Ok(())
    }

    /// Save everything to the file, then keep the lines in memory only.
    ///
    /// On failure the buffer stays persistent.
    pub fn set_not_persistent(&mut self) -> PersistResult<()> {
        let Storage::Disk(lines) = &mut self.storage else {
            return Ok(());
        };
        lines.flush(usize::MAX)?;
        let mut ring = LineRing::new(self.capacity);
        for line in lines.to_lines() {
            ring.push(line);
        }
        tracing::info!(
            buffer = self.id.get(),
            path = %lines.path().display(),
            "scrollback persistence disabled"
        );
        self.storage = Storage::Memory(ring);
        self.invalidate();
        Ok(())
    }

    /// Write up to `max_lines` unsaved lines to the file. Returns how many
    /// were written; always `0` for an in-memory buffer.
    pub fn flush(&mut self, max_lines: usize) -> PersistResult<usize> {
        match &mut self.storage {
            Storage::Memory(_) => Ok(0),
            Storage::Disk(lines) => lines.flush(max_lines),
        }
    }
}

impl Default for ScrollbackBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK_LINES)
    }
}

impl LineSink for ScrollbackBuffer {
    fn open_line_mut(&mut self) -> Option<&mut StyledText> {
        let last = match &mut self.storage {
            Storage::Memory(ring) => ring.last_mut(),
            Storage::Disk(lines) => lines.last_pending_mut(),
        };
        last.filter(|line| !line.ends_with_newline())
    }

    fn push_line(&mut self, line: StyledText) {
        match &mut self.storage {
            Storage::Memory(ring) => {
                ring.push(line);
            }
            Storage::Disk(lines) => lines.push(line),
        }
        self.stamp.pushed += 1;
    }
}
