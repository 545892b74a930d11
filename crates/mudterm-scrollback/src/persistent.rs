//! Ring of unflushed lines in front of a [`DiskLog`].
//!
//! The two halves form one list of at most `capacity` lines: the newest
//! lines of the file followed by the pending ring. Lines read back from the
//! file are kept in an LRU cache keyed by file line number.

use std::num::NonZeroUsize;
use std::path::Path;

use lru::LruCache;
use mudterm_text::StyledText;

use crate::disk::DiskLog;
use crate::error::PersistResult;
use crate::ring::LineRing;

/// Default number of file lines kept decoded in memory.
pub const DEFAULT_READ_CACHE_LINES: usize = 512;

/// Disk-backed line storage.
#[derive(Debug)]
pub struct DiskBackedLines {
    pending: LineRing,
    log: DiskLog,
    cache: LruCache<usize, StyledText>,
}

impl DiskBackedLines {
    /// Open `path` for `capacity` lines. Failing to read an existing file
    /// is logged and treated as an empty history.
    #[must_use]
    pub fn open(path: &Path, capacity: usize, read_cache: usize) -> Self {
        let log = match DiskLog::open(path) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read persisted scrollback; starting empty"
                );
                DiskLog::empty(path.to_path_buf())
            }
        };
        tracing::debug!(path = %path.display(), lines = log.line_count(), "opened scrollback file");
        Self {
            pending: LineRing::new(capacity),
            log,
            cache: LruCache::new(NonZeroUsize::new(read_cache.max(1)).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.log.path()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pending.capacity()
    }

    /// Lines of the file that are part of the list.
    #[must_use]
    pub fn file_visible(&self) -> usize {
        self.log
            .line_count()
            .min(self.capacity() - self.pending.len())
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.file_visible() + self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Line `index` of the list, reading from the file when needed.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn get(&mut self, index: usize) -> &StyledText {
        let file_visible = self.file_visible();
        if index < file_visible {
            let line = self.log.line_count() - file_visible + index;
            let log = &mut self.log;
            return self.cache.get_or_insert(line, || {
                log.read_line(line).unwrap_or_else(|e| {
                    tracing::warn!(
                        path = %log.path().display(),
                        line,
                        error = %e,
                        "failed to read persisted line"
                    );
                    StyledText::plain("\n")
                })
            });
        }
        let pending = index - file_visible;
        match self.pending.get(pending) {
            Some(line) => line,
            None => panic!("line {index} out of range (len {})", file_visible + self.pending.len()),
        }
    }

    /// Append a line. A line pushed out of the full ring goes to the file.
    pub fn push(&mut self, line: StyledText) {
        if let Some(evicted) = self.pending.push(line) {
            if let Err(e) = self.log.append_line(&evicted) {
                tracing::warn!(
                    path = %self.log.path().display(),
                    error = %e,
                    "failed to migrate evicted line to scrollback file"
                );
            }
        }
    }

    /// The newest line, if it has not been flushed.
    pub fn last_pending_mut(&mut self) -> Option<&mut StyledText> {
        self.pending.last_mut()
    }

    /// Mutable access to list line `index` if it is still pending.
    pub fn pending_mut(&mut self, index: usize) -> Option<&mut StyledText> {
        let file_visible = self.file_visible();
        index
            .checked_sub(file_visible)
            .and_then(|i| self.pending.get_mut(i))
    }

    pub fn pop_pending(&mut self) -> Option<StyledText> {
        self.pending.pop_back()
    }

    /// Write up to `max_lines` pending lines to the file, keeping only the
    /// newest `capacity` lines on disk.
    ///
    /// On failure nothing in memory changes.
    pub fn flush(&mut self, max_lines: usize) -> PersistResult<usize> {
        let to_flush = self.pending.len().min(max_lines);
        let keep = (self.capacity() - to_flush).min(self.file_visible());
        let flushed = self
            .log
            .compact(keep, self.pending.iter().take(to_flush))?;
        self.pending.drain_front(flushed).for_each(drop);
        self.cache.clear();
        Ok(flushed)
    }

    /// Drop everything and delete the file.
    pub fn clear(&mut self) -> PersistResult<()> {
        self.pending.clear();
        self.cache.clear();
        self.log.remove()?;
        Ok(())
    }

    /// Every line, oldest first, reading the file as needed.
    pub fn to_lines(&mut self) -> Vec<StyledText> {
        (0..self.len()).map(|i| self.get(i).clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(lines: &mut DiskBackedLines) -> Vec<String> {
        lines.to_lines().iter().map(ToString::to_string).collect()
    }

    fn line(s: &str) -> StyledText {
        StyledText::plain(s)
    }

    #[test]
    fn reads_all_persisted_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manual.log");
        fs::write(&path, "Take my love\nTake my land").unwrap();
        let mut lines = DiskBackedLines::open(&path, 100, 8);
        assert_eq!(lines.len(), 2);
        assert_eq!(strings(&mut lines), ["Take my love\n", "Take my land\n"]);
    }

    #[test]
    fn persists_one_by_one() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("one-by-one.log");
        let mut lines = DiskBackedLines::open(&path, 100, 8);
        for text in ["Take my love", "Take my land", "Take me where I cannot stand"] {
            lines.push(line(text));
            lines.flush(usize::MAX).unwrap();
        }
        let mut reopened = DiskBackedLines::open(&path, 100, 8);
        assert_eq!(reopened.len(), 3);
        assert_eq!(reopened.get(2).to_string().trim(), "Take me where I cannot stand");
    }

    #[test]
    fn batch_flush_leaves_list_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("batch.log");
        let mut lines = DiskBackedLines::open(&path, 100, 8);
        for text in ["Take my love\n", "Take my land\n", "Take me where I cannot stand\n"] {
            lines.push(line(text));
        }
        assert_eq!(lines.flush(usize::MAX).unwrap(), 3);
        assert_eq!(lines.pending_len(), 0);
        assert_eq!(
            strings(&mut lines),
            ["Take my love\n", "Take my land\n", "Take me where I cannot stand\n"]
        );
    }

    #[test]
    fn flush_drops_old_persisted_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("circled.log");
        fs::write(&path, "Take my love\nTake my land").unwrap();
        let mut lines = DiskBackedLines::open(&path, 2, 8);
        lines.push(line("Take me where"));
        assert_eq!(strings(&mut lines), ["Take my land\n", "Take me where"]);
        lines.flush(usize::MAX).unwrap();

        let on_disk: Vec<String> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|l| mudterm_text::ansi::from_ansi(l).to_string())
            .collect();
        assert_eq!(on_disk, ["Take my land", "Take me where"]);

        let mut reopened = DiskBackedLines::open(&path, 100, 8);
        assert_eq!(strings(&mut reopened), ["Take my land\n", "Take me where\n"]);
    }

    #[test]
    fn partial_flush() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("partial.log");
        let mut lines = DiskBackedLines::open(&path, 10, 8);
        for text in ["mal\n", "zoe\n", "wash\n"] {
            lines.push(line(text));
        }
        assert_eq!(lines.flush(2).unwrap(), 2);
        assert_eq!(lines.pending_len(), 1);
        assert_eq!(strings(&mut lines), ["mal\n", "zoe\n", "wash\n"]);
    }

    #[test]
    fn overflow_migrates_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("overflow.log");
        let mut lines = DiskBackedLines::open(&path, 2, 8);
        for text in ["mal\n", "zoe\n", "wash\n"] {
            lines.push(line(text));
        }
        assert_eq!(lines.len(), 2);
        assert_eq!(strings(&mut lines), ["zoe\n", "wash\n"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "\x1b[0mmal\n");
    }

    #[test]
    fn failed_flush_keeps_pending_lines() {
        let tmp = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = tmp.path().join("blocked");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupant"), "x").unwrap();
        let mut lines = DiskBackedLines::open(&path, 10, 8);
        lines.push(line("jayne\n"));
        assert!(lines.flush(usize::MAX).is_err());
        assert_eq!(lines.pending_len(), 1);
        assert_eq!(lines.get(0).to_string(), "jayne\n");
    }

    #[test]
    fn clear_deletes_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clear.log");
        let mut lines = DiskBackedLines::open(&path, 10, 8);
        lines.push(line("river\n"));
        lines.flush(usize::MAX).unwrap();
        assert!(path.exists());
        lines.clear().unwrap();
        assert!(!path.exists());
        assert!(lines.is_empty());
    }
}
