//! Append-only scrollback file.
//!
//! One logical line per file line, encoded with inline SGR escapes. A last
//! line without a terminating `\n` still counts as a line. Reads go backward
//! from the end of the file since scrolling back starts from the newest text;
//! line start offsets are discovered lazily and remembered.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use mudterm_text::{StyledText, ansi};

const CHUNK: usize = 4096;

/// Handle on a scrollback file plus a lazily-built index of its tail.
#[derive(Debug)]
pub struct DiskLog {
    path: PathBuf,
    file_len: u64,
    line_count: usize,
    ends_with_newline: bool,
    /// Start offsets of the newest `starts.len()` lines, oldest first.
    starts: VecDeque<u64>,
}

impl DiskLog {
    /// Open `path` and count its lines. A missing file has no lines.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut log = Self::empty(path);
        log.rescan()?;
        Ok(log)
    }

    /// A log for `path` that assumes the file holds nothing.
    #[must_use]
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            file_len: 0,
            line_count: 0,
            ends_with_newline: true,
            starts: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    fn swap_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".swp");
        PathBuf::from(name)
    }

    fn rescan(&mut self) -> io::Result<()> {
        self.starts.clear();
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.file_len = 0;
                self.line_count = 0;
                self.ends_with_newline = true;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut buf = vec![0u8; CHUNK * 4];
        let mut count = 0;
        let mut len = 0u64;
        let mut last = b'\n';
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            count += memchr::memchr_iter(b'\n', &buf[..n]).count();
            len += n as u64;
            last = buf[n - 1];
        }
        if last != b'\n' {
            count += 1;
        }
        self.file_len = len;
        self.line_count = count;
        self.ends_with_newline = last == b'\n';
        Ok(())
    }

    /// Make sure the start offsets of the newest `lines` lines are known.
    fn index_tail(&mut self, lines: usize) -> io::Result<()> {
        if self.starts.len() >= lines {
            return Ok(());
        }
        let mut file = File::open(&self.path)?;
        while self.starts.len() < lines && self.starts.len() < self.line_count {
            let limit = match self.starts.front() {
                Some(&start) => start.saturating_sub(1),
                None if self.ends_with_newline => self.file_len - 1,
                None => self.file_len,
            };
            let start = find_line_start(&mut file, limit)?;
            self.starts.push_front(start);
        }
        Ok(())
    }

    /// Byte offset where line `line` starts. `line == line_count` is the end
    /// of the file.
    pub fn offset_of_line(&mut self, line: usize) -> io::Result<u64> {
        if line == 0 {
            return Ok(0);
        }
        if line >= self.line_count {
            return Ok(self.file_len);
        }
        let from_end = self.line_count - line;
        if from_end <= self.starts.len() {
            return Ok(self.starts[self.starts.len() - from_end]);
        }

        let mut file = File::open(&self.path)?;
        let mut buf = vec![0u8; CHUNK * 4];
        let mut seen = 0;
        let mut offset = 0u64;
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                return Ok(self.file_len);
            }
            for pos in memchr::memchr_iter(b'\n', &buf[..n]) {
                seen += 1;
                if seen == line {
                    return Ok(offset + pos as u64 + 1);
                }
            }
            offset += n as u64;
        }
    }

    /// Read line `line` (0 = oldest line in the file). The returned line
    /// always ends in `\n`.
    ///
    /// # Panics
    ///
    /// Panics if `line` is out of range.
    pub fn read_line(&mut self, line: usize) -> io::Result<StyledText> {
        assert!(
            line < self.line_count,
            "file line {line} out of range ({} lines)",
            self.line_count
        );
        let from_end = self.line_count - line;
        self.index_tail(from_end)?;
        let idx = self.starts.len() - from_end;
        let start = self.starts[idx];
        let end = self.starts.get(idx + 1).copied().unwrap_or(self.file_len);

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(start))?;
        let mut bytes = vec![0u8; (end - start) as usize];
        file.read_exact(&mut bytes)?;
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        Ok(decode_line(&bytes))
    }

    /// Append one line at the end of the file.
    pub fn append_line(&mut self, line: &StyledText) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut bytes = Vec::with_capacity(line.len() + 16);
        if !self.ends_with_newline {
            bytes.push(b'\n');
        }
        let start = self.file_len + bytes.len() as u64;
        bytes.extend_from_slice(encode_line(line).as_bytes());
        file.write_all(&bytes)?;

        // Only a contiguous tail of starts is valid.
        if !self.starts.is_empty() || self.line_count == 0 {
            self.starts.push_back(start);
        }
        self.file_len += bytes.len() as u64;
        self.line_count += 1;
        self.ends_with_newline = true;
        Ok(())
    }

    /// Rewrite the file as its newest `keep` lines followed by `lines`.
    ///
    /// The new content goes to `<file>.swp` first and is renamed over the
    /// file, so a failure leaves the old file and this handle untouched.
    pub fn compact<'a, I>(&mut self, keep: usize, lines: I) -> io::Result<usize>
    where
        I: IntoIterator<Item = &'a StyledText>,
    {
        let keep = keep.min(self.line_count);
        let offset = if keep == 0 {
            self.file_len
        } else {
            self.offset_of_line(self.line_count - keep)?
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.swap_path();
        let result = self.write_swap(&tmp, offset, keep, lines);
        let written = match result {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
        };
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        self.file_len = written.bytes;
        self.line_count = keep + written.lines;
        self.ends_with_newline = written.ends_with_newline;
        self.starts.clear();

        tracing::debug!(
            path = %self.path.display(),
            kept = keep,
            flushed = written.lines,
            "compacted scrollback file"
        );
        Ok(written.lines)
    }

    fn write_swap<'a, I>(&self, tmp: &Path, offset: u64, keep: usize, lines: I) -> io::Result<Written>
    where
        I: IntoIterator<Item = &'a StyledText>,
    {
        let mut out = BufWriter::new(File::create(tmp)?);
        let mut bytes = 0u64;
        let mut needs_newline = false;
        if keep > 0 {
            let mut input = File::open(&self.path)?;
            input.seek(SeekFrom::Start(offset))?;
            bytes = io::copy(&mut input, &mut out)?;
            needs_newline = bytes > 0 && !self.ends_with_newline;
        }

        let mut count = 0;
        for line in lines {
            if needs_newline {
                out.write_all(b"\n")?;
                bytes += 1;
                needs_newline = false;
            }
            let encoded = encode_line(line);
            out.write_all(encoded.as_bytes())?;
            bytes += encoded.len() as u64;
            count += 1;
        }
        out.flush()?;
        out.get_ref().sync_all()?;

        Ok(Written {
            bytes,
            lines: count,
            ends_with_newline: !needs_newline,
        })
    }

    /// Delete the file.
    pub fn remove(&mut self) -> io::Result<()> {
        self.file_len = 0;
        self.line_count = 0;
        self.ends_with_newline = true;
        self.starts.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

struct Written {
    bytes: u64,
    lines: usize,
    ends_with_newline: bool,
}

/// Start of the line whose content ends at byte `limit` (exclusive): one past
/// the last `\n` before `limit`, or 0.
fn find_line_start(file: &mut File, limit: u64) -> io::Result<u64> {
    let mut buf = [0u8; CHUNK];
    let mut end = limit;
    while end > 0 {
        let start = end.saturating_sub(CHUNK as u64);
        let len = (end - start) as usize;
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut buf[..len])?;
        if let Some(pos) = memchr::memrchr(b'\n', &buf[..len]) {
            return Ok(start + pos as u64 + 1);
        }
        end = start;
    }
    Ok(0)
}

/// One file line: the text without its newline, SGR-encoded, then `\n`.
fn encode_line(line: &StyledText) -> String {
    let end = if line.ends_with_newline() {
        line.len() - 1
    } else {
        line.len()
    };
    let mut out = ansi::slice_to_ansi(line.slice(0, end));
    out.push('\n');
    out
}

fn decode_line(bytes: &[u8]) -> StyledText {
    let text = String::from_utf8_lossy(bytes);
    let mut line = ansi::from_ansi(&text);
    let flavor = line.last_flavor().unwrap_or_default();
    line.push('\n', flavor);
    line.set_trailing_flavor(None);
    line
}
