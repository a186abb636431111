//! Sequential text sinks and sources
//!
//! Handles own their file and close it when dropped. Call
//! [`CsvSink::finish`] to observe flush errors instead of losing them on drop.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for appended text
pub trait CsvSink {
    /// Append text verbatim
    fn append(&mut self, text: &str) -> io::Result<()>;

    /// Flush buffered text
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Origin of ordered text lines
pub trait CsvSource {
    /// Every line, without line terminators
    fn read_all_lines(&mut self) -> io::Result<Vec<String>>;
}

impl CsvSink for String {
    fn append(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text);
        Ok(())
    }
}

/// How a [`FileSink`] treated existing content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// The file was missing or empty
    Fresh,

    /// The file held content; writes go after it
    Append,
}

/// File destination with the fresh-or-append open policy
///
/// A missing or empty file is opened fresh. A file that already holds
/// content is appended to, never truncated.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    mode: OpenMode,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open (creating if needed) the file at `path`
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();

        let existing_len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };

        let mode = if existing_len == 0 {
            OpenMode::Fresh
        } else {
            OpenMode::Append
        };

        let file = match mode {
            OpenMode::Fresh => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
            OpenMode::Append => OpenOptions::new().append(true).open(path)?,
        };

        tracing::info!(path = %path.display(), ?mode, "opened CSV file");

        Ok(Self {
            path: path.to_path_buf(),
            mode,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }
}

impl CsvSink for FileSink {
    fn append(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        tracing::debug!(path = %self.path.display(), "flushed CSV file");
        Ok(())
    }
}

/// Line source over any buffered reader
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

/// File-backed line source
pub type FileSource = LineSource<BufReader<File>>;

impl LineSource<BufReader<File>> {
    /// Open the file at `path` for reading
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> CsvSource for LineSource<R> {
    fn read_all_lines(&mut self) -> io::Result<Vec<String>> {
        self.reader.by_ref().lines().collect()
    }
}
