//! Command log file
//!
//! A plain-text record of every statement a store ran and how it went. The
//! file is truncated when the log is opened, so it only ever covers one
//! session.

use chrono::Local;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamp prefix of every log line
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Session log of executed commands
pub struct CommandLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl CommandLog {
    /// Create or truncate the log file at `path`
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        tracing::info!(path = %path.display(), "opened command log");

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line and flush it
    pub fn record(&self, message: &str) -> io::Result<()> {
        let line = format!("[{}] {}\n", Local::now().format(TIMESTAMP_FORMAT), message);

        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "command log lock poisoned"))?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }

    /// Everything written to the file so far
    pub fn contents(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}
