//! Append-only failure log
//!
//! Core components report failures through the `FailureSink` trait instead
//! of writing to a process-wide file, so extraction and download logic stay
//! testable without filesystem side effects. The production sink appends
//! timestamped lines in the legacy log format.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Category tag for a logged failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// An HTTP GET failed after all attempts
    Get,
    /// An image could not be decoded or written
    Write,
    /// The `info.json` artifact could not be produced
    WriteJson,
}

impl FailureCategory {
    /// Formats the legacy log line body for this category
    pub fn message(&self, url: &str) -> String {
        match self {
            Self::Get => format!("[GET ERROR] fail to get {url}"),
            Self::Write => format!("[Write ERROR] fail to write {url}"),
            Self::WriteJson => format!("[Write Json Error] Fail to write Json for {url}"),
        }
    }
}

/// Records per-post failures without aborting the crawl
pub trait FailureSink: Send + Sync {
    fn record(&self, category: FailureCategory, url: &str);
}

/// File-backed failure log; one `<timestamp> <message>` line per entry
///
/// Writes are serialized through a mutex; the file is opened in append mode
/// so a pre-existing log keeps accumulating across runs.
pub struct FileFailureLog {
    file: Mutex<File>,
}

impl FileFailureLog {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FailureSink for FileFailureLog {
    fn record(&self, category: FailureCategory, url: &str) {
        let line = format!("{} {}", Local::now(), category.message(url));
        let mut file = self.file.lock().unwrap();
        if let Err(e) = writeln!(file, "{line}") {
            tracing::warn!("Failed to append to failure log: {}", e);
        }
    }
}

/// In-memory sink for tests and dry inspection
#[derive(Default)]
pub struct MemoryFailureLog {
    entries: Mutex<Vec<(FailureCategory, String)>>,
}

impl MemoryFailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(FailureCategory, String)> {
        self.entries.lock().unwrap().clone()
    }
}

impl FailureSink for MemoryFailureLog {
    fn record(&self, category: FailureCategory, url: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((category, url.to_string()));
    }
}
