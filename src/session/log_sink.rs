//! Append-only CSV measurement log
//!
//! One file per session. Every row is flushed and synced to disk before
//! [`LogSink::append`] returns, so a crash can lose at most the row that was
//! being written.
//!
//! # Format
//!
//! ```text
//! timestamp,value_mm
//! 2024-03-05 14:07:09.000012,10.01
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{LoggerError, Result, ResultExt};
use crate::types::Reading;

/// Header row written at the top of every log
pub const LOG_HEADER: [&str; 2] = ["timestamp", "value_mm"];

/// Extension of measurement logs
pub const LOG_EXTENSION: &str = "csv";

/// Upper bound on collision suffixes tried before giving up
const MAX_SUFFIX: u32 = 10_000;

/// Base file name for a session started at `started_at`
///
/// `<DeviceName>_Measurements_<YYYYMMDD>_<HHMMSS>`
pub fn session_base_name(device_name: &str, started_at: DateTime<Local>) -> String {
    format!(
        "{}_Measurements_{}",
        device_name,
        started_at.format("%Y%m%d_%H%M%S")
    )
}

/// File name for the `n`th candidate (`n == 1` has no suffix)
fn candidate_name(base_name: &str, n: u32) -> String {
    if n <= 1 {
        format!("{}.{}", base_name, LOG_EXTENSION)
    } else {
        format!("{}_{}.{}", base_name, n, LOG_EXTENSION)
    }
}

/// Encode one CSV record, line terminator included
fn encode_record(record: &[&str]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(record)?;
    writer
        .into_inner()
        .map_err(|e| LoggerError::LogSink(format!("Failed to encode row: {}", e)))
}

/// Append-only storage behind a [`LogSink`]
///
/// Writes always land at the end. `truncate` must drop everything past `len`
/// so a row that failed halfway leaves no trace.
pub trait LogStorage: Write + Send {
    /// Make written bytes durable
    fn sync(&mut self) -> io::Result<()>;

    /// Cut the storage back to `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogStorage for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Open writer for a session's measurement log
pub struct LogSink {
    path: PathBuf,
    storage: Box<dyn LogStorage>,
    /// Length of the durable prefix: the header plus every complete row
    committed_len: u64,
    rows_written: u64,
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("path", &self.path)
            .field("committed_len", &self.committed_len)
            .field("rows_written", &self.rows_written)
            .finish()
    }
}

impl LogSink {
    /// Create a new log file in `directory`, never reusing an existing name
    ///
    /// The directory is created if needed. If `<base>.csv` is taken, `_2`,
    /// `_3`, ... suffixes are tried in turn. Files are opened with
    /// `create_new`, so a name is only claimed if nobody else holds it. The
    /// header row is written and synced before this returns.
    pub fn create_unique(directory: &Path, base_name: &str) -> Result<Self> {
        std::fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create data directory {:?}", directory))?;

        for n in 1..=MAX_SUFFIX {
            let path = directory.join(candidate_name(base_name, n));
            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => return Self::from_storage(path, Box::new(file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("Log file {:?} exists, trying next suffix", path);
                }
                Err(e) => {
                    return Err(LoggerError::Io(e)
                        .with_context(format!("Failed to create log file {:?}", path)));
                }
            }
        }

        Err(LoggerError::LogSink(format!(
            "No free file name for {:?} in {:?}",
            base_name, directory
        )))
    }

    /// Start a log on empty storage, writing the header row
    ///
    /// `path` is only used for display and error messages.
    pub fn from_storage(path: PathBuf, storage: Box<dyn LogStorage>) -> Result<Self> {
        let mut sink = Self {
            path,
            storage,
            committed_len: 0,
            rows_written: 0,
        };

        sink.write_durable(&LOG_HEADER)
            .with_context(|| format!("Failed to write header to {:?}", sink.path))?;

        tracing::info!("Logging measurements to {:?}", sink.path);
        Ok(sink)
    }

    /// Append one reading as a row
    ///
    /// On error nothing of the row stays in the log, so a later append never
    /// carries a reading the caller was told had failed.
    pub fn append(&mut self, reading: &Reading) -> Result<()> {
        let timestamp = reading.timestamp_string();
        let value = reading.value.to_string();

        self.write_durable(&[timestamp.as_str(), value.as_str()])
            .map_err(|e| LoggerError::LogSink(format!("{:?}: {}", self.path, e)))?;

        self.rows_written += 1;
        Ok(())
    }

    fn write_durable(&mut self, record: &[&str]) -> Result<()> {
        let bytes = encode_record(record)?;

        let written = self
            .storage
            .write_all(&bytes)
            .and_then(|()| self.storage.flush())
            .and_then(|()| self.storage.sync());

        match written {
            Ok(()) => {
                self.committed_len += bytes.len() as u64;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = self.storage.truncate(self.committed_len) {
                    tracing::error!(
                        "Failed to roll back partial row in {:?}: {}",
                        self.path,
                        rollback
                    );
                }
                Err(LoggerError::Io(e))
            }
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows written (excluding the header)
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

/// In-memory [`LogStorage`] with a byte budget to simulate a full disk
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct MemoryStorage {
    data: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
    /// Bytes that may still be written; `None` is unlimited
    budget: std::sync::Arc<std::sync::Mutex<Option<usize>>>,
}

#[cfg(test)]
impl MemoryStorage {
    /// Allow only `bytes` more bytes before writes fail
    pub(crate) fn limit(&self, bytes: usize) {
        *self.budget.lock().unwrap() = Some(bytes);
    }

    /// Lift the write limit
    pub(crate) fn unlimit(&self) {
        *self.budget.lock().unwrap() = None;
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.data.lock().unwrap().clone()).unwrap()
    }

    /// Data rows currently stored (excluding the header)
    pub(crate) fn row_count(&self) -> usize {
        self.contents().lines().count().saturating_sub(1)
    }
}

#[cfg(test)]
impl Write for MemoryStorage {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut budget = self.budget.lock().unwrap();
        let n = match *budget {
            None => buf.len(),
            Some(0) => return Err(io::Error::new(ErrorKind::Other, "no space left on device")),
            Some(left) => buf.len().min(left),
        };
        if let Some(left) = budget.as_mut() {
            *left -= n;
        }
        self.data.lock().unwrap().extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl LogStorage for MemoryStorage {
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.data.lock().unwrap().truncate(len as usize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_session_base_name() {
        let at = Local
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .single()
            .unwrap();
        assert_eq!(
            session_base_name("Mitutoyo", at),
            "Mitutoyo_Measurements_20240305_140709"
        );
    }

    #[test]
    fn test_candidate_names() {
        assert_eq!(candidate_name("Foo", 1), "Foo.csv");
        assert_eq!(candidate_name("Foo", 2), "Foo_2.csv");
        assert_eq!(candidate_name("Foo", 17), "Foo_17.csv");
    }

    #[test]
    fn test_header_is_written_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::create_unique(dir.path(), "Foo").unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(content, "timestamp,value_mm\n");
        assert_eq!(sink.rows_written(), 0);
    }

    #[test]
    fn test_append_writes_rows_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = LogSink::create_unique(dir.path(), "Foo").unwrap();

        let wall = Local
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .single()
            .unwrap();
        sink.append(&Reading::new(10.01, wall, Duration::ZERO))
            .unwrap();

        // Read back while the sink is still open
        let content = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            content,
            "timestamp,value_mm\n2024-03-05 14:07:09.000000,10.01\n"
        );
        assert_eq!(sink.rows_written(), 1);
    }

    #[test]
    fn test_failed_append_leaves_no_trace() {
        let storage = MemoryStorage::default();
        let mut sink =
            LogSink::from_storage(PathBuf::from("mem.csv"), Box::new(storage.clone())).unwrap();
        let wall = Local
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .single()
            .unwrap();

        // Room for part of the row only
        storage.limit(5);
        let err = sink
            .append(&Reading::new(1.11, wall, Duration::ZERO))
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(storage.contents(), "timestamp,value_mm\n");
        assert_eq!(sink.rows_written(), 0);

        storage.unlimit();
        sink.append(&Reading::new(2.22, wall, Duration::from_secs(1)))
            .unwrap();

        assert_eq!(
            storage.contents(),
            "timestamp,value_mm\n2024-03-05 14:07:09.000000,2.22\n"
        );
        assert_eq!(sink.rows_written(), 1);
        assert_eq!(storage.row_count() as u64, sink.rows_written());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let sink = LogSink::create_unique(&nested, "Foo").unwrap();
        assert!(nested.is_dir());
        assert_eq!(sink.path(), nested.join("Foo.csv"));
    }

    #[test]
    fn test_directory_that_is_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        assert!(LogSink::create_unique(&blocker, "Foo").is_err());
    }
}
