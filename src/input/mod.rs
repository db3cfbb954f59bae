pub mod csv;
pub mod memory;
pub mod sbet;

pub use self::csv::load_csv;
pub use memory::RecordBuffer;
pub use sbet::SbetFile;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::{NavigationRecord, TimeSpan};

/// Errors raised by a record source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: no complete navigation record ({len} bytes)", path.display())]
    Empty { path: PathBuf, len: u64 },

    #[error("failed to read record {index}: {source}")]
    Read {
        index: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for record source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// A recorded navigation trajectory that can be read in order or by index
///
/// Indexes are zero-based record positions. `read_at` also moves the
/// sequential position, so a following `read_next` returns `index + 1`.
pub trait RecordSource: Send {
    /// Name of the underlying file or buffer
    fn name(&self) -> &str;

    /// Number of complete records
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamp of the first record (GPS-epoch seconds)
    fn start_timestamp(&self) -> f64;

    /// Timestamp of the last record (GPS-epoch seconds)
    fn end_timestamp(&self) -> f64;

    fn time_span(&self) -> TimeSpan {
        TimeSpan::new(self.start_timestamp(), self.end_timestamp())
    }

    /// Read the next unread record, `None` at end of stream
    fn read_next(&mut self) -> SourceResult<Option<NavigationRecord>>;

    /// Read the record at `index`, `None` past the end of stream
    fn read_at(&mut self, index: u64) -> SourceResult<Option<NavigationRecord>>;
}

/// Trajectory file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    /// Flat binary SBET/POS records
    Sbet,
    /// Text export with a header row
    Csv,
}

/// Pick a format from the file name, falling back to sniffing the header
pub fn detect_format(path: &Path, head: &[u8]) -> InputFormat {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" => InputFormat::Csv,
        "out" | "sbet" | "pos" => InputFormat::Sbet,
        _ if is_csv(head) => InputFormat::Csv,
        _ => InputFormat::Sbet,
    }
}

fn is_csv(data: &[u8]) -> bool {
    if data.len() < 10 {
        return false;
    }

    // Binary records are almost never valid UTF-8 over a few hundred bytes
    match std::str::from_utf8(&data[..data.len().min(500)]) {
        Ok(text) => text
            .lines()
            .take(5)
            .any(|line| line.chars().filter(|&c| c == ',').count() >= 2),
        Err(_) => false,
    }
}

/// Open a trajectory file, auto-detecting its format
///
/// `gps_week` anchors SBET seconds-of-week timestamps to the GPS epoch.
pub fn open_source(path: &Path, gps_week: u32) -> Result<Box<dyn RecordSource>> {
    let mut head = Vec::with_capacity(512);
    std::fs::File::open(path)
        .and_then(|f| f.take(512).read_to_end(&mut head))
        .map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let format = detect_format(path, &head);
    debug!("Detected {:?} input for {}", format, path.display());

    match format {
        InputFormat::Sbet => Ok(Box::new(SbetFile::open(path, gps_week)?)),
        InputFormat::Csv => Ok(Box::new(
            load_csv(path).with_context(|| format!("{}: invalid trajectory text", path.display()))?,
        )),
    }
}
