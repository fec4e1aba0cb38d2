//! JSON Lines Cursor Implementation

use audit_engine::{EventRecord, IntervalRecord, MemorySource, RecordSource, SourceError};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Buffered cursor over a JSON Lines record file.
///
/// The whole file is parsed up front; a malformed line is a setup failure
/// for the run, not a data-quality finding.
pub struct JsonlSource<R> {
    inner: MemorySource<R>,
}

/// Event-mode JSON Lines cursor
pub type JsonlEventSource = JsonlSource<EventRecord>;

/// Interval-mode JSON Lines cursor
pub type JsonlIntervalSource = JsonlSource<IntervalRecord>;

impl<R: DeserializeOwned> JsonlSource<R> {
    /// Open and fully parse a JSON Lines file. Blank lines are ignored.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);

        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record = serde_json::from_str(trimmed).map_err(|err| SourceError::Parse {
                line: index + 1,
                message: err.to_string(),
            })?;
            records.push(record);
        }

        info!("loaded {} records from {}", records.len(), path.display());
        Ok(Self {
            inner: MemorySource::new(records),
        })
    }

    /// Number of records in the file
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<R: Clone> RecordSource for JsonlSource<R> {
    type Record = R;

    fn next_record(&mut self) -> Result<Option<R>, SourceError> {
        self.inner.next_record()
    }

    fn fetch(&mut self, position: usize) -> Result<R, SourceError> {
        self.inner.fetch(position)
    }
}
