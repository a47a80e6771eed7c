//! JSONL spool store.
//!
//! The production store is a directory of append-only spool files, one per
//! stream, written by the upstream producers (sensor bridge, met station
//! poller, operator facade). One JSON object per line, each carrying an
//! RFC 3339 `timestamp` field. The backbone only ever reads.

use super::{StoreError, StreamStore};
use chrono::{DateTime, Utc};
use pb_common::StreamName;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::debug;

/// Read-only view over a spool directory.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    data_dir: PathBuf,
}

impl JsonlStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Spool file path for one stream.
    pub fn spool_path(&self, stream: StreamName) -> PathBuf {
        self.data_dir.join(stream.file_name())
    }
}

impl StreamStore for JsonlStore {
    fn read_window(
        &self,
        stream: StreamName,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<serde_json::Value>, StoreError> {
        let path = self.spool_path(stream);

        // A stream that has never produced is empty, not broken.
        if !path.exists() {
            debug!(stream = %stream, path = %path.display(), "no spool file, reading as empty");
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut rows = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let value: serde_json::Value =
                serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
                    stream,
                    line: index + 1,
                    message: e.to_string(),
                })?;

            let ts = row_timestamp(&value).ok_or_else(|| StoreError::Corrupt {
                stream,
                line: index + 1,
                message: "missing or unparseable 'timestamp' field".to_string(),
            })?;

            if ts > from && ts <= to {
                rows.push(value);
            }
        }

        debug!(stream = %stream, rows = rows.len(), "spool window read");
        Ok(rows)
    }
}

fn row_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let raw = value.get("timestamp")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
