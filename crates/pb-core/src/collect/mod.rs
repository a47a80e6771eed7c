//! Stream reading: the store seam and the typed windowed reader.
//!
//! A stream read either succeeds for the whole window or fails for the whole
//! stream — there is no partial result. An empty result is valid (absence of
//! recent data, not a malfunction).

pub mod jsonl;

pub use jsonl::JsonlStore;

use crate::model::Timestamped;
use chrono::{DateTime, Duration, Utc};
use pb_common::StreamName;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from reading a stream. Always stream-fatal, never row-level.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt row in '{stream}' spool at line {line}: {message}")]
    Corrupt {
        stream: StreamName,
        line: usize,
        message: String,
    },

    #[error("row in '{stream}' does not match the stream schema: {message}")]
    Decode { stream: StreamName, message: String },
}

/// A queryable, time-ordered store of raw stream rows.
///
/// `read_window` returns every row with `from < timestamp <= to`, in spool
/// order. Implementations surface connectivity and parse problems as a
/// single `StoreError`; they never drop individual rows.
pub trait StreamStore {
    fn read_window(
        &self,
        stream: StreamName,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<serde_json::Value>, StoreError>;
}

/// Read one stream's lookback window as typed records, sorted ascending by
/// timestamp.
///
/// The sort is stable, so rows sharing a timestamp keep their spool order —
/// the ordering the backward join's tie rule is defined against.
pub fn read_stream<T, S>(
    store: &S,
    stream: StreamName,
    window: Duration,
    now: DateTime<Utc>,
) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned + Timestamped,
    S: StreamStore + ?Sized,
{
    let raw = store.read_window(stream, now - window, now)?;
    let mut rows = raw
        .into_iter()
        .map(|value| {
            serde_json::from_value::<T>(value).map_err(|e| StoreError::Decode {
                stream,
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<T>, StoreError>>()?;
    rows.sort_by_key(|row| row.timestamp());
    Ok(rows)
}
