//! Snapshot serialization and atomic replace.
//!
//! The curated dataset is published as a single CSV file at a fixed path.
//! Each successful cycle replaces it wholesale: serialize to a sibling
//! `.tmp` file, flush, then rename into place, so a concurrent reader of
//! the artifact never observes a partially written file. The curator never
//! calls `write` with an empty record set (the no-op rule), and the writer
//! refuses one anyway to keep the invariant explicit.

use crate::model::CuratedRecord;
use chrono::SecondsFormat;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Header of the curated CSV: telemetry columns, prefixed secondary
/// columns, and the identity column last.
pub const SNAPSHOT_COLUMNS: &[&str] = &[
    "timestamp",
    "node_id",
    "temp_c",
    "humidity_pct",
    "par_umol",
    "battery_mv",
    "rssi",
    "met_timestamp",
    "met_net_radiation",
    "met_spectral_blue",
    "met_spectral_red",
    "met_air_temp_c",
    "met_relative_humidity_pct",
    "met_co2_ppm",
    "led_timestamp",
    "led_blue_ratio",
    "led_red_ratio",
    "led_intensity_pct",
    "led_sector_id",
    "event_timestamp",
    "event_type",
    "event_severity",
    "event_description",
    "event_via_llm",
    "sample_identity",
];

/// Errors from snapshot serialization or publication.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("refusing to write an empty snapshot")]
    EmptyRecordSet,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What one successful write produced.
#[derive(Debug, Clone)]
pub struct SnapshotReceipt {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: usize,
    /// SHA-256 of the serialized artifact; identical store state yields an
    /// identical digest, which is how operators confirm cycle idempotence.
    pub digest: String,
}

/// Publishes curated snapshots to a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and atomically publish one cycle's records.
    pub fn write(&self, records: &[CuratedRecord]) -> Result<SnapshotReceipt, SnapshotError> {
        if records.is_empty() {
            return Err(SnapshotError::EmptyRecordSet);
        }

        let csv = encode_csv(records);
        let bytes = csv.as_bytes();
        let digest = hex::encode(Sha256::digest(bytes));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write atomically
        let tmp_path = self.tmp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(bytes)?;
            file.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), rows = records.len(), "snapshot published");
        Ok(SnapshotReceipt {
            path: self.path.clone(),
            rows: records.len(),
            bytes: bytes.len(),
            digest,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Serialize curated records as CSV with the fixed header.
pub fn encode_csv(records: &[CuratedRecord]) -> String {
    let mut out = String::new();
    out.push_str(&SNAPSHOT_COLUMNS.join(","));
    out.push('\n');

    for record in records {
        let mut row: Vec<String> = Vec::with_capacity(SNAPSHOT_COLUMNS.len());

        row.push(timestamp_field(record.timestamp));
        row.push(csv_field(&record.node_id.0));
        row.push(opt_display(record.temp_c));
        row.push(opt_display(record.humidity_pct));
        row.push(opt_display(record.par_umol));
        row.push(opt_display(record.battery_mv));
        row.push(opt_display(record.rssi));

        match &record.met {
            Some(met) => {
                row.push(timestamp_field(met.timestamp));
                row.push(opt_display(met.net_radiation));
                row.push(opt_display(met.spectral_blue));
                row.push(opt_display(met.spectral_red));
                row.push(opt_display(met.air_temp_c));
                row.push(opt_display(met.relative_humidity_pct));
                row.push(opt_display(met.co2_ppm));
            }
            None => row.extend(std::iter::repeat(String::new()).take(7)),
        }

        match &record.led {
            Some(led) => {
                row.push(timestamp_field(led.timestamp));
                row.push(opt_display(led.blue_ratio));
                row.push(opt_display(led.red_ratio));
                row.push(opt_display(led.intensity_pct));
                row.push(opt_str(led.sector_id.as_deref()));
            }
            None => row.extend(std::iter::repeat(String::new()).take(5)),
        }

        match &record.event {
            Some(event) => {
                row.push(timestamp_field(event.timestamp));
                row.push(opt_str(event.event_type.as_deref()));
                row.push(opt_str(event.severity.as_deref()));
                row.push(opt_str(event.description.as_deref()));
                row.push(event.via_llm.to_string());
            }
            None => row.extend(std::iter::repeat(String::new()).take(5)),
        }

        row.push(csv_field(&record.sample_identity.0));

        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

fn timestamp_field(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn opt_display<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => {
            let mut s = String::new();
            let _ = write!(s, "{v}");
            s
        }
        None => String::new(),
    }
}

fn opt_str(value: Option<&str>) -> String {
    value.map(csv_field).unwrap_or_default()
}

/// Quote a field when it contains the delimiter, a quote, or a line break;
/// embedded quotes are doubled.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') || raw.contains('\r') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LedScheduleEntry, MetSample, ResearchEvent, TelemetrySample};
    use chrono::{TimeZone, Utc};
    use pb_common::NodeId;

    fn make_record(node: &str, identity: Option<&str>) -> CuratedRecord {
        let sample = TelemetrySample {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            node_id: NodeId::from(node),
            sample_identity: identity.map(Into::into),
            temp_c: Some(22.5),
            humidity_pct: Some(61.0),
            par_umol: Some(840.0),
            battery_mv: Some(2950),
            rssi: Some(-58),
        };
        CuratedRecord::assemble(&sample, None, None, None)
    }

    fn make_full_record() -> CuratedRecord {
        let mut record = make_record("node-01", Some("basil-A1"));
        record.met = Some(MetSample {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 11, 55, 0).unwrap(),
            net_radiation: Some(410.2),
            spectral_blue: Some(12.1),
            spectral_red: Some(30.4),
            air_temp_c: Some(21.8),
            relative_humidity_pct: Some(59.0),
            co2_ppm: Some(820.0),
        });
        record.led = Some(LedScheduleEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 11, 30, 0).unwrap(),
            blue_ratio: Some(0.3),
            red_ratio: Some(0.7),
            intensity_pct: Some(80.0),
            sector_id: Some("sector-2".into()),
        });
        record.event = Some(ResearchEvent {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            event_type: Some("irrigation".into()),
            severity: Some("info".into()),
            description: Some("flushed line 2, then resumed".into()),
            via_llm: true,
        });
        record
    }

    // ── Encoding ────────────────────────────────────────────────────────

    #[test]
    fn header_matches_column_list() {
        let csv = encode_csv(&[make_record("node-01", None)]);
        let header = csv.lines().next().unwrap();
        assert_eq!(header.split(',').count(), SNAPSHOT_COLUMNS.len());
        assert!(header.starts_with("timestamp,node_id,"));
        assert!(header.ends_with(",sample_identity"));
    }

    #[test]
    fn every_row_has_every_column() {
        let csv = encode_csv(&[make_full_record(), make_record("node-02", None)]);
        for line in csv.lines().skip(1) {
            assert_eq!(line.split(',').count(), SNAPSHOT_COLUMNS.len());
        }
    }

    #[test]
    fn absent_matches_serialize_as_empty_fields() {
        let csv = encode_csv(&[make_record("node-01", Some("basil-A1"))]);
        let row = csv.lines().nth(1).unwrap();
        // met_timestamp through event_via_llm are all empty.
        assert!(row.contains(",,,,,,,"));
        assert!(row.ends_with(",basil-A1"));
    }

    #[test]
    fn full_record_round_trips_values() {
        let csv = encode_csv(&[make_full_record()]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("2026-03-01T12:00:00Z"));
        assert!(row.contains("410.2"));
        assert!(row.contains("sector-2"));
        assert!(row.contains("irrigation"));
        assert!(row.contains("true"));
    }

    #[test]
    fn identity_fallback_lands_in_the_last_column() {
        let csv = encode_csv(&[make_record("node-09", None)]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(",node-09"));
    }

    #[test]
    fn embedded_delimiters_are_quoted() {
        let mut record = make_full_record();
        record.event.as_mut().unwrap().description =
            Some("pH drift, acid dosed; operator said \"recheck\"".into());
        let csv = encode_csv(&[record]);
        assert!(csv.contains("\"pH drift, acid dosed; operator said \"\"recheck\"\"\""));
    }

    #[test]
    fn embedded_newline_is_quoted() {
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    // ── Publication ─────────────────────────────────────────────────────

    #[test]
    fn write_publishes_and_leaves_no_tmp_residue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("curated.csv");
        let writer = SnapshotWriter::new(&path);

        let receipt = writer.write(&[make_full_record()]).unwrap();
        assert_eq!(receipt.rows, 1);
        assert!(path.exists());
        assert!(!path.with_file_name("curated.csv.tmp").exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.len(), receipt.bytes);
    }

    #[test]
    fn write_replaces_the_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curated.csv");
        let writer = SnapshotWriter::new(&path);

        writer
            .write(&[make_record("node-01", None), make_record("node-02", None)])
            .unwrap();
        writer.write(&[make_record("node-03", None)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2); // header + one row
        assert!(content.contains("node-03"));
        assert!(!content.contains("node-01"));
    }

    #[test]
    fn write_refuses_an_empty_record_set() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("curated.csv"));
        assert!(matches!(
            writer.write(&[]),
            Err(SnapshotError::EmptyRecordSet)
        ));
        assert!(!dir.path().join("curated.csv").exists());
    }

    #[test]
    fn digest_is_stable_for_identical_input() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("curated.csv"));

        let records = vec![make_full_record()];
        let first = writer.write(&records).unwrap();
        let second = writer.write(&records).unwrap();
        assert_eq!(first.digest, second.digest);
        assert_eq!(first.digest.len(), 64);
    }

    #[test]
    fn digest_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("curated.csv"));

        let first = writer.write(&[make_record("node-01", None)]).unwrap();
        let second = writer.write(&[make_record("node-02", None)]).unwrap();
        assert_ne!(first.digest, second.digest);
    }
}
