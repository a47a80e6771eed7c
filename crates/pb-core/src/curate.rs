//! Cycle orchestration.
//!
//! One `Curator` is built at process start from an immutable config and
//! drives the fixed pipeline: read the five streams with their lookback
//! windows, validate the primary stream, align the secondaries onto it,
//! publish the snapshot. A cycle with no accepted telemetry is a no-op —
//! quiet periods are expected, and the previous artifact must survive them.

use crate::collect::{read_stream, StreamStore};
use crate::join::{match_asof, JoinSpec};
use crate::model::{
    CuratedRecord, LedScheduleEntry, MetSample, ResearchEvent, TelemetrySample, Timestamped,
    YieldRecord,
};
use crate::snapshot::SnapshotWriter;
use crate::validate::validate_telemetry;
use chrono::{DateTime, Utc};
use pb_common::{CycleId, Error, Result, StreamName};
use pb_config::CurationConfig;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use tracing::{info, info_span, warn};

/// What one curation cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// No accepted telemetry in the window; nothing was written and the
    /// previous artifact is untouched.
    Idle,
    /// A snapshot was published.
    Snapshotted {
        rows: usize,
        rejected: usize,
        distinct_identities: usize,
        digest: String,
    },
}

/// Drives one curation cycle end to end.
pub struct Curator<S> {
    config: CurationConfig,
    store: S,
    writer: SnapshotWriter,
}

impl<S: StreamStore> Curator<S> {
    pub fn new(config: CurationConfig, store: S) -> Self {
        let writer = SnapshotWriter::new(&config.snapshot_path);
        Self {
            config,
            store,
            writer,
        }
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    /// Run one full cycle against the store state as of `now`.
    ///
    /// Pure apart from the snapshot write: the same store state and `now`
    /// produce byte-identical output.
    pub fn run_cycle(&self, now: DateTime<Utc>) -> Result<CycleOutcome> {
        let cycle_id = CycleId::new();
        let span = info_span!("cycle", id = %cycle_id);
        let _guard = span.enter();

        let telemetry: Vec<TelemetrySample> = self.read(StreamName::Telemetry, now)?;
        let met: Vec<MetSample> = self.read(StreamName::Meteorological, now)?;
        let led: Vec<LedScheduleEntry> = self.read(StreamName::LedSchedule, now)?;
        let events: Vec<ResearchEvent> = self.read(StreamName::ResearchEvents, now)?;
        // Read for observability; reserved for separate yield reporting and
        // not joined into the curated output.
        let yields: Vec<YieldRecord> = self.read(StreamName::YieldLogs, now)?;

        info!(
            telemetry = telemetry.len(),
            met = met.len(),
            led = led.len(),
            events = events.len(),
            yields = yields.len(),
            "streams loaded"
        );

        let report = validate_telemetry(telemetry, &self.config.bounds);
        if !report.rejected.is_empty() {
            warn!(
                rejected = report.rejected.len(),
                reasons = ?report.summarize(),
                "filtered invalid telemetry rows"
            );
        }

        if report.accepted.is_empty() {
            info!("no accepted telemetry in window, awaiting hardware data");
            return Ok(CycleOutcome::Idle);
        }

        // All three joins key off the primary timestamps, in fixed order:
        // met (nearest) → LED (backward) → events (backward).
        let keys: Vec<DateTime<Utc>> =
            report.accepted.iter().map(|s| s.timestamp()).collect();
        let tolerances = &self.config.tolerances;
        let met_matches = match_asof(&keys, &met, &JoinSpec::nearest(tolerances.meteorological()));
        let led_matches = match_asof(&keys, &led, &JoinSpec::backward(tolerances.led_schedule()));
        let event_matches =
            match_asof(&keys, &events, &JoinSpec::backward(tolerances.research_events()));

        let records: Vec<CuratedRecord> = report
            .accepted
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                CuratedRecord::assemble(
                    sample,
                    met_matches[i].map(|idx| met[idx].clone()),
                    led_matches[i].map(|idx| led[idx].clone()),
                    event_matches[i].map(|idx| events[idx].clone()),
                )
            })
            .collect();

        let distinct_identities = records
            .iter()
            .map(|r| &r.sample_identity)
            .collect::<BTreeSet<_>>()
            .len();

        let receipt = self
            .writer
            .write(&records)
            .map_err(|e| Error::Snapshot(e.to_string()))?;

        info!(
            rows = receipt.rows,
            distinct_identities,
            digest = %receipt.digest,
            path = %receipt.path.display(),
            "dataset curated"
        );

        Ok(CycleOutcome::Snapshotted {
            rows: receipt.rows,
            rejected: report.rejected.len(),
            distinct_identities,
            digest: receipt.digest,
        })
    }

    fn read<T>(&self, stream: StreamName, now: DateTime<Utc>) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Timestamped,
    {
        let window = self.config.windows.window_for(stream);
        read_stream(&self.store, stream, window, now).map_err(|e| Error::StreamRead {
            stream,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::JsonlStore;
    use chrono::TimeZone;
    use std::fs;
    use std::path::Path;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn write_spool(dir: &Path, stream: StreamName, lines: &[String]) {
        fs::write(dir.join(stream.file_name()), lines.join("\n") + "\n").unwrap();
    }

    fn telemetry_line(time: &str, node: &str, temp: f64) -> String {
        format!(
            r#"{{"timestamp": "{time}", "node_id": "{node}", "temp_c": {temp}, "humidity_pct": 60.0, "par_umol": 800.0}}"#
        )
    }

    fn curator_in(dir: &Path) -> Curator<JsonlStore> {
        let mut config = pb_config::CurationConfig::default();
        config.data_dir = dir.to_path_buf();
        config.snapshot_path = dir.join("curated.csv");
        Curator::new(config, JsonlStore::new(dir))
    }

    #[test]
    fn empty_store_is_an_idle_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let curator = curator_in(dir.path());
        assert_eq!(curator.run_cycle(now()).unwrap(), CycleOutcome::Idle);
        assert!(!dir.path().join("curated.csv").exists());
    }

    #[test]
    fn all_rejected_telemetry_is_an_idle_cycle() {
        let dir = tempfile::tempdir().unwrap();
        write_spool(
            dir.path(),
            StreamName::Telemetry,
            &[
                telemetry_line("2026-03-01T11:00:00Z", "n1", 75.0),
                telemetry_line("2026-03-01T11:05:00Z", "n2", -40.0),
            ],
        );
        let curator = curator_in(dir.path());
        assert_eq!(curator.run_cycle(now()).unwrap(), CycleOutcome::Idle);
        assert!(!dir.path().join("curated.csv").exists());
    }

    #[test]
    fn row_count_matches_accepted_telemetry() {
        let dir = tempfile::tempdir().unwrap();
        write_spool(
            dir.path(),
            StreamName::Telemetry,
            &[
                telemetry_line("2026-03-01T10:00:00Z", "n1", 21.0),
                telemetry_line("2026-03-01T10:05:00Z", "n2", 22.0),
                telemetry_line("2026-03-01T10:10:00Z", "n3", 99.0), // rejected
            ],
        );

        let curator = curator_in(dir.path());
        let outcome = curator.run_cycle(now()).unwrap();
        match outcome {
            CycleOutcome::Snapshotted { rows, rejected, .. } => {
                assert_eq!(rows, 2);
                assert_eq!(rejected, 1);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }

        let csv = fs::read_to_string(dir.path().join("curated.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3); // header + 2 accepted rows
        assert!(!csv.contains("n3"));
    }

    #[test]
    fn missing_secondary_streams_degrade_to_nulls() {
        let dir = tempfile::tempdir().unwrap();
        write_spool(
            dir.path(),
            StreamName::Telemetry,
            &[telemetry_line("2026-03-01T10:00:00Z", "n1", 21.0)],
        );

        let curator = curator_in(dir.path());
        let outcome = curator.run_cycle(now()).unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Snapshotted { rows: 1, .. }
        ));
    }

    #[test]
    fn distinct_identities_counts_fallbacks_once() {
        let dir = tempfile::tempdir().unwrap();
        write_spool(
            dir.path(),
            StreamName::Telemetry,
            &[
                telemetry_line("2026-03-01T10:00:00Z", "n1", 21.0),
                telemetry_line("2026-03-01T10:30:00Z", "n1", 21.5),
                telemetry_line("2026-03-01T10:45:00Z", "n2", 22.0),
            ],
        );

        let curator = curator_in(dir.path());
        match curator.run_cycle(now()).unwrap() {
            CycleOutcome::Snapshotted {
                distinct_identities,
                ..
            } => assert_eq!(distinct_identities, 2),
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_secondary_stream_fails_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        write_spool(
            dir.path(),
            StreamName::Telemetry,
            &[telemetry_line("2026-03-01T10:00:00Z", "n1", 21.0)],
        );
        fs::write(
            dir.path().join(StreamName::Meteorological.file_name()),
            "{broken\n",
        )
        .unwrap();

        let curator = curator_in(dir.path());
        let err = curator.run_cycle(now()).unwrap_err();
        assert_eq!(err.stream(), Some(StreamName::Meteorological));
        // Cycle-fatal: nothing was published.
        assert!(!dir.path().join("curated.csv").exists());
    }

    #[test]
    fn yield_stream_is_read_but_never_joined() {
        let dir = tempfile::tempdir().unwrap();
        write_spool(
            dir.path(),
            StreamName::Telemetry,
            &[telemetry_line("2026-03-01T10:00:00Z", "n1", 21.0)],
        );
        write_spool(
            dir.path(),
            StreamName::YieldLogs,
            &[r#"{"timestamp": "2026-02-20T09:00:00Z", "weight_grams": 182.0, "plant_id": "p7"}"#
                .to_string()],
        );

        let curator = curator_in(dir.path());
        curator.run_cycle(now()).unwrap();

        let csv = fs::read_to_string(dir.path().join("curated.csv")).unwrap();
        assert!(!csv.contains("weight_grams"));
        assert!(!csv.contains("p7"));
    }
}
