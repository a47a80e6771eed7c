//! Telemetry range validation.
//!
//! Only the primary stream is validated here; secondary streams have their
//! domain ranges enforced at their point of origin. A row failing any one
//! check is wholly rejected. Rejections are data for the cycle report, not
//! errors — the cycle proceeds with the reduced accepted set.

use crate::model::TelemetrySample;
use chrono::{DateTime, Utc};
use pb_common::NodeId;
use pb_config::ValidationBounds;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Why a telemetry row was rejected. Carries the offending value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "check", content = "value", rename_all = "snake_case")]
pub enum RejectReason {
    TemperatureOutOfRange(f64),
    HumidityOutOfRange(f64),
    ParOutOfRange(f64),
}

impl RejectReason {
    /// Stable short label, used as the aggregation key in cycle logs.
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::TemperatureOutOfRange(_) => "temperature out of range",
            RejectReason::HumidityOutOfRange(_) => "humidity out of range",
            RejectReason::ParOutOfRange(_) => "par out of range",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TemperatureOutOfRange(v) => {
                write!(f, "temperature {v}°C out of range")
            }
            RejectReason::HumidityOutOfRange(v) => write!(f, "humidity {v}% out of range"),
            RejectReason::ParOutOfRange(v) => write!(f, "PAR {v} µmol out of range"),
        }
    }
}

/// One rejected sample, kept for aggregate reporting only.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedSample {
    pub node_id: NodeId,
    pub timestamp: DateTime<Utc>,
    pub reason: RejectReason,
}

/// The accepted/rejected partition of one telemetry window.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub accepted: Vec<TelemetrySample>,
    pub rejected: Vec<RejectedSample>,
}

impl ValidationReport {
    /// Aggregate rejection counts per distinct reason label.
    pub fn summarize(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for rejected in &self.rejected {
            *counts.entry(rejected.reason.label()).or_insert(0) += 1;
        }
        counts
    }
}

/// Check one sample against the bounds. `None` fields are not checked —
/// absence is distinct from an out-of-range value and is allowed. Checks
/// run temp → humidity → PAR; the first failure wins.
pub fn check_sample(sample: &TelemetrySample, bounds: &ValidationBounds) -> Option<RejectReason> {
    if let Some(v) = sample.temp_c {
        if v < bounds.temp_c_min || v > bounds.temp_c_max {
            return Some(RejectReason::TemperatureOutOfRange(v));
        }
    }
    if let Some(v) = sample.humidity_pct {
        if v < bounds.humidity_pct_min || v > bounds.humidity_pct_max {
            return Some(RejectReason::HumidityOutOfRange(v));
        }
    }
    if let Some(v) = sample.par_umol {
        if v < bounds.par_umol_min || v > bounds.par_umol_max {
            return Some(RejectReason::ParOutOfRange(v));
        }
    }
    None
}

/// Partition a telemetry window into accepted and rejected rows.
pub fn validate_telemetry(
    rows: Vec<TelemetrySample>,
    bounds: &ValidationBounds,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    for sample in rows {
        match check_sample(&sample, bounds) {
            None => report.accepted.push(sample),
            Some(reason) => report.rejected.push(RejectedSample {
                node_id: sample.node_id.clone(),
                timestamp: sample.timestamp,
                reason,
            }),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pb_common::SampleIdentity;

    fn make_sample(temp: Option<f64>, humidity: Option<f64>, par: Option<f64>) -> TelemetrySample {
        TelemetrySample {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            node_id: NodeId::from("node-01"),
            sample_identity: Some(SampleIdentity::from("basil-A1")),
            temp_c: temp,
            humidity_pct: humidity,
            par_umol: par,
            battery_mv: Some(2980),
            rssi: Some(-61),
        }
    }

    fn bounds() -> ValidationBounds {
        ValidationBounds::default()
    }

    // ── Acceptance ──────────────────────────────────────────────────────

    #[test]
    fn in_range_sample_is_accepted() {
        let sample = make_sample(Some(25.0), Some(65.0), Some(800.0));
        assert_eq!(check_sample(&sample, &bounds()), None);
    }

    #[test]
    fn boundary_values_are_accepted() {
        for sample in [
            make_sample(Some(-10.0), Some(0.0), Some(0.0)),
            make_sample(Some(60.0), Some(100.0), Some(3000.0)),
        ] {
            assert_eq!(check_sample(&sample, &bounds()), None);
        }
    }

    #[test]
    fn absent_fields_are_not_checked() {
        let sample = make_sample(None, None, None);
        assert_eq!(check_sample(&sample, &bounds()), None);
    }

    // ── Rejection ───────────────────────────────────────────────────────

    #[test]
    fn hot_sample_is_rejected_for_temperature() {
        let sample = make_sample(Some(65.0), Some(50.0), Some(800.0));
        assert_eq!(
            check_sample(&sample, &bounds()),
            Some(RejectReason::TemperatureOutOfRange(65.0))
        );
    }

    #[test]
    fn negative_humidity_is_rejected() {
        let sample = make_sample(Some(25.0), Some(-1.0), None);
        assert_eq!(
            check_sample(&sample, &bounds()),
            Some(RejectReason::HumidityOutOfRange(-1.0))
        );
    }

    #[test]
    fn par_above_ceiling_is_rejected() {
        let sample = make_sample(None, None, Some(3000.5));
        assert_eq!(
            check_sample(&sample, &bounds()),
            Some(RejectReason::ParOutOfRange(3000.5))
        );
    }

    #[test]
    fn first_failing_check_wins() {
        // Both temperature and PAR are bad; temperature is checked first.
        let sample = make_sample(Some(-40.0), None, Some(9999.0));
        assert_eq!(
            check_sample(&sample, &bounds()),
            Some(RejectReason::TemperatureOutOfRange(-40.0))
        );
    }

    // ── Partition & summary ─────────────────────────────────────────────

    #[test]
    fn partition_conserves_rows() {
        let rows = vec![
            make_sample(Some(25.0), Some(65.0), Some(800.0)),
            make_sample(Some(65.0), Some(50.0), Some(800.0)),
            make_sample(None, Some(120.0), None),
            make_sample(Some(22.0), None, None),
        ];
        let report = validate_telemetry(rows, &bounds());
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 2);
    }

    #[test]
    fn summary_counts_distinct_reasons() {
        let rows = vec![
            make_sample(Some(75.0), None, None),
            make_sample(Some(-20.0), None, None),
            make_sample(None, Some(101.0), None),
        ];
        let report = validate_telemetry(rows, &bounds());
        let summary = report.summarize();
        assert_eq!(summary["temperature out of range"], 2);
        assert_eq!(summary["humidity out of range"], 1);
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn custom_bounds_are_honored() {
        let bounds = ValidationBounds {
            temp_c_min: 0.0,
            temp_c_max: 30.0,
            ..ValidationBounds::default()
        };
        let sample = make_sample(Some(35.0), None, None);
        assert_eq!(
            check_sample(&sample, &bounds),
            Some(RejectReason::TemperatureOutOfRange(35.0))
        );
    }
}
