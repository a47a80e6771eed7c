//! Per-stream record types and the curated output row.
//!
//! Each stream gets one tagged record type, deserialized exactly once at the
//! ingestion boundary. Upstream records are immutable once stored. Absent
//! measurements are `None` — distinct from out-of-range values, which the
//! validator rejects.

use chrono::{DateTime, Utc};
use pb_common::{NodeId, SampleIdentity};
use serde::{Deserialize, Serialize};

/// Anything carrying its own event timestamp. This is the seam the windowed
/// reader sorts on and the join sweep advances over.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// One hardware telemetry reading from a growth node (primary stream).
///
/// Every curated output row corresponds to exactly one accepted sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub node_id: NodeId,

    /// Stable physical-sensor identity, independent of logical node
    /// numbering. Optional upstream; never null after curation.
    #[serde(default)]
    pub sample_identity: Option<SampleIdentity>,

    #[serde(default)]
    pub temp_c: Option<f64>,
    #[serde(default)]
    pub humidity_pct: Option<f64>,
    #[serde(default)]
    pub par_umol: Option<f64>,
    #[serde(default)]
    pub battery_mv: Option<i64>,
    #[serde(default)]
    pub rssi: Option<i64>,
}

impl Timestamped for TelemetrySample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One meteorological station reading. Joined by nearest timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetSample {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub net_radiation: Option<f64>,
    #[serde(default)]
    pub spectral_blue: Option<f64>,
    #[serde(default)]
    pub spectral_red: Option<f64>,
    #[serde(default)]
    pub air_temp_c: Option<f64>,
    #[serde(default)]
    pub relative_humidity_pct: Option<f64>,
    #[serde(default)]
    pub co2_ppm: Option<f64>,
}

impl Timestamped for MetSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One lighting-schedule change. Joined backward: the most recent entry
/// at-or-before a sample is the setting in effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedScheduleEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub blue_ratio: Option<f64>,
    #[serde(default)]
    pub red_ratio: Option<f64>,
    #[serde(default)]
    pub intensity_pct: Option<f64>,
    #[serde(default)]
    pub sector_id: Option<String>,
}

impl Timestamped for LedScheduleEntry {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One operator- or assistant-logged research event. Joined backward:
/// the most recently logged context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the event was entered through the LLM assistant.
    #[serde(default)]
    pub via_llm: bool,
}

impl Timestamped for ResearchEvent {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One harvest record. Read each cycle but not joined into the curated
/// output; reserved for separate reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub row_index: Option<i64>,
    #[serde(default)]
    pub weight_grams: Option<f64>,
    #[serde(default)]
    pub brix_value: Option<f64>,
    #[serde(default)]
    pub plant_id: Option<String>,
}

impl Timestamped for YieldRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One row of the curated dataset: an accepted telemetry sample enriched
/// with its best-matching secondary readings.
///
/// Recomputed from scratch every cycle and discarded once snapshotted; has
/// no identity or mutation path of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedRecord {
    pub timestamp: DateTime<Utc>,
    pub node_id: NodeId,
    /// Never null: the upstream identity, or the node id when absent.
    pub sample_identity: SampleIdentity,

    pub temp_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub par_umol: Option<f64>,
    pub battery_mv: Option<i64>,
    pub rssi: Option<i64>,

    /// Closest ambient reading within tolerance, either direction.
    pub met: Option<MetSample>,
    /// Lighting setting in effect at the sample time, within tolerance.
    pub led: Option<LedScheduleEntry>,
    /// Most recently logged event context, within tolerance.
    pub event: Option<ResearchEvent>,
}

impl CuratedRecord {
    /// Assemble one curated row from an accepted sample and its matches.
    pub fn assemble(
        sample: &TelemetrySample,
        met: Option<MetSample>,
        led: Option<LedScheduleEntry>,
        event: Option<ResearchEvent>,
    ) -> Self {
        CuratedRecord {
            timestamp: sample.timestamp,
            node_id: sample.node_id.clone(),
            sample_identity: SampleIdentity::resolve(
                sample.sample_identity.as_ref(),
                &sample.node_id,
            ),
            temp_c: sample.temp_c,
            humidity_pct: sample.humidity_pct,
            par_umol: sample.par_umol,
            battery_mv: sample.battery_mv,
            rssi: sample.rssi,
            met,
            led,
            event,
        }
    }
}
