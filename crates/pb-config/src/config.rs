//! Curation configuration types.
//!
//! One immutable `CurationConfig` is built at process start and passed into
//! the curator; nothing in the pipeline reads ambient global state. Every
//! field has a default matching the reference deployment, so a config file
//! only needs to name what it overrides.

use chrono::Duration;
use pb_common::StreamName;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

/// Complete curation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Directory holding the per-stream spool files.
    pub data_dir: PathBuf,

    /// Path of the curated snapshot artifact.
    pub snapshot_path: PathBuf,

    /// Curation cycle period in seconds.
    pub interval_secs: u64,

    /// Per-stream lookback windows.
    pub windows: StreamWindows,

    /// Per-join tolerance windows.
    pub tolerances: JoinTolerances,

    /// Telemetry validation ranges.
    pub bounds: ValidationBounds,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            snapshot_path: PathBuf::from("data/curated_research_dataset.csv"),
            interval_secs: 300,
            windows: StreamWindows::default(),
            tolerances: JoinTolerances::default(),
            bounds: ValidationBounds::default(),
        }
    }
}

impl CurationConfig {
    /// Load a config file (JSON, partial over defaults).
    pub fn from_file(path: impl AsRef<Path>) -> pb_common::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            pb_common::Error::Config(format!(
                "cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> pb_common::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| pb_common::Error::Config(format!("malformed config: {}", e)))
    }

    /// Cycle period as a std duration (for the scheduler's sleep).
    pub fn interval(&self) -> StdDuration {
        StdDuration::from_secs(self.interval_secs)
    }
}

/// Lookback window per stream, in seconds.
///
/// Streams have different natural recency relevance: sensor and ambient
/// streams are only useful fresh, events stay relevant for days, and yield
/// records for a month.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamWindows {
    pub telemetry_secs: u64,
    pub meteorological_secs: u64,
    pub led_schedule_secs: u64,
    pub research_events_secs: u64,
    pub yield_logs_secs: u64,
}

impl Default for StreamWindows {
    fn default() -> Self {
        Self {
            telemetry_secs: 24 * 3600,
            meteorological_secs: 24 * 3600,
            led_schedule_secs: 24 * 3600,
            research_events_secs: 7 * 24 * 3600,
            yield_logs_secs: 30 * 24 * 3600,
        }
    }
}

impl StreamWindows {
    /// Lookback duration for one stream.
    pub fn window_for(&self, stream: StreamName) -> Duration {
        let secs = match stream {
            StreamName::Telemetry => self.telemetry_secs,
            StreamName::Meteorological => self.meteorological_secs,
            StreamName::LedSchedule => self.led_schedule_secs,
            StreamName::ResearchEvents => self.research_events_secs,
            StreamName::YieldLogs => self.yield_logs_secs,
        };
        Duration::seconds(secs as i64)
    }
}

/// Maximum allowed time distance per asof join, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinTolerances {
    /// Nearest-join tolerance for the meteorological stream.
    pub meteorological_secs: u64,
    /// Backward-join tolerance for the LED schedule stream.
    pub led_schedule_secs: u64,
    /// Backward-join tolerance for the research-events stream.
    pub research_events_secs: u64,
}

impl Default for JoinTolerances {
    fn default() -> Self {
        Self {
            meteorological_secs: 10 * 60,
            led_schedule_secs: 3600,
            research_events_secs: 24 * 3600,
        }
    }
}

impl JoinTolerances {
    pub fn meteorological(&self) -> Duration {
        Duration::seconds(self.meteorological_secs as i64)
    }

    pub fn led_schedule(&self) -> Duration {
        Duration::seconds(self.led_schedule_secs as i64)
    }

    pub fn research_events(&self) -> Duration {
        Duration::seconds(self.research_events_secs as i64)
    }
}

/// Valid ranges for telemetry fields. Bounds are inclusive; absent fields
/// are never checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationBounds {
    pub temp_c_min: f64,
    pub temp_c_max: f64,
    pub humidity_pct_min: f64,
    pub humidity_pct_max: f64,
    pub par_umol_min: f64,
    pub par_umol_max: f64,
}

impl Default for ValidationBounds {
    fn default() -> Self {
        Self {
            temp_c_min: -10.0,
            temp_c_max: 60.0,
            humidity_pct_min: 0.0,
            humidity_pct_max: 100.0,
            par_umol_min: 0.0,
            par_umol_max: 3000.0,
        }
    }
}
