//! Logical stream names and spool file layout.
//!
//! The backbone reads five independently-produced streams. Each stream is
//! persisted by its upstream producer as an append-only JSONL spool file
//! under the configured data directory; the file names match the producers'
//! table names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five logical streams consumed by the curation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamName {
    /// Hardware sensor telemetry from the growth nodes (primary stream).
    Telemetry,
    /// Meteorological station readings (net radiation, spectral irradiance).
    Meteorological,
    /// Lighting schedule change history.
    LedSchedule,
    /// Operator- and assistant-logged research events.
    ResearchEvents,
    /// Harvest / yield records.
    YieldLogs,
}

impl StreamName {
    /// All streams in the order the curator reads them.
    pub const ALL: [StreamName; 5] = [
        StreamName::Telemetry,
        StreamName::Meteorological,
        StreamName::LedSchedule,
        StreamName::ResearchEvents,
        StreamName::YieldLogs,
    ];

    /// Stable lowercase name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            StreamName::Telemetry => "telemetry",
            StreamName::Meteorological => "meteorological",
            StreamName::LedSchedule => "led_schedule",
            StreamName::ResearchEvents => "research_events",
            StreamName::YieldLogs => "yield_logs",
        }
    }

    /// Spool file name for this stream under the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            StreamName::Telemetry => "raw_telemetry.jsonl",
            StreamName::Meteorological => "met_station_data.jsonl",
            StreamName::LedSchedule => "led_schedule_history.jsonl",
            StreamName::ResearchEvents => "research_events.jsonl",
            StreamName::YieldLogs => "yield_logs.jsonl",
        }
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
