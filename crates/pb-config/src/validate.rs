//! Semantic config validation.
//!
//! Structural problems (bad JSON, wrong types) are caught by serde at load
//! time; this pass checks the values make sense together. All problems are
//! reported at once rather than failing on the first.

use crate::config::CurationConfig;
use std::fmt;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a resolved config. Empty vec means valid.
pub fn validate(config: &CurationConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut err = |field: &str, message: String| {
        errors.push(ValidationError {
            field: field.to_string(),
            message,
        });
    };

    if config.interval_secs == 0 {
        err("interval_secs", "cycle interval must be positive".into());
    }

    let windows = [
        ("windows.telemetry_secs", config.windows.telemetry_secs),
        (
            "windows.meteorological_secs",
            config.windows.meteorological_secs,
        ),
        ("windows.led_schedule_secs", config.windows.led_schedule_secs),
        (
            "windows.research_events_secs",
            config.windows.research_events_secs,
        ),
        ("windows.yield_logs_secs", config.windows.yield_logs_secs),
    ];
    for (field, secs) in windows {
        if secs == 0 {
            err(field, "lookback window must be positive".into());
        }
    }

    let bounds = [
        (
            "bounds.temp_c",
            config.bounds.temp_c_min,
            config.bounds.temp_c_max,
        ),
        (
            "bounds.humidity_pct",
            config.bounds.humidity_pct_min,
            config.bounds.humidity_pct_max,
        ),
        (
            "bounds.par_umol",
            config.bounds.par_umol_min,
            config.bounds.par_umol_max,
        ),
    ];
    for (field, min, max) in bounds {
        if !min.is_finite() || !max.is_finite() {
            err(field, "bounds must be finite".into());
        } else if min >= max {
            err(field, format!("min {} must be below max {}", min, max));
        }
    }

    if config.data_dir.as_os_str().is_empty() {
        err("data_dir", "data directory must not be empty".into());
    }

    if config.snapshot_path.file_name().is_none() {
        err(
            "snapshot_path",
            "snapshot path must name a file".into(),
        );
    }

    errors
}
