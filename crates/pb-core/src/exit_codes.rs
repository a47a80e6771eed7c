//! Exit codes for the pb-core CLI.
//!
//! Exit codes communicate cycle outcome without requiring output parsing,
//! so cron wrappers and health checks can branch on them directly.

use pb_common::Error;

/// Exit codes for pb-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Snapshot written (or config check passed).
    Clean = 0,

    /// Cycle ran but had no accepted telemetry; nothing written.
    Idle = 1,

    /// Configuration error
    ConfigError = 10,

    /// Stream read error
    StoreError = 11,

    /// Snapshot write error
    SnapshotError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::Idle)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::ConfigValidation(_) => ExitCode::ConfigError,
            Error::StreamRead { .. } => ExitCode::StoreError,
            Error::Snapshot(_) => ExitCode::SnapshotError,
            Error::Io(_) | Error::Json(_) => ExitCode::InternalError,
        }
    }
}
