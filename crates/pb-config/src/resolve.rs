//! Config file resolution.
//!
//! Resolution order: explicit path (CLI) → `PB_CONFIG` env var → XDG config
//! dir → built-in defaults. An explicitly named file that does not exist is
//! an error; the XDG location is optional and silently skipped when absent.

use crate::config::CurationConfig;
use pb_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Where the effective config came from (for startup logging).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from a file on disk.
    File(PathBuf),
    /// Built-in defaults; no file was found.
    Defaults,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::File(path) => path.display().to_string(),
            ConfigSource::Defaults => "built-in defaults".to_string(),
        }
    }
}

/// Default XDG-style config location.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("phytotron-backbone").join("config.json"))
}

/// Resolve the effective configuration.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(CurationConfig, ConfigSource)> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config = CurationConfig::from_file(path)?;
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }

    if let Ok(env_path) = std::env::var("PB_CONFIG") {
        let path = PathBuf::from(env_path);
        if !path.exists() {
            return Err(Error::Config(format!(
                "PB_CONFIG points at a missing file: {}",
                path.display()
            )));
        }
        let config = CurationConfig::from_file(&path)?;
        return Ok((config, ConfigSource::File(path)));
    }

    if let Some(path) = xdg_config_path() {
        if path.exists() {
            let config = CurationConfig::from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }
    }

    Ok((CurationConfig::default(), ConfigSource::Defaults))
}
