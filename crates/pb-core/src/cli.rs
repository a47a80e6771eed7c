//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Phytotron Backbone: curate research-facility measurement streams into
/// one temporally-aligned dataset.
#[derive(Debug, Parser)]
#[command(name = "pb-core", version, about)]
pub struct Cli {
    /// Config file path (JSON). Falls back to $PB_CONFIG, then the XDG
    /// config dir, then built-in defaults.
    #[arg(long, global = true, env = "PB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the curation loop on the configured interval until stopped.
    Run,

    /// Run exactly one curation cycle and exit.
    ///
    /// Exit code 0 when a snapshot was written, 1 when the cycle was idle
    /// (no accepted telemetry), ≥10 on failure.
    Once,

    /// Resolve and validate the configuration, then print the effective
    /// config as JSON.
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_config_path() {
        let cli = Cli::parse_from(["pb-core", "--config", "/etc/pb/config.json", "run"]);
        assert_eq!(cli.config.unwrap(), PathBuf::from("/etc/pb/config.json"));
        assert!(matches!(cli.command, Command::Run));
    }

    #[test]
    fn parses_once_and_check_config() {
        assert!(matches!(
            Cli::parse_from(["pb-core", "once"]).command,
            Command::Once
        ));
        assert!(matches!(
            Cli::parse_from(["pb-core", "check-config"]).command,
            Command::CheckConfig
        ));
    }

    #[test]
    fn log_json_is_global() {
        let cli = Cli::parse_from(["pb-core", "run", "--log-json"]);
        assert!(cli.log_json);
    }
}
