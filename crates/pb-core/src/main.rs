//! pb-core binary: the curation daemon and its one-shot helpers.

use clap::Parser;
use pb_core::cli::{Cli, Command};
use pb_core::collect::JsonlStore;
use pb_core::curate::{Curator, CycleOutcome};
use pb_core::exit_codes::ExitCode;
use pb_core::scheduler::Scheduler;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Set by the signal handler; the scheduler polls it between cycles.
static STOP: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_stop_signal(_signal: libc::c_int) {
    // Only async-signal-safe work here: flip the flag and return.
    STOP.store(true, Ordering::SeqCst);
}

fn install_stop_handlers() {
    let handler = handle_stop_signal as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        libc::signal(libc::SIGTERM, handler as libc::sighandler_t);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("PB_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    std::process::exit(run(cli).as_i32());
}

fn run(cli: Cli) -> ExitCode {
    let (config, source) = match pb_config::resolve_config(cli.config.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            error!(code = e.code(), error = %e, "config resolution failed");
            return ExitCode::from(&e);
        }
    };

    let problems = pb_config::validate(&config);
    if !problems.is_empty() {
        for problem in &problems {
            error!(field = %problem.field, "{}", problem.message);
        }
        return ExitCode::ConfigError;
    }

    info!(source = %source.describe(), "configuration resolved");

    match cli.command {
        Command::CheckConfig => match serde_json::to_string_pretty(&config) {
            Ok(json) => {
                println!("{json}");
                ExitCode::Clean
            }
            Err(e) => {
                error!(error = %e, "cannot render effective config");
                ExitCode::InternalError
            }
        },

        Command::Once => {
            let store = JsonlStore::new(&config.data_dir);
            let curator = Curator::new(config, store);
            match curator.run_cycle(chrono::Utc::now()) {
                Ok(CycleOutcome::Snapshotted { .. }) => ExitCode::Clean,
                Ok(CycleOutcome::Idle) => ExitCode::Idle,
                Err(e) => {
                    error!(code = e.code(), error = %e, "cycle failed");
                    ExitCode::from(&e)
                }
            }
        }

        Command::Run => {
            install_stop_handlers();
            let interval = config.interval();
            let store = JsonlStore::new(&config.data_dir);
            let curator = Curator::new(config, store);
            Scheduler::new(interval).run(&curator, &STOP);
            ExitCode::Clean
        }
    }
}
