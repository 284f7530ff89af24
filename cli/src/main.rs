//! deferral - binary entry point.
//!
//! Runs the callback and sequential consumers against a timer-delayed,
//! unreliable operation on a single-threaded runtime. Stdout carries only the
//! transcript; tracing goes to a log file.

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use deferral::run_demo;
use deferral_config::{DeferralConfig, DemoSettings};
use deferral_core::{Console, StdoutSink, SystemClock};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Without a log file, prefer no logs over interleaving them with the transcript.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Under the home directory first
    if let Some(config_path) = DeferralConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("deferral.log"));
    }

    // Then relative to the working directory
    candidates.push(PathBuf::from(".deferral").join("logs").join("deferral.log"));

    candidates
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let settings = DemoSettings::load();
    tracing::info!(
        delay_ms = settings.delay.as_millis() as u64,
        styles = ?settings.styles,
        "Starting demo"
    );

    let clock = Arc::new(SystemClock);
    let console = Console::new(Arc::new(StdoutSink), clock.clone());
    run_demo(&settings, &console, clock).await
}
