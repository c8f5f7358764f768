use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ForgeConfig;

const LOG_FILE_PREFIX: &str = "forge";

/// The requested level everywhere, debug for the workspace crates.
fn default_filter(level: &str) -> String {
    format!("{level},forge_app=debug,forge_ui=debug,forge_chain=debug,forge_core=debug")
}

/// `RUST_LOG` when set, `fallback` otherwise.
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber: a daily rolling file in `logs_dir`, plus
/// a compact stderr layer when `console` is set.
fn install(logs_dir: &Path, filter: EnvFilter, console: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));
    let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
    let console_layer = console.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

/// File logging under `~/.forge/logs` plus console output at `level`.
/// The returned guard flushes the file writer and must outlive the app.
pub fn init_logging(level: &str) -> Result<WorkerGuard> {
    install(&ForgeConfig::logs_dir()?, env_filter(&default_filter(level)), true)
}

/// File-only logging to `logs_dir` with an explicit filter, for tests and
/// embedders that keep their own console.
pub fn init_logging_to_dir(logs_dir: &Path, filter: &str) -> Result<WorkerGuard> {
    install(logs_dir, env_filter(filter), false)
}
