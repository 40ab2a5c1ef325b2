// crates/dualscope-ui/src/helpers/log.rs
//
// Logging setup for the binary.
//
// In release builds with `windows_subsystem = "windows"` (double-click launch)
// there is no console attached, so stderr output is silently discarded.
// Every event is also appended to a file in the OS temp directory so it is
// visible regardless of launch mode.
//
// File: %TEMP%/dualscope.log, append-only.
//
// Filter comes from RUST_LOG; default is `info`. Media threads log through
// the same subscriber via the `tracing` macros.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "dualscope.log";

pub fn log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE)
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops. Falls back to stderr only if the log file can't be opened.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path())
        .ok()
        .map(Arc::new);

    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::io::stderr.and(file))
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}
