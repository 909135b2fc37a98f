//! Tracing setup.
//!
//! A TUI owns the terminal, so log output goes to the configured file
//! instead of stderr. `QUAD_LOG` controls the filter (default `info`).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub fn init(error_log_path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = error_log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(error_log_path)?;

    let filter = EnvFilter::try_from_env("QUAD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
