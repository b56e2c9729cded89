use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};

/// Send `tracing` output to the log file; the terminal belongs to the UI.
/// `RUST_LOG` overrides the configured filter.
pub fn init(settings: &LogSettings) -> io::Result<PathBuf> {
    let path = settings.file.clone().unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter.as_str()));
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    Ok(path)
}
