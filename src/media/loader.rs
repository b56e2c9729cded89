//! Fetch the raw bytes behind a resource locator.
//!
//! `http://` and `https://` locators go through a blocking HTTP client;
//! `file://` locators and plain paths are read from disk.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read resource: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn is_remote(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Map a `file://` locator or plain path to a filesystem path.
pub(crate) fn local_path(url: &str) -> &Path {
    Path::new(url.strip_prefix("file://").unwrap_or(url))
}

/// Read the whole resource at `url` into memory.
pub(crate) fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    if is_remote(url) {
        let response = reqwest::blocking::get(url)?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    } else {
        Ok(std::fs::read(local_path(url))?)
    }
}

/// Read the duration from container metadata. Used when the decoder can't
/// tell the total length up front (e.g. VBR mp3 without a header).
pub(super) fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}
