//! Host download trigger: save the resource behind a URL under a suggested
//! filename. Saving is fire-and-forget; the outcome only reaches the log.

use std::path::{Path, PathBuf};
use std::thread;

use thiserror::Error;
use tracing::{info, warn};

use crate::media::{FetchError, fetch_bytes};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub trait Downloader: Send + Sync {
    fn save(&self, url: &str, filename: &str);
}

/// Saves into a directory on a background thread.
pub struct FsDownloader {
    dir: PathBuf,
}

impl FsDownloader {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl Downloader for FsDownloader {
    fn save(&self, url: &str, filename: &str) {
        let url = url.to_string();
        let dir = self.dir.clone();
        let filename = filename.to_string();
        thread::spawn(move || match save_blocking(&url, &dir, &filename) {
            Ok(path) => info!(url = %url, path = %path.display(), "download saved"),
            Err(e) => warn!(url = %url, "download failed: {e}"),
        });
    }
}

/// Fetch `url` and write it to `dir/filename`, creating `dir` if needed.
pub fn save_blocking(url: &str, dir: &Path, filename: &str) -> Result<PathBuf, DownloadError> {
    let bytes = fetch_bytes(url)?;
    let path = dir.join(sanitize_filename(filename));
    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&path, bytes))
        .map_err(|source| DownloadError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// `"<title>.<ext>"`, the name offered when saving a track.
pub fn suggested_filename(title: &str, extension: &str) -> String {
    let ext = extension.trim().trim_start_matches('.');
    format!("{}.{}", title.trim(), ext)
}

/// Replace path separators and control characters so a title can't escape
/// the download directory.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.');
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn suggested_filename_appends_extension() {
        assert_eq!(suggested_filename("AI Song 1", "mp3"), "AI Song 1.mp3");
        assert_eq!(suggested_filename(" Cyber Dreams ", ".mp3"), "Cyber Dreams.mp3");
    }

    #[test]
    fn sanitize_filename_strips_separators() {
        assert_eq!(sanitize_filename("a/b\\c.mp3"), "a_b_c.mp3");
        assert_eq!(sanitize_filename("../../etc.mp3"), "_.._etc.mp3");
        assert_eq!(sanitize_filename("   "), "download");
    }

    #[test]
    fn save_blocking_copies_local_resource() {
        let src_dir = tempdir().unwrap();
        let src = src_dir.path().join("bell.wav");
        fs::write(&src, b"wave bytes").unwrap();

        let out_dir = tempdir().unwrap();
        let target = out_dir.path().join("nested");
        let path = save_blocking(src.to_str().unwrap(), &target, "Bell/Song.mp3").unwrap();

        assert_eq!(path, target.join("Bell_Song.mp3"));
        assert_eq!(fs::read(&path).unwrap(), b"wave bytes");
    }

    #[test]
    fn save_blocking_reports_missing_source() {
        let out_dir = tempdir().unwrap();
        let err = save_blocking("/definitely/not/here.wav", out_dir.path(), "x.mp3").unwrap_err();
        assert!(matches!(err, DownloadError::Fetch(FetchError::Io(_))));
    }
}
