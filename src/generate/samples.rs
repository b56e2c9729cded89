use std::path::Path;

use walkdir::WalkDir;

fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    let exts: Vec<String> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Collect `file://` locators for the audio files under `dir`, sorted by path.
/// Hidden files and directories are skipped.
pub fn scan_samples(dir: &Path, extensions: &[String]) -> Vec<String> {
    let mut paths: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path(), extensions))
        .map(|e| e.into_path())
        .collect();

    paths.sort();
    paths
        .into_iter()
        .map(|p| format!("file://{}", p.display()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn exts() -> Vec<String> {
        vec!["mp3".into(), ".WAV".into()]
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &exts()));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &exts()));
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &exts()));
        assert!(!is_audio_file(Path::new("/tmp/a.flac"), &exts()));
        assert!(!is_audio_file(Path::new("/tmp/a"), &exts()));
    }

    #[test]
    fn scan_samples_recurses_and_skips_hidden() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        let hidden = dir.path().join(".cache");
        fs::create_dir_all(&sub).unwrap();
        fs::create_dir_all(&hidden).unwrap();
        fs::write(dir.path().join("b.wav"), b"x").unwrap();
        fs::write(sub.join("a.mp3"), b"x").unwrap();
        fs::write(hidden.join("c.mp3"), b"x").unwrap();
        fs::write(dir.path().join(".d.mp3"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let found = scan_samples(dir.path(), &exts());
        assert_eq!(
            found,
            vec![
                format!("file://{}", dir.path().join("b.wav").display()),
                format!("file://{}", sub.join("a.mp3").display()),
            ]
        );
    }

    #[test]
    fn scan_samples_of_missing_dir_is_empty() {
        assert!(scan_samples(Path::new("/definitely/not/a/dir"), &exts()).is_empty());
    }
}
