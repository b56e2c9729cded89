use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/songforge/config.toml` or `~/.config/songforge/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SONGFORGE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub generator: GeneratorSettings,
    pub player: PlayerSettings,
    pub download: DownloadSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Simulated generation latency (milliseconds).
    pub delay_ms: u64,
    /// Audio locators a generated song may point at.
    pub sample_urls: Vec<String>,
    /// Optional directory scanned for local sample audio. When it yields
    /// files they replace `sample_urls`.
    pub sample_dir: Option<PathBuf>,
    /// File extensions treated as audio when scanning `sample_dir`
    /// (case-insensitive, without dot).
    pub sample_extensions: Vec<String>,
    /// Genre used when the user gives no tags.
    pub default_genre: String,
    /// Artist credited on generated songs.
    pub artist: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            delay_ms: 3000,
            sample_urls: vec![
                "https://www.soundjay.com/misc/sounds/bell-ringing-05.wav".into(),
                "https://www.soundjay.com/misc/sounds/fail-buzzer-02.wav".into(),
                "https://www.soundjay.com/misc/sounds/magic-chime-02.wav".into(),
            ],
            sample_dir: None,
            sample_extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            default_genre: "Electronic".to_string(),
            artist: "AI Generated".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Volume a new controller starts at, `0.0..=1.0`.
    pub initial_volume: f32,
    /// Volume change per `+` / `-` key press.
    pub volume_step: f32,
    /// Number of seconds to scrub when pressing `h` / `l`.
    pub scrub_seconds: u64,
    /// Extension appended to the title when saving a track.
    pub download_extension: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            volume_step: 0.1,
            scrub_seconds: 5,
            download_extension: "mp3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DownloadSettings {
    /// Where downloads are written. Defaults to `~/Downloads`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether the standalone demo player is listed under the generated songs.
    pub show_demo_player: bool,
    pub demo: DemoTrackSettings,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Create music with AI ~ ".to_string(),
            show_demo_player: true,
            demo: DemoTrackSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoTrackSettings {
    pub title: String,
    pub artist: String,
    pub url: String,
}

impl Default for DemoTrackSettings {
    fn default() -> Self {
        Self {
            title: "Cyber Dreams".to_string(),
            artist: "AI Generated".to_string(),
            url: "https://www.soundjay.com/misc/sounds/magic-chime-02.wav".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file path. Defaults to `$XDG_STATE_HOME/songforge/songforge.log`.
    pub file: Option<PathBuf>,
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}
