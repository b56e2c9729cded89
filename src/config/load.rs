use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` layers environment variables (prefix `SONGFORGE__`) over
/// an optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("SONGFORGE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.player;
        if !(0.0..=1.0).contains(&p.initial_volume) {
            return Err("player.initial_volume must be within 0.0..=1.0".to_string());
        }
        if !(p.volume_step > 0.0 && p.volume_step <= 1.0) {
            return Err("player.volume_step must be within (0.0, 1.0]".to_string());
        }
        if p.download_extension.trim().trim_start_matches('.').is_empty() {
            return Err("player.download_extension must not be empty".to_string());
        }
        if self.generator.sample_urls.is_empty() && self.generator.sample_dir.is_none() {
            return Err("generator needs sample_urls or sample_dir".to_string());
        }
        Ok(())
    }

    /// Directory downloads are written to: `download.dir`, else
    /// `~/Downloads`, else the current directory.
    pub fn download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download.dir {
            return dir.clone();
        }
        env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Downloads"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Resolve the config path from `SONGFORGE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SONGFORGE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/songforge/config.toml`
/// or `~/.config/songforge/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("songforge").join("config.toml"))
}

/// Default log file: `$XDG_STATE_HOME/songforge/songforge.log`, then
/// `~/.local/state/songforge/songforge.log`, then the temp dir.
pub fn default_log_path() -> PathBuf {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("state")
    } else {
        env::temp_dir()
    };

    state_home.join("songforge").join("songforge.log")
}
