use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_songforge_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SONGFORGE_CONFIG_PATH", "/tmp/songforge-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/songforge-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("songforge")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("songforge")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");

    assert_eq!(
        default_log_path(),
        std::path::PathBuf::from("/tmp/xdg-state")
            .join("songforge")
            .join("songforge.log")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[generator]
delay_ms = 10
sample_urls = ["file:///tmp/a.wav"]
default_genre = "Lo-fi"

[player]
initial_volume = 0.5
volume_step = 0.25
scrub_seconds = 9
download_extension = "wav"

[download]
dir = "/tmp/songforge-downloads"

[ui]
header_text = "hello"
show_demo_player = false

[ui.demo]
title = "Demo"

[log]
filter = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SONGFORGE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SONGFORGE__PLAYER__SCRUB_SECONDS");

    let s = Settings::load().unwrap();
    assert_eq!(s.generator.delay_ms, 10);
    assert_eq!(s.generator.sample_urls, vec!["file:///tmp/a.wav".to_string()]);
    assert_eq!(s.generator.default_genre, "Lo-fi");
    assert_eq!(s.generator.artist, "AI Generated");
    assert_eq!(s.player.initial_volume, 0.5);
    assert_eq!(s.player.volume_step, 0.25);
    assert_eq!(s.player.scrub_seconds, 9);
    assert_eq!(s.player.download_extension, "wav");
    assert_eq!(
        s.download_dir(),
        std::path::PathBuf::from("/tmp/songforge-downloads")
    );
    assert_eq!(s.ui.header_text, "hello");
    assert!(!s.ui.show_demo_player);
    assert_eq!(s.ui.demo.title, "Demo");
    assert_eq!(s.ui.demo.artist, "AI Generated");
    assert_eq!(s.log.filter, "debug");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[player]
scrub_seconds = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SONGFORGE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SONGFORGE__PLAYER__SCRUB_SECONDS", "30");

    let s = Settings::load().unwrap();
    assert_eq!(s.player.scrub_seconds, 30);
}

#[test]
fn validate_rejects_out_of_range_player_settings() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.player.initial_volume = 1.5;
    assert!(s.validate().is_err());

    s.player.initial_volume = 0.5;
    s.player.volume_step = 0.0;
    assert!(s.validate().is_err());

    s.player.volume_step = 0.1;
    s.player.download_extension = " . ".to_string();
    assert!(s.validate().is_err());
}

#[test]
fn validate_requires_some_sample_source() {
    let mut s = Settings::default();
    s.generator.sample_urls.clear();
    assert!(s.validate().is_err());

    s.generator.sample_dir = Some("/tmp/samples".into());
    assert!(s.validate().is_ok());
}
