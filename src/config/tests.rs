use super::load::{default_config_path, resolve_config_path};
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
fn resolve_config_path_prefers_tunevote_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("TUNEVOTE_CONFIG_PATH", "/tmp/tunevote-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/tunevote-test-config.toml")
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
            .join("tunevote")
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
            .join("tunevote")
            .join("config.toml")
    );
}

#[test]
fn defaults_offer_three_summer_tracks_and_pass_validation() {
    let s = Settings::default();
    assert_eq!(s.tracks.len(), 3);
    assert_eq!(s.tracks[1].number, 2);
    assert_eq!(s.tracks[1].title, "Summer Track 2");
    assert_eq!(s.votes.refresh_interval_secs, 30);
    assert_eq!(s.votes.reconcile_delay_ms, 500);
    assert_eq!(s.store.table, "music_votes");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[store]
backend = "in-memory"
database_url = "sqlite:/tmp/votes.db"
table = "summer_votes"

[votes]
refresh_interval_secs = 10
reconcile_delay_ms = 50

[audio]
quit_fade_out_ms = 0

[controls]
seek_step_percent = 10

[ui]
header_text = "hello"

[log]
level = "debug"
file = "/tmp/tunevote.log"

[[tracks]]
number = 7
title = "Only One"
path = "/music/one.ogg"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TUNEVOTE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("TUNEVOTE__VOTES__REFRESH_INTERVAL_SECS");

    let s = Settings::load().unwrap();
    assert_eq!(s.store.backend, StoreBackend::Memory);
    assert_eq!(s.store.database_url.as_deref(), Some("sqlite:/tmp/votes.db"));
    assert_eq!(s.store.table, "summer_votes");
    assert_eq!(s.store.max_connections, 5);
    assert_eq!(s.votes.refresh_interval_secs, 10);
    assert_eq!(s.votes.reconcile_delay_ms, 50);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.audio.progress_interval_ms, 200);
    assert_eq!(s.controls.seek_step_percent, 10);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.log.level, "debug");
    assert_eq!(s.tracks.len(), 1);
    assert_eq!(s.tracks[0].number, 7);
    assert_eq!(s.tracks[0].path, std::path::PathBuf::from("/music/one.ogg"));
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[votes]
refresh_interval_secs = 30
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TUNEVOTE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("TUNEVOTE__VOTES__REFRESH_INTERVAL_SECS", "5");

    let s = Settings::load().unwrap();
    assert_eq!(s.votes.refresh_interval_secs, 5);
}

#[test]
fn validate_rejects_unsafe_table_names() {
    let mut s = Settings::default();
    s.store.table = "votes; DROP TABLE votes".to_string();
    assert!(s.validate().is_err());

    s.store.table = "1votes".to_string();
    assert!(s.validate().is_err());

    s.store.table = "_votes_2024".to_string();
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_duplicate_and_zero_track_numbers() {
    let mut s = Settings::default();
    s.tracks[2].number = 1;
    assert!(s.validate().unwrap_err().contains("more than once"));

    let mut s = Settings::default();
    s.tracks[0].number = 0;
    assert!(s.validate().is_err());
}

#[test]
fn validate_rejects_zero_refresh_interval_and_bad_seek_step() {
    let mut s = Settings::default();
    s.votes.refresh_interval_secs = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.seek_step_percent = 0;
    assert!(s.validate().is_err());
    s.controls.seek_step_percent = 101;
    assert!(s.validate().is_err());
}
