use std::collections::HashSet;
use std::{env, path::PathBuf};

use super::schema::Settings;
use crate::votes::is_sql_identifier;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, lets `TUNEVOTE__` environment
/// variables override it and falls back to struct defaults for anything unset.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TUNEVOTE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.votes.refresh_interval_secs == 0 {
            return Err("votes.refresh_interval_secs must be >= 1".to_string());
        }
        if self.audio.progress_interval_ms == 0 {
            return Err("audio.progress_interval_ms must be >= 1".to_string());
        }
        if !(1..=100).contains(&self.controls.seek_step_percent) {
            return Err("controls.seek_step_percent must be within 1..=100".to_string());
        }
        if self.store.max_connections == 0 {
            return Err("store.max_connections must be >= 1".to_string());
        }
        if !is_sql_identifier(&self.store.table) {
            return Err(format!(
                "store.table {:?} is not a plain SQL identifier",
                self.store.table
            ));
        }

        let mut seen = HashSet::new();
        for t in &self.tracks {
            if t.number == 0 {
                return Err(format!("track {:?} has number 0; numbers start at 1", t.title));
            }
            if !seen.insert(t.number) {
                return Err(format!("track number {} is used more than once", t.number));
            }
        }
        Ok(())
    }
}

/// Resolve the config path from `TUNEVOTE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TUNEVOTE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tunevote/config.toml`
/// or `~/.config/tunevote/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("tunevote").join("config.toml"))
}
