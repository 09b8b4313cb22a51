use std::path::PathBuf;

use serde::Deserialize;

use crate::library::TrackOrdinal;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tunevote/config.toml` or `~/.config/tunevote/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TUNEVOTE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub votes: VoteSettings,
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub library: LibrarySettings,
    pub log: LogSettings,
    pub tracks: Vec<TrackSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            votes: VoteSettings::default(),
            audio: AudioSettings::default(),
            ui: UiSettings::default(),
            controls: ControlsSettings::default(),
            library: LibrarySettings::default(),
            log: LogSettings::default(),
            tracks: default_tracks(),
        }
    }
}

fn default_tracks() -> Vec<TrackSettings> {
    (1..=3)
        .map(|n| TrackSettings {
            number: n,
            title: format!("Summer Track {n}"),
            path: PathBuf::from(format!("audio/track{n}.mp3")),
        })
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    Sqlite,
    #[serde(alias = "in-memory", alias = "in_memory")]
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// Connection string. When unset, `DATABASE_URL` is used, then `sqlite:tunevote.db`.
    pub database_url: Option<String>,
    /// Table holding one row per vote.
    pub table: String,
    pub max_connections: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            database_url: None,
            table: "music_votes".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoteSettings {
    /// Period of the automatic tally refresh (seconds).
    pub refresh_interval_secs: u64,
    /// Delay between a successful vote and the refresh that reconciles it (milliseconds).
    pub reconcile_delay_ms: u64,
}

impl Default for VoteSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            reconcile_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// How often the audio thread reports elapsed time while playing (milliseconds).
    pub progress_interval_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 500,
            progress_interval_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    pub subtitle: String,
    pub footer_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " Summer Music Voting ".to_string(),
            subtitle: "Listen to our summer tracks and vote for your favorites!".to_string(),
            footer_text: "Enjoy the music and happy voting!".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Percent of the track to jump when pressing `h` / `l`.
    pub seek_step_percent: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_step_percent: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Log destination. The terminal is taken by the UI, so logs go to a file.
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: PathBuf::from("tunevote.log"),
        }
    }
}

/// One `[[tracks]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackSettings {
    pub number: TrackOrdinal,
    pub title: String,
    pub path: PathBuf,
}
