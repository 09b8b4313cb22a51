use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{LevelFilter, error, info};

use crate::app::{App, TallyFollowUp};
use crate::config::{self, LogSettings, StoreBackend, StoreSettings};
use crate::library::{self, Track};
use crate::votes::{MemoryVoteStore, OfflineVoteStore, SqliteVoteStore, VoteClient, VoteStore};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:tunevote.db";

/// Route `log` output to the configured file. The terminal belongs to the UI,
/// so nothing is written to stderr once this succeeds. `RUST_LOG` overrides
/// the configured level.
pub fn init_logging(log: &LogSettings) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log.file)?;

    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_filters(&log.level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(io::Error::other)
}

/// Configured URL first, then `DATABASE_URL`, then a local file.
pub fn database_url(store: &StoreSettings) -> String {
    store
        .database_url
        .clone()
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Build the configured store. A store that cannot be set up is replaced by
/// one whose calls fail, so the UI still comes up and reports per call.
pub async fn connect_store(store: &StoreSettings) -> Arc<dyn VoteStore> {
    match store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory vote store; votes are lost on exit");
            Arc::new(MemoryVoteStore::new())
        }
        StoreBackend::Sqlite => {
            let url = database_url(store);
            match SqliteVoteStore::connect(&url, &store.table, store.max_connections) {
                Ok(sqlite) => Arc::new(sqlite),
                Err(e) => {
                    error!("Vote store {} is unusable: {}", url, e);
                    Arc::new(OfflineVoteStore::new(e.to_string()))
                }
            }
        }
    }
}

/// Tracks from a scanned directory when one is given, otherwise from config.
pub fn load_tracks(dir: Option<&Path>, settings: &config::Settings) -> Vec<Track> {
    let tracks = match dir {
        Some(dir) => {
            info!("Scanning {} for tracks", dir.display());
            library::scan(dir, &settings.library)
        }
        None => library::from_settings(&settings.tracks),
    };
    info!("Loaded {} track(s)", tracks.len());
    tracks
}

/// Kick off the first tally refresh.
pub fn initial_refresh(app: &mut App, client: &VoteClient) {
    if let Some(TallyFollowUp::Fetch) = app.request_refresh(false) {
        client.fetch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::votes::{StoreError, VoteRecord};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn configured_database_url_wins() {
        let store = StoreSettings {
            database_url: Some("sqlite::memory:".to_string()),
            ..StoreSettings::default()
        };
        assert_eq!(database_url(&store), "sqlite::memory:");
    }

    #[test]
    fn load_tracks_prefers_scanned_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b side.mp3"), b"").unwrap();
        fs::write(dir.path().join("A side.mp3"), b"").unwrap();

        let settings = Settings::default();
        let scanned = load_tracks(Some(dir.path()), &settings);
        let titles: Vec<&str> = scanned.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A side", "b side"]);

        let configured = load_tracks(None, &settings);
        assert_eq!(configured.len(), 3);
        assert_eq!(configured[0].title, "Summer Track 1");
    }

    #[test]
    fn memory_backend_connects_without_a_database() {
        let store = StoreSettings {
            backend: StoreBackend::Memory,
            ..StoreSettings::default()
        };
        let rt = tokio::runtime::Runtime::new().unwrap();
        let connected = rt.block_on(connect_store(&store));
        let rows = rt.block_on(connected.select_all()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn unreachable_database_still_yields_a_store() {
        let dir = tempdir().unwrap();
        let store = StoreSettings {
            database_url: Some(format!(
                "sqlite:{}",
                dir.path().join("nonexistent-dir/sub/votes.db").display()
            )),
            ..StoreSettings::default()
        };
        let rt = tokio::runtime::Runtime::new().unwrap();
        let connected = rt.block_on(connect_store(&store));

        assert!(rt.block_on(connected.select_all()).is_err());
        assert!(rt.block_on(connected.insert(VoteRecord::for_track(1))).is_err());
    }

    #[test]
    fn unparseable_database_url_falls_back_to_an_offline_store() {
        let store = StoreSettings {
            database_url: Some("sqlite:votes.db?mode=bogus".to_string()),
            ..StoreSettings::default()
        };
        let rt = tokio::runtime::Runtime::new().unwrap();
        let connected = rt.block_on(connect_store(&store));

        assert!(matches!(
            rt.block_on(connected.select_all()),
            Err(StoreError::Unavailable(_))
        ));
    }
}
