use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use log::{info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::app::PlaybackState;
use crate::library::{Track, TrackOrdinal};

pub const BUS_NAME: &str = "org.mpris.MediaPlayer2.tunevote";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Media-key requests forwarded to the event loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    /// Publish the now-playing track, or clear it with `None`.
    pub fn set_track_metadata(&self, track: Option<&Track>, length: Option<Duration>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match track {
            Some(t) => {
                s.title = Some(t.title.clone());
                s.url = Some(format!("file://{}", t.path.display()));
                s.length_micros = length
                    .or(t.duration)
                    .map(|d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX));
                s.track_id = track_object_path(t.ordinal);
            }
            None => {
                s.title = None;
                s.url = None;
                s.length_micros = None;
                s.track_id = None;
            }
        }
    }
}

fn track_object_path(ordinal: TrackOrdinal) -> Option<OwnedObjectPath> {
    ObjectPath::try_from(format!("{}/track/{}", OBJECT_PATH, ordinal))
        .ok()
        .map(OwnedObjectPath::from)
}

fn owned<'a>(value: impl Into<Value<'a>>) -> Option<OwnedValue> {
    OwnedValue::try_from(value.into()).ok()
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "tunevote"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let entries = [
            (
                "mpris:trackid",
                s.track_id.clone().and_then(|p| owned(p.into_inner())),
            ),
            ("xesam:title", owned(s.title.clone().unwrap_or_default())),
            ("xesam:url", s.url.clone().and_then(|u| owned(u))),
            ("mpris:length", s.length_micros.and_then(|l| owned(l))),
        ];
        for (key, value) in entries {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        }
        map
    }
}

/// Serve the media-player interfaces on the session bus from a background
/// thread. Failures are logged and the app keeps running without media keys.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!("MPRIS: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                warn!("MPRIS: failed to acquire name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                .await
            {
                warn!("MPRIS: failed to register root iface: {e}");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!("MPRIS: failed to register player iface: {e}");
                return;
            }
            info!("MPRIS: serving {}", BUS_NAME);

            // Keep the service alive.
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
