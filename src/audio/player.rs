use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::library::Track;

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioEvent};

/// Handle to the audio thread: commands go in, transport events come out.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    events: Receiver<AudioEvent>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(tracks: Vec<Track>, audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, events) = mpsc::channel::<AudioEvent>();

        let audio_handle = spawn_audio_thread(tracks, rx, event_tx, audio_settings);

        Self {
            tx,
            events,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    /// Next pending transport event, if any.
    pub fn try_event(&self) -> Option<AudioEvent> {
        self.events.try_recv().ok()
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
