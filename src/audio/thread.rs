use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;
use crate::library::{Track, TrackOrdinal};

use super::sink::{create_sink_at, resolve_duration};
use super::types::{AudioCmd, AudioError, AudioEvent};

/// One attached track and the bookkeeping needed to report its position.
struct Slot {
    track: Track,
    sink: Option<Sink>,
    paused: bool,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Slot {
    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
        self.paused = true;
    }

    /// Replace the sink with a fresh one positioned at `at`, keeping the paused flag.
    fn rebuild_at(&mut self, stream: &OutputStream, at: Duration) -> Result<(), AudioError> {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.accumulated = at;
        self.started_at = None;

        let sink = create_sink_at(stream, &self.track, at)?;
        if !self.paused {
            sink.play();
            self.started_at = Some(Instant::now());
        }
        self.sink = Some(sink);
        Ok(())
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

/// Attach every track: resolve its duration and park a paused sink at the start.
fn attach(stream: &OutputStream, tracks: Vec<Track>, events: &Sender<AudioEvent>) -> Vec<Slot> {
    tracks
        .into_iter()
        .map(|track| {
            let ordinal = track.ordinal;
            let attached = resolve_duration(&track).and_then(|duration| {
                create_sink_at(stream, &track, Duration::ZERO).map(|sink| (duration, sink))
            });

            let sink = match attached {
                Ok((duration, sink)) => {
                    let _ = events.send(AudioEvent::Loaded { ordinal, duration });
                    Some(sink)
                }
                Err(error) => {
                    warn!("Track {} could not be loaded: {}", ordinal, error);
                    let _ = events.send(AudioEvent::LoadFailed { ordinal, error });
                    None
                }
            };

            Slot {
                track,
                sink,
                paused: true,
                started_at: None,
                accumulated: Duration::ZERO,
            }
        })
        .collect()
}

fn slot_mut(slots: &mut [Slot], ordinal: TrackOrdinal) -> Option<&mut Slot> {
    let slot = slots.iter_mut().find(|s| s.track.ordinal == ordinal);
    if slot.is_none() {
        warn!("Audio command for unknown track {}", ordinal);
    }
    slot
}

pub(super) fn spawn_audio_thread(
    tracks: Vec<Track>,
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                error!("No audio output device: {}", e);
                for track in &tracks {
                    let _ = events.send(AudioEvent::LoadFailed {
                        ordinal: track.ordinal,
                        error: AudioError::Output(e.to_string()),
                    });
                }
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let mut slots = attach(&stream, tracks, &events);
        info!("Audio thread attached {} track(s)", slots.len());

        let tick = Duration::from_millis(audio_settings.progress_interval_ms.max(1));

        loop {
            match rx.recv_timeout(tick) {
                Ok(AudioCmd::Play(ordinal)) => {
                    let Some(slot) = slot_mut(&mut slots, ordinal) else {
                        continue;
                    };
                    if slot.sink.is_none() {
                        let at = slot.elapsed();
                        if let Err(error) = slot.rebuild_at(&stream, at) {
                            let _ = events.send(AudioEvent::PlayFailed { ordinal, error });
                            continue;
                        }
                    }
                    if slot.paused {
                        if let Some(s) = slot.sink.as_ref() {
                            s.play();
                        }
                        slot.started_at = Some(Instant::now());
                        slot.paused = false;
                    }
                    let elapsed = slot.elapsed();
                    let _ = events.send(AudioEvent::Progress { ordinal, elapsed });
                }

                Ok(AudioCmd::Pause(ordinal)) => {
                    if let Some(slot) = slot_mut(&mut slots, ordinal) {
                        slot.pause();
                        let elapsed = slot.elapsed();
                        let _ = events.send(AudioEvent::Progress { ordinal, elapsed });
                    }
                }

                Ok(AudioCmd::Seek { ordinal, to }) => {
                    // Rebuild the sink and skip into the file.
                    // This uses `Source::skip_duration` (works for common formats).
                    let Some(slot) = slot_mut(&mut slots, ordinal) else {
                        continue;
                    };
                    match slot.rebuild_at(&stream, to) {
                        Ok(()) => {
                            let _ = events.send(AudioEvent::Progress { ordinal, elapsed: to });
                        }
                        Err(error) => {
                            let was_playing = !slot.paused;
                            slot.paused = true;
                            if was_playing {
                                let _ = events.send(AudioEvent::PlayFailed { ordinal, error });
                            } else {
                                warn!("Seek on track {} failed: {}", ordinal, error);
                            }
                        }
                    }
                }

                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    for slot in &slots {
                        if let Some(ref s) = slot.sink {
                            if !slot.paused {
                                // Fade out gently before stopping.
                                fade_out_sink(s, fade_out_ms);
                            }
                            s.stop();
                        }
                    }
                    break;
                }

                Err(RecvTimeoutError::Timeout) => {
                    // Periodic progress report and end-of-media check.
                    for slot in slots.iter_mut().filter(|s| !s.paused) {
                        let ordinal = slot.track.ordinal;
                        let finished = slot.sink.as_ref().map_or(true, |s| s.empty());
                        if !finished {
                            let elapsed = slot.elapsed();
                            let _ = events.send(AudioEvent::Progress { ordinal, elapsed });
                            continue;
                        }

                        slot.paused = true;
                        if let Err(error) = slot.rebuild_at(&stream, Duration::ZERO) {
                            warn!("Track {} could not be rewound: {}", ordinal, error);
                        }
                        let _ = events.send(AudioEvent::Ended(ordinal));
                    }
                }

                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
