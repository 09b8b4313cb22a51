use std::time::Duration;

use crate::library::TrackOrdinal;

/// Lifecycle of one track's media transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportState {
    /// Media not attached yet, or it failed to load. Controls are disabled.
    Unloaded,
    /// Metadata known, never started.
    Loaded,
    Playing,
    Paused,
    /// Reached the end of the media; the next selection change parks it at the start.
    Ended,
}

/// What the audio transport should do after a selection change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportCmd {
    Play,
    Pause,
}

/// Playback controller for a single track.
///
/// The controller never decides on its own whether it should be playing: the
/// presentation layer owns the global "now playing" selector and feeds it in
/// through [`TrackController::apply_selection`].
#[derive(Clone, Debug)]
pub struct TrackController {
    ordinal: TrackOrdinal,
    state: TransportState,
    elapsed: Duration,
    duration: Option<Duration>,
}

impl TrackController {
    pub fn new(ordinal: TrackOrdinal) -> Self {
        Self {
            ordinal,
            state: TransportState::Unloaded,
            elapsed: Duration::ZERO,
            duration: None,
        }
    }

    pub fn ordinal(&self) -> TrackOrdinal {
        self.ordinal
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Controls are enabled once metadata has loaded.
    pub fn is_loaded(&self) -> bool {
        self.state != TransportState::Unloaded
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Progress in `0.0..=1.0`; zero while the duration is unknown.
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if !d.is_zero() => {
                (self.elapsed.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Metadata arrived from the transport.
    pub fn on_loaded(&mut self, duration: Duration) {
        self.duration = Some(duration);
        if self.state == TransportState::Unloaded {
            self.state = TransportState::Loaded;
        }
    }

    /// Derive the play/pause flag from the global selector.
    ///
    /// Returns the command the transport needs, if the state changed.
    pub fn apply_selection(&mut self, selected: Option<TrackOrdinal>) -> Option<TransportCmd> {
        let wanted = selected == Some(self.ordinal);
        match (self.state, wanted) {
            (TransportState::Unloaded, _) => None,
            (TransportState::Playing, true) => None,
            (_, true) => {
                self.state = TransportState::Playing;
                Some(TransportCmd::Play)
            }
            (TransportState::Playing, false) => {
                self.state = TransportState::Paused;
                Some(TransportCmd::Pause)
            }
            (TransportState::Ended, false) => {
                // The transport has already rewound itself.
                self.state = TransportState::Paused;
                self.elapsed = Duration::ZERO;
                None
            }
            (TransportState::Loaded | TransportState::Paused, false) => None,
        }
    }

    /// Progress notification from the transport. Ignored unless loaded.
    pub fn on_progress(&mut self, elapsed: Duration) {
        if !self.is_loaded() {
            return;
        }
        self.elapsed = match self.duration {
            Some(d) => elapsed.min(d),
            None => elapsed,
        };
    }

    /// Natural end of media.
    pub fn on_ended(&mut self) {
        if self.is_loaded() {
            self.state = TransportState::Ended;
            if let Some(d) = self.duration {
                self.elapsed = d;
            }
        }
    }

    /// The transport could not start playback; fall back to not playing.
    pub fn on_play_failed(&mut self) {
        if self.state == TransportState::Playing {
            self.state = TransportState::Paused;
        }
    }

    /// The media could not be attached at all.
    pub fn on_load_failed(&mut self) {
        self.state = TransportState::Unloaded;
        self.duration = None;
        self.elapsed = Duration::ZERO;
    }

    /// Jump to `fraction` of the track. Returns the absolute target, or `None`
    /// when nothing is loaded yet.
    pub fn seek(&mut self, fraction: f64) -> Option<Duration> {
        if !self.is_loaded() {
            return None;
        }
        let duration = self.duration?;
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let target = duration.mul_f64(fraction);
        self.elapsed = target;
        Some(target)
    }
}
