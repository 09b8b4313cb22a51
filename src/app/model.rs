//! Application model types: `App` and `PlaybackState`.
//!
//! The `App` struct holds the tracks, their playback controllers, the vote
//! tally and the single "now playing" selector. It is mutated only from the
//! event loop thread.

use chrono::{DateTime, Local};
use log::{error, warn};

use crate::audio::{AudioCmd, AudioEvent};
use crate::library::{Track, TrackOrdinal};
use crate::playback::{TrackController, TransportCmd, TransportState};
use crate::votes::{TallyEvent, VoteTally};

pub const VOTE_ERROR_MESSAGE: &str = "There was an error recording your vote. Please try again.";

/// Overall playback state, as reported to the desktop (MPRIS).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Store work the event loop should start after a tally event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TallyFollowUp {
    /// Request every vote record now.
    Fetch,
    /// Refresh again after the reconciliation delay.
    ScheduleRefresh,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    /// Cursor position in `tracks`.
    pub selected: usize,
    pub tally: VoteTally,
    /// Blocking notification; input is limited to dismissing it while set.
    pub alert: Option<String>,

    controllers: Vec<TrackController>,
    now_playing: Option<TrackOrdinal>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>, now: DateTime<Local>) -> Self {
        let controllers = tracks.iter().map(|t| TrackController::new(t.ordinal)).collect();
        let tally = VoteTally::new(tracks.iter().map(|t| t.ordinal), now);

        Self {
            tracks,
            selected: 0,
            tally,
            alert: None,
            controllers,
            now_playing: None,
        }
    }

    /// Return true if there is at least one track.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn now_playing(&self) -> Option<TrackOrdinal> {
        self.now_playing
    }

    pub fn now_playing_track(&self) -> Option<&Track> {
        let ordinal = self.now_playing?;
        self.tracks.iter().find(|t| t.ordinal == ordinal)
    }

    pub fn controller(&self, ordinal: TrackOrdinal) -> Option<&TrackController> {
        self.controllers.iter().find(|c| c.ordinal() == ordinal)
    }

    fn controller_mut(&mut self, ordinal: TrackOrdinal) -> Option<&mut TrackController> {
        self.controllers.iter_mut().find(|c| c.ordinal() == ordinal)
    }

    pub fn selected_ordinal(&self) -> Option<TrackOrdinal> {
        self.tracks.get(self.selected).map(|t| t.ordinal)
    }

    /// Number of controllers currently in the playing state.
    pub fn playing_count(&self) -> usize {
        self.controllers.iter().filter(|c| c.is_playing()).count()
    }

    pub fn playback_state(&self) -> PlaybackState {
        if self.playing_count() > 0 {
            PlaybackState::Playing
        } else if self
            .controllers
            .iter()
            .any(|c| c.state() == TransportState::Paused && !c.elapsed().is_zero())
        {
            PlaybackState::Paused
        } else {
            PlaybackState::Stopped
        }
    }

    /// Move selection to the next track, wrapping around.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move selection to the previous track, wrapping around.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + self.tracks.len() - 1) % self.tracks.len();
        }
    }

    /// Play/pause toggle for one track.
    ///
    /// If it is the one playing, the selector is cleared; otherwise it takes the
    /// selector, which pauses whichever track held it. Disabled until loaded.
    pub fn toggle(&mut self, ordinal: TrackOrdinal) -> Vec<AudioCmd> {
        if !self.controller(ordinal).is_some_and(|c| c.is_loaded()) {
            return Vec::new();
        }

        self.now_playing = if self.now_playing == Some(ordinal) {
            None
        } else {
            Some(ordinal)
        };
        self.sync_transports()
    }

    pub fn toggle_selected(&mut self) -> Vec<AudioCmd> {
        match self.selected_ordinal() {
            Some(ordinal) => self.toggle(ordinal),
            None => Vec::new(),
        }
    }

    /// Clear the selector, pausing whatever is playing.
    pub fn stop(&mut self) -> Vec<AudioCmd> {
        self.now_playing = None;
        self.sync_transports()
    }

    /// Push the selector into every controller. Pauses are ordered before plays
    /// so two tracks never play at once on the transport either.
    fn sync_transports(&mut self) -> Vec<AudioCmd> {
        let selected = self.now_playing;
        let mut pauses = Vec::new();
        let mut plays = Vec::new();

        for c in &mut self.controllers {
            match c.apply_selection(selected) {
                Some(TransportCmd::Pause) => pauses.push(AudioCmd::Pause(c.ordinal())),
                Some(TransportCmd::Play) => plays.push(AudioCmd::Play(c.ordinal())),
                None => {}
            }
        }

        pauses.extend(plays);
        pauses
    }

    /// Seek the selected track to `fraction` of its duration.
    pub fn seek_selected(&mut self, fraction: f64) -> Option<AudioCmd> {
        let ordinal = self.selected_ordinal()?;
        let to = self.controller_mut(ordinal)?.seek(fraction)?;
        Some(AudioCmd::Seek { ordinal, to })
    }

    /// Seek the selected track by `percent` of its duration (negative = back).
    pub fn seek_selected_by(&mut self, percent: i32) -> Option<AudioCmd> {
        let ordinal = self.selected_ordinal()?;
        let current = self.controller(ordinal)?.progress();
        self.seek_selected(current + f64::from(percent) / 100.0)
    }

    /// Apply a transport notification. Returns any follow-up commands.
    pub fn on_audio_event(&mut self, event: AudioEvent) -> Vec<AudioCmd> {
        match event {
            AudioEvent::Loaded { ordinal, duration } => {
                if let Some(c) = self.controller_mut(ordinal) {
                    c.on_loaded(duration);
                }
                Vec::new()
            }
            AudioEvent::LoadFailed { ordinal, error } => {
                warn!("Track {} is unavailable: {}", ordinal, error);
                if let Some(c) = self.controller_mut(ordinal) {
                    c.on_load_failed();
                }
                if self.now_playing == Some(ordinal) {
                    self.now_playing = None;
                }
                Vec::new()
            }
            AudioEvent::Progress { ordinal, elapsed } => {
                if let Some(c) = self.controller_mut(ordinal) {
                    c.on_progress(elapsed);
                }
                Vec::new()
            }
            AudioEvent::Ended(ordinal) => {
                if let Some(c) = self.controller_mut(ordinal) {
                    c.on_ended();
                }
                if self.now_playing == Some(ordinal) {
                    self.toggle(ordinal)
                } else {
                    self.sync_transports()
                }
            }
            AudioEvent::PlayFailed { ordinal, error } => {
                error!("Playback of track {} failed: {}", ordinal, error);
                if let Some(c) = self.controller_mut(ordinal) {
                    c.on_play_failed();
                }
                if self.now_playing == Some(ordinal) {
                    self.now_playing = None;
                }
                Vec::new()
            }
        }
    }

    /// Track to submit a vote for, if `ordinal` names a known track.
    pub fn vote(&self, ordinal: TrackOrdinal) -> Option<TrackOrdinal> {
        if self.tally.is_known(ordinal) {
            Some(ordinal)
        } else {
            warn!("Ignoring vote for unknown track {}", ordinal);
            None
        }
    }

    pub fn vote_selected(&self) -> Option<TrackOrdinal> {
        self.vote(self.selected_ordinal()?)
    }

    /// Start a refresh. A manual request is ignored while one is in flight.
    pub fn request_refresh(&mut self, manual: bool) -> Option<TallyFollowUp> {
        if manual && self.tally.is_busy() {
            return None;
        }
        self.tally.begin_refresh();
        Some(TallyFollowUp::Fetch)
    }

    /// Apply the result of a store call.
    pub fn on_tally_event(
        &mut self,
        event: TallyEvent,
        now: DateTime<Local>,
    ) -> Option<TallyFollowUp> {
        match event {
            TallyEvent::RefreshDue => self.request_refresh(false),
            TallyEvent::Fetched(result) => {
                self.tally.finish_refresh(result, now);
                None
            }
            TallyEvent::Voted { ordinal, result } => match self.tally.record_vote(ordinal, result) {
                Ok(()) => Some(TallyFollowUp::ScheduleRefresh),
                Err(_) => {
                    self.alert = Some(VOTE_ERROR_MESSAGE.to_string());
                    None
                }
            },
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
