//! Audio-related small types.
//!
//! This module defines the commands accepted by the audio thread, the events
//! it reports back and the transport error type.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::library::TrackOrdinal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCmd {
    /// Start or resume the given track.
    Play(TrackOrdinal),
    /// Pause the given track, keeping its position.
    Pause(TrackOrdinal),
    /// Move the given track to an absolute position.
    Seek { ordinal: TrackOrdinal, to: Duration },
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug)]
/// Transport notifications sent to the UI thread.
pub enum AudioEvent {
    /// Media attached and duration known.
    Loaded {
        ordinal: TrackOrdinal,
        duration: Duration,
    },
    LoadFailed {
        ordinal: TrackOrdinal,
        error: AudioError,
    },
    /// Elapsed time of a playing (or just seeked) track.
    Progress {
        ordinal: TrackOrdinal,
        elapsed: Duration,
    },
    /// Natural end of media. The sink has been rewound and paused.
    Ended(TrackOrdinal),
    PlayFailed {
        ordinal: TrackOrdinal,
        error: AudioError,
    },
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    Output(String),
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("duration of {0:?} is unknown")]
    UnknownDuration(PathBuf),
}
