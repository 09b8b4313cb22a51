use std::path::PathBuf;
use std::time::Duration;

/// 1-based number naming one track.
pub type TrackOrdinal = u32;

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub ordinal: TrackOrdinal,
    pub title: String,
    pub path: PathBuf,
    /// Duration from the container tags, if the tags carried one at scan time.
    pub duration: Option<Duration>,
}
