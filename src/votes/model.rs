use serde::{Deserialize, Serialize};

use crate::library::TrackOrdinal;

/// One cast vote as stored in the vote table.
///
/// `track_number` is kept as the raw integer column so malformed rows
/// (negative, zero, unknown tracks) survive the round trip and can be
/// discarded when counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub track_number: i64,
}

impl VoteRecord {
    pub fn for_track(ordinal: TrackOrdinal) -> Self {
        Self {
            track_number: i64::from(ordinal),
        }
    }

    /// The ordinal this row names, if it is a representable track number.
    pub fn ordinal(&self) -> Option<TrackOrdinal> {
        TrackOrdinal::try_from(self.track_number)
            .ok()
            .filter(|&o| o > 0)
    }
}
