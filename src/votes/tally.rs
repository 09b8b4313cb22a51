//! The vote tally view-model.
//!
//! Counts are replaced wholesale by every successful refresh. The only
//! incremental change is the optimistic bump after a vote is acknowledged,
//! which the next refresh silently overwrites.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use log::{error, info, warn};

use crate::library::TrackOrdinal;

use super::model::VoteRecord;
use super::store::StoreError;

#[derive(Debug, Clone)]
pub struct VoteTally {
    counts: BTreeMap<TrackOrdinal, u64>,
    last_refresh: DateTime<Local>,
    busy: bool,
}

impl VoteTally {
    /// A zeroed tally over the known track ordinals.
    pub fn new<I>(ordinals: I, now: DateTime<Local>) -> Self
    where
        I: IntoIterator<Item = TrackOrdinal>,
    {
        Self {
            counts: ordinals.into_iter().map(|o| (o, 0)).collect(),
            last_refresh: now,
            busy: false,
        }
    }

    pub fn count(&self, ordinal: TrackOrdinal) -> u64 {
        self.counts.get(&ordinal).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub fn counts(&self) -> &BTreeMap<TrackOrdinal, u64> {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn last_refresh(&self) -> DateTime<Local> {
        self.last_refresh
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_known(&self, ordinal: TrackOrdinal) -> bool {
        self.counts.contains_key(&ordinal)
    }

    pub fn begin_refresh(&mut self) {
        self.busy = true;
    }

    /// Apply the outcome of a `select_all`.
    ///
    /// Returns `true` when the tally was replaced. On error the previous counts
    /// and timestamp stay as they were.
    pub fn finish_refresh(
        &mut self,
        result: Result<Vec<VoteRecord>, StoreError>,
        at: DateTime<Local>,
    ) -> bool {
        self.busy = false;

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error fetching votes: {}", e);
                return false;
            }
        };

        let mut counts: BTreeMap<TrackOrdinal, u64> =
            self.counts.keys().map(|&o| (o, 0)).collect();
        let mut ignored = 0usize;
        for row in &rows {
            match row.ordinal().and_then(|o| counts.get_mut(&o)) {
                Some(c) => *c += 1,
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            warn!("Ignored {} vote row(s) naming unknown tracks", ignored);
        }

        self.counts = counts;
        self.last_refresh = at;
        info!("Tally refreshed: {} vote(s) across {} row(s)", self.total(), rows.len());
        true
    }

    /// Apply the outcome of inserting a vote for `ordinal`.
    ///
    /// On success the local count is bumped immediately, ahead of the
    /// reconciling refresh. Unknown ordinals never touch the tally.
    pub fn record_vote(
        &mut self,
        ordinal: TrackOrdinal,
        result: Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        if let Err(e) = result {
            error!("Error voting for track {}: {}", ordinal, e);
            return Err(e);
        }

        match self.counts.get_mut(&ordinal) {
            Some(c) => *c += 1,
            None => warn!("Vote acknowledged for unknown track {}; tally unchanged", ordinal),
        }
        Ok(())
    }
}
