use async_trait::async_trait;

use super::model::VoteRecord;
use super::store::{StoreError, VoteStore};

/// Stands in for a store that could not be set up at all. Every call fails
/// with the setup error, so reads keep stale data and votes raise the alert.
#[derive(Debug, Clone)]
pub struct OfflineVoteStore {
    reason: String,
}

impl OfflineVoteStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl VoteStore for OfflineVoteStore {
    async fn insert(&self, _record: VoteRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    async fn select_all(&self) -> Result<Vec<VoteRecord>, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}
