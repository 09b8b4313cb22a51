use std::sync::Mutex;

use async_trait::async_trait;

use super::model::VoteRecord;
use super::store::{StoreError, VoteStore};

/// In-process vote store. Votes live as long as the process does.
#[derive(Debug, Default)]
pub struct MemoryVoteStore {
    rows: Mutex<Vec<VoteRecord>>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_rows(rows: Vec<VoteRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn insert(&self, record: VoteRecord) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::Unavailable("vote table lock poisoned".to_string()))?;
        rows.push(record);
        Ok(())
    }

    async fn select_all(&self) -> Result<Vec<VoteRecord>, StoreError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::Unavailable("vote table lock poisoned".to_string()))?;
        Ok(rows.clone())
    }
}
