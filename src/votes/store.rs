use async_trait::async_trait;
use thiserror::Error;

use super::model::VoteRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid table name {0:?}")]
    InvalidTable(String),
    #[error("vote store unavailable: {0}")]
    Unavailable(String),
}

/// The external vote store.
///
/// Implementations own storage, ordering and timestamps. Callers only insert
/// single records and read the whole table back.
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn insert(&self, record: VoteRecord) -> Result<(), StoreError>;

    async fn select_all(&self) -> Result<Vec<VoteRecord>, StoreError>;
}
