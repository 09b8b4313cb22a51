//! Voting: the external vote store, the tally view-model and the client that
//! bridges the two across the tokio runtime.
//!
//! The store owns persistence and is only ever asked to insert a record or to
//! return every record. Counting happens here, wholesale, on every refresh.

mod client;
mod memory;
mod model;
mod offline;
mod sqlite;
mod store;
mod tally;

pub use client::{Poller, TallyEvent, VoteClient};
pub use memory::MemoryVoteStore;
pub use model::VoteRecord;
pub use offline::OfflineVoteStore;
pub use sqlite::{SqliteVoteStore, is_sql_identifier};
pub use store::{StoreError, VoteStore};
pub use tally::VoteTally;

#[cfg(test)]
mod tests;
