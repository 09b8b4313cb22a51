use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, TimeZone};

fn at(secs: i64) -> chrono::DateTime<Local> {
    Local.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
}

fn three_tracks() -> VoteTally {
    VoteTally::new([1, 2, 3], at(0))
}

fn rows(numbers: &[i64]) -> Vec<VoteRecord> {
    numbers
        .iter()
        .map(|&n| VoteRecord { track_number: n })
        .collect()
}

fn unavailable() -> StoreError {
    StoreError::Unavailable("connection reset".to_string())
}

/// Memory store whose reads and writes can be made to fail on demand.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryVoteStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

#[async_trait]
impl VoteStore for FlakyStore {
    async fn insert(&self, record: VoteRecord) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.insert(record).await
    }

    async fn select_all(&self) -> Result<Vec<VoteRecord>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.select_all().await
    }
}

#[test]
fn successful_vote_bumps_locally_before_reconciliation() {
    let mut tally = three_tracks();

    tally.record_vote(2, Ok(())).unwrap();

    assert_eq!(tally.count(1), 0);
    assert_eq!(tally.count(2), 1);
    assert_eq!(tally.count(3), 0);
    assert_eq!(tally.total(), 1);
}

#[test]
fn reconciliation_overwrites_the_optimistic_guess() {
    let mut tally = three_tracks();
    tally.record_vote(2, Ok(())).unwrap();

    tally.begin_refresh();
    assert!(tally.finish_refresh(Ok(rows(&[2, 2, 2])), at(1)));

    assert_eq!(tally.count(2), 3);
    assert_eq!(tally.total(), 3);
    assert_eq!(tally.last_refresh(), at(1));
}

#[test]
fn failed_refresh_keeps_previous_counts_and_timestamp() {
    let mut tally = three_tracks();
    tally.finish_refresh(Ok(rows(&[1, 3, 3])), at(5));

    tally.begin_refresh();
    assert!(tally.is_busy());
    assert!(!tally.finish_refresh(Err(unavailable()), at(35)));

    assert!(!tally.is_busy());
    assert_eq!(tally.count(1), 1);
    assert_eq!(tally.count(3), 2);
    assert_eq!(tally.last_refresh(), at(5));
}

#[test]
fn failed_vote_leaves_tally_unchanged() {
    let mut tally = three_tracks();
    tally.finish_refresh(Ok(rows(&[2])), at(1));

    assert!(tally.record_vote(2, Err(unavailable())).is_err());
    assert_eq!(tally.count(2), 1);
    assert_eq!(tally.total(), 1);
}

#[test]
fn unknown_ordinals_never_touch_the_tally() {
    let mut tally = three_tracks();

    tally.record_vote(9, Ok(())).unwrap();
    assert_eq!(tally.total(), 0);
    assert!(!tally.is_known(9));

    tally.finish_refresh(Ok(rows(&[1, 0, -4, 9, 1, i64::MAX])), at(1));
    assert_eq!(tally.count(1), 2);
    assert_eq!(tally.total(), 2);
    assert_eq!(tally.counts().len(), 3);
}

#[test]
fn total_tracks_votes_cast_since_the_last_refresh() {
    let mut tally = three_tracks();
    tally.finish_refresh(Ok(rows(&[1, 2, 3, 3])), at(1));

    for ordinal in [3, 1, 3, 2, 2] {
        tally.record_vote(ordinal, Ok(())).unwrap();
    }

    assert_eq!(tally.total(), 4 + 5);
}

#[test]
fn vote_record_ordinal_rejects_non_positive_and_oversized_numbers() {
    assert_eq!(VoteRecord { track_number: 3 }.ordinal(), Some(3));
    assert_eq!(VoteRecord { track_number: 0 }.ordinal(), None);
    assert_eq!(VoteRecord { track_number: -1 }.ordinal(), None);
    assert_eq!(VoteRecord { track_number: i64::MAX }.ordinal(), None);
    assert_eq!(VoteRecord::for_track(2).track_number, 2);
}

fn client_with(
    store: Arc<dyn VoteStore>,
    delay: Duration,
) -> (tokio::runtime::Runtime, VoteClient, Receiver<TallyEvent>) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (tx, rx) = mpsc::channel();
    let client = VoteClient::new(store, rt.handle().clone(), tx, delay);
    (rt, client, rx)
}

fn next_event(rx: &Receiver<TallyEvent>) -> TallyEvent {
    rx.recv_timeout(Duration::from_secs(5)).unwrap()
}

#[test]
fn submit_then_reconcile_matches_store_counts() {
    let store = Arc::new(MemoryVoteStore::with_rows(rows(&[2, 2])));
    let (_rt, client, rx) = client_with(store, Duration::from_millis(10));
    let mut tally = three_tracks();

    client.submit(2);
    match next_event(&rx) {
        TallyEvent::Voted { ordinal, result } => {
            assert_eq!(ordinal, 2);
            tally.record_vote(ordinal, result).unwrap();
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(tally.count(2), 1);

    client.schedule_refresh();
    assert!(matches!(next_event(&rx), TallyEvent::RefreshDue));

    tally.begin_refresh();
    client.fetch();
    match next_event(&rx) {
        TallyEvent::Fetched(result) => assert!(tally.finish_refresh(result, at(1))),
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(tally.count(2), 3);
    assert_eq!(tally.total(), 3);
}

#[test]
fn store_failures_arrive_as_errors() {
    let store = Arc::new(FlakyStore::default());
    store.fail_reads.store(true, Ordering::SeqCst);
    store.fail_writes.store(true, Ordering::SeqCst);
    let (_rt, client, rx) = client_with(store.clone(), Duration::from_millis(10));

    client.submit(1);
    assert!(matches!(
        next_event(&rx),
        TallyEvent::Voted { ordinal: 1, result: Err(_) }
    ));

    client.fetch();
    assert!(matches!(next_event(&rx), TallyEvent::Fetched(Err(_))));
}

#[test]
fn poller_ticks_until_cancelled() {
    let store = Arc::new(MemoryVoteStore::new());
    let (_rt, client, rx) = client_with(store, Duration::from_millis(10));

    let poller = client.start_poller(Duration::from_millis(20));
    assert!(matches!(next_event(&rx), TallyEvent::RefreshDue));
    assert!(matches!(next_event(&rx), TallyEvent::RefreshDue));

    poller.cancel();
    // Drain a tick that may have been sent while cancelling.
    while rx.recv_timeout(Duration::from_millis(50)).is_ok() {}
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}
