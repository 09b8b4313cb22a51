use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use log::{debug, info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};

use crate::library::TrackOrdinal;

use super::model::VoteRecord;
use super::store::{StoreError, VoteStore};

/// Results of store calls, delivered to the UI thread.
#[derive(Debug)]
pub enum TallyEvent {
    /// A refresh should start (periodic tick or deferred reconciliation).
    RefreshDue,
    /// A `select_all` finished.
    Fetched(Result<Vec<VoteRecord>, StoreError>),
    /// An `insert` for `ordinal` finished.
    Voted {
        ordinal: TrackOrdinal,
        result: Result<(), StoreError>,
    },
}

/// Runs vote store calls on the tokio runtime and posts the outcome back as
/// [`TallyEvent`]s. The client never touches the tally itself.
#[derive(Clone)]
pub struct VoteClient {
    store: Arc<dyn VoteStore>,
    runtime: Handle,
    events: Sender<TallyEvent>,
    reconcile_delay: Duration,
}

impl VoteClient {
    pub fn new(
        store: Arc<dyn VoteStore>,
        runtime: Handle,
        events: Sender<TallyEvent>,
        reconcile_delay: Duration,
    ) -> Self {
        Self {
            store,
            runtime,
            events,
            reconcile_delay,
        }
    }

    /// Request every vote record. Answers with [`TallyEvent::Fetched`].
    pub fn fetch(&self) {
        let store = Arc::clone(&self.store);
        let tx = self.events.clone();
        self.runtime.spawn(async move {
            let result = store.select_all().await;
            let _ = tx.send(TallyEvent::Fetched(result));
        });
    }

    /// Insert one vote for `ordinal`. Answers with [`TallyEvent::Voted`].
    pub fn submit(&self, ordinal: TrackOrdinal) {
        let store = Arc::clone(&self.store);
        let tx = self.events.clone();
        self.runtime.spawn(async move {
            let result = store.insert(VoteRecord::for_track(ordinal)).await;
            let _ = tx.send(TallyEvent::Voted { ordinal, result });
        });
    }

    /// Post [`TallyEvent::RefreshDue`] once the reconciliation delay has passed.
    pub fn schedule_refresh(&self) {
        let tx = self.events.clone();
        let delay = self.reconcile_delay;
        debug!("Reconciling tally in {:?}", delay);
        self.runtime.spawn(async move {
            sleep(delay).await;
            let _ = tx.send(TallyEvent::RefreshDue);
        });
    }

    /// Post [`TallyEvent::RefreshDue`] every `every`, starting one period from now.
    pub fn start_poller(&self, every: Duration) -> Poller {
        let tx = self.events.clone();
        info!("Refreshing tally every {:?}", every);
        let task = self.runtime.spawn(async move {
            let mut ticks = interval_at(Instant::now() + every, every);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(TallyEvent::RefreshDue).is_err() {
                    break;
                }
            }
        });
        Poller { task }
    }
}

/// Handle to the periodic refresh task. Dropping it cancels the timer.
pub struct Poller {
    task: JoinHandle<()>,
}

impl Poller {
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
