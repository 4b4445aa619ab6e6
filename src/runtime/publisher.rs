//! Snapshot publication to consumers.
//!
//! Consumers either register a listener or hold a [`watch::Receiver`]; both
//! see every published [`Snapshot`] as an `Arc` that is never mutated after
//! publication. A failed refresh flips the success flag but keeps the last
//! good snapshot readable.
//!
//! Listeners are called after the snapshot is swapped in and with no lock
//! held, so they may freely read the publisher or its owner.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::trace;

use crate::domain::Snapshot;

/// Handle returned by [`SnapshotPublisher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Arc<Snapshot>) + Send + Sync>;

/// Publish-by-replacement holder for the current snapshot.
pub struct SnapshotPublisher {
    current: watch::Sender<Option<Arc<Snapshot>>>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    /// Sequence of the snapshot currently held in `current`.
    published_sequence: Mutex<u64>,
    last_update_success: AtomicBool,
    last_published_at: RwLock<Option<DateTime<Utc>>>,
}

impl SnapshotPublisher {
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            published_sequence: Mutex::new(0),
            last_update_success: AtomicBool::new(false),
            last_published_at: RwLock::new(None),
        }
    }

    /// Register a "snapshot changed" listener.
    ///
    /// Listeners run synchronously on the publishing task, so they should
    /// be quick.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Arc<Snapshot>) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.current.subscribe()
    }

    /// The latest snapshot, if any refresh has succeeded yet.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn last_published_at(&self) -> Option<DateTime<Utc>> {
        *self.last_published_at.read()
    }

    /// Replace the current snapshot and notify listeners.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        {
            let mut published = self.published_sequence.lock();
            *published += 1;
            self.swap_in(Arc::clone(&snapshot));
        }
        self.notify(&snapshot);
        snapshot
    }

    /// Replace the current snapshot unless a later one is already current.
    ///
    /// Producers number their snapshots while building them; a snapshot
    /// that loses the race to a higher number is dropped. Returns whether
    /// `snapshot` was published.
    pub fn publish_sequenced(&self, sequence: u64, snapshot: Arc<Snapshot>) -> bool {
        {
            let mut published = self.published_sequence.lock();
            if sequence <= *published {
                trace!(sequence, current = *published, "Dropping superseded snapshot");
                return false;
            }
            *published = sequence;
            self.swap_in(Arc::clone(&snapshot));
        }
        self.notify(&snapshot);
        true
    }

    fn swap_in(&self, snapshot: Arc<Snapshot>) {
        self.current.send_replace(Some(snapshot));
        self.last_update_success.store(true, Ordering::SeqCst);
        *self.last_published_at.write() = Some(Utc::now());
    }

    fn notify(&self, snapshot: &Arc<Snapshot>) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        trace!(listeners = listeners.len(), "Publishing snapshot");
        for listener in listeners {
            listener(snapshot);
        }
    }

    /// Record a failed refresh. The previous snapshot stays current.
    pub fn mark_failed(&self) {
        self.last_update_success.store(false, Ordering::SeqCst);
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}
