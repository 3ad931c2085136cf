use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use leadsync_core::models::Connectivity;

/// Process-wide session context: the connectivity flag, observable through a
/// watch channel, and the re-entrancy gate for sync cycles.
///
/// Connectivity transitions come from an external network-status signal; the
/// sync engine and the client only observe them. The syncing flag ensures at
/// most one drain/refresh cycle is in flight; while it is held the embedding
/// UI is expected to block mutating interactions.
pub struct Session {
    connectivity: watch::Sender<Connectivity>,
    syncing: AtomicBool,
}

impl Session {
    pub fn new(initial: Connectivity) -> Self {
        let (connectivity, _) = watch::channel(initial);
        Self {
            connectivity,
            syncing: AtomicBool::new(false),
        }
    }

    pub fn connectivity(&self) -> Connectivity {
        *self.connectivity.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.connectivity().is_online()
    }

    /// Record a connectivity transition and notify subscribers. Returns the
    /// previous value; setting the current value again notifies nobody.
    pub fn set_connectivity(&self, connectivity: Connectivity) -> Connectivity {
        let mut previous = connectivity;
        self.connectivity.send_if_modified(|current| {
            previous = *current;
            if *current == connectivity {
                false
            } else {
                *current = connectivity;
                true
            }
        });
        previous
    }

    /// Subscribe to connectivity transitions.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.connectivity.subscribe()
    }

    /// Claim the sync gate. Returns false when a cycle is already in flight.
    pub fn try_begin_sync(&self) -> bool {
        self.syncing
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    pub fn end_sync(&self) {
        self.syncing.store(false, Ordering::Relaxed);
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Relaxed)
    }
}
