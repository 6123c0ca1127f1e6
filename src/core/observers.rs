//! Observer registry - zero-argument callbacks fired after cart mutations.
//!
//! Callbacks carry no payload; observers re-query the cart to learn what changed.
//! Notification snapshots the registered callbacks and calls them outside the lock, in
//! subscription order, so a callback may subscribe or unsubscribe while being notified.
//! A callback unsubscribed during a round is skipped for the rest of that round; one
//! subscribed during a round is first called on the next.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback = Arc<dyn Fn() + Send + Sync>;
type Registry = Mutex<BTreeMap<u64, Callback>>;

fn lock(registry: &Registry) -> MutexGuard<'_, BTreeMap<u64, Callback>> {
    // A panicking observer must not wedge the registry for everyone else.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Set of callbacks notified after every successful cart mutation.
#[derive(Default)]
pub struct CartObservers {
    next_id: AtomicU64,
    callbacks: Arc<Registry>,
}

impl CartObservers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback`. The returned handle removes exactly this callback.
    ///
    /// Dropping the handle leaves the callback registered.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.callbacks).insert(id, Arc::new(callback));
        Subscription {
            id,
            registry: Arc::downgrade(&self.callbacks),
        }
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.callbacks).len()
    }

    /// Whether no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes every registered callback once.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<(u64, Callback)> = lock(&self.callbacks)
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();
        for (id, callback) in snapshot {
            let live = lock(&self.callbacks).contains_key(&id);
            if live {
                callback();
            }
        }
    }
}

impl fmt::Debug for CartObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartObservers")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Deregistration handle returned by [`CartObservers::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Removes the callback. Calling it again, or after the registry is gone, does nothing.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.id);
        }
    }
}
