//! Live-query plumbing: snapshot callbacks keyed by query, with explicit
//! per-registration lifecycle instead of ambient singleton state.

use std::sync::{Arc, Mutex, Weak};

/// Callback invoked with a full snapshot of the watched result set.
pub type SnapshotFn<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;

/// Registered callbacks for one document collection, keyed by query scope
/// (family id for periods, period id for categories).
pub struct Watchers<K, T> {
    next_id: u64,
    entries: Vec<(u64, K, SnapshotFn<T>)>,
}

impl<K, T> Default for Watchers<K, T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, T> Watchers<K, T> {
    pub fn register(&mut self, key: K, callback: SnapshotFn<T>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, key, callback));
        id
    }

    pub fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _, _)| *entry_id != id);
    }

    /// Callbacks matching `key`, cloned out so the caller can invoke them
    /// without holding the registry lock.
    pub fn matching(&self, key: &K) -> Vec<SnapshotFn<T>> {
        self.entries
            .iter()
            .filter(|(_, entry_key, _)| entry_key == key)
            .map(|(_, _, callback)| Arc::clone(callback))
            .collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Handle owning one live-query registration.
///
/// The consuming view is responsible for tearing this down: call
/// [`Subscription::unsubscribe`] (or drop the handle) to stop snapshot
/// delivery and release the stream.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub(crate) fn for_watchers<K, T>(registry: &Arc<Mutex<Watchers<K, T>>>, id: u64) -> Self
    where
        K: PartialEq + Send + 'static,
        T: Send + 'static,
    {
        let weak: Weak<Mutex<Watchers<K, T>>> = Arc::downgrade(registry);
        Self::new(move || {
            if let Some(registry) = weak.upgrade() {
                if let Ok(mut watchers) = registry.lock() {
                    watchers.remove(id);
                }
            }
        })
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
