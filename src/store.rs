//! Entry store subscription
//!
//! The document store pushes the user's full entry list whenever it changes.
//! `EntryStore` models that contract; `MemoryStore` is an in-process
//! implementation used by the CLI streaming mode and in tests.

use crate::types::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked with a full snapshot of the user's entries
pub type Listener = Box<dyn Fn(&[Entry]) + Send + Sync>;

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Source of entry snapshots with push notifications
pub trait EntryStore {
    /// Current entries
    fn snapshot(&self) -> Vec<Entry>;

    /// Register a listener. It is called once with the current snapshot and
    /// then once per change, always with the full list, in commit order.
    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    /// Remove a listener; returns false if it was not registered
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// In-memory entry store
///
/// Listeners may read the store and unsubscribe, but must not write to it:
/// deliveries are serialized and a nested write would wait on itself.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
    listeners: Mutex<Vec<(SubscriptionId, Arc<dyn Fn(&[Entry]) + Send + Sync>)>>,
    // Held while a snapshot is taken and delivered, so deliveries never
    // overtake each other.
    delivery: Mutex<()>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole collection
    pub fn replace(&self, entries: Vec<Entry>) {
        *lock(&self.entries) = entries;
        self.notify();
    }

    /// Insert an entry, replacing any entry with the same id
    pub fn insert(&self, entry: Entry) {
        {
            let mut entries = lock(&self.entries);
            match entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
        self.notify();
    }

    /// Remove the entry with `id`; returns false if there was none
    pub fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut entries = lock(&self.entries);
            let before = entries.len();
            entries.retain(|e| e.id != id);
            entries.len() != before
        };
        if removed {
            self.notify();
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    // Listeners run outside the entry and listener locks so they may read
    // the store again.
    fn notify(&self) {
        let _delivery = lock(&self.delivery);
        let snapshot = self.snapshot();
        let listeners: Vec<_> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        log::debug!(
            "Notifying {} listener(s) of {} entries",
            listeners.len(),
            snapshot.len()
        );
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl EntryStore for MemoryStore {
    fn snapshot(&self) -> Vec<Entry> {
        lock(&self.entries).clone()
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Arc<dyn Fn(&[Entry]) + Send + Sync> = Arc::from(listener);
        let _delivery = lock(&self.delivery);
        lock(&self.listeners).push((id, Arc::clone(&listener)));
        listener(&self.snapshot());
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}
