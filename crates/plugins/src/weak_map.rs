//! Identity-keyed map with weak keys.
//!
//! Keys are `Arc`s compared by allocation address. The map only keeps a
//! `Weak` to each key, so an entry never keeps its key alive; entries whose
//! key has been dropped are swept once the map grows past a watermark.
//!
//! A stored `Weak` pins the key's allocation, so an address cannot be handed
//! to a new `Arc` while its entry is still in the map.

use std::sync::{
    Arc, Weak,
    atomic::{AtomicUsize, Ordering},
};

use dashmap::DashMap;

/// Smallest map size that triggers a sweep.
const MIN_SWEEP_AT: usize = 64;

struct Entry<K: ?Sized, V> {
    key: Weak<K>,
    value: V,
}

pub struct WeakKeyMap<K: ?Sized, V> {
    entries: DashMap<usize, Entry<K, V>>,
    sweep_at: AtomicUsize,
}

fn addr<K: ?Sized>(key: &Arc<K>) -> usize {
    Arc::as_ptr(key).cast::<()>() as usize
}

impl<K: ?Sized, V: Clone> Default for WeakKeyMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized, V: Clone> WeakKeyMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            sweep_at: AtomicUsize::new(MIN_SWEEP_AT),
        }
    }

    /// Associate `value` with `key`, replacing any previous value.
    pub fn insert(&self, key: &Arc<K>, value: V) {
        self.entries.insert(addr(key), Entry {
            key: Arc::downgrade(key),
            value,
        });
        if self.entries.len() >= self.sweep_at.load(Ordering::Relaxed) {
            self.purge();
            let next = (self.entries.len() * 2).max(MIN_SWEEP_AT);
            self.sweep_at.store(next, Ordering::Relaxed);
        }
    }

    pub fn get(&self, key: &Arc<K>) -> Option<V> {
        let entry = self.entries.get(&addr(key))?;
        (entry.key.strong_count() > 0).then(|| entry.value.clone())
    }

    pub fn remove(&self, key: &Arc<K>) -> Option<V> {
        self.entries.remove(&addr(key)).map(|(_, entry)| entry.value)
    }

    /// Entries currently stored, including ones whose key is already gone.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry whose key is gone. Returns how many were removed.
    pub fn purge(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.key.strong_count() > 0);
        before.saturating_sub(self.entries.len())
    }
}
