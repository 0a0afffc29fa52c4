//! Keyed state shared between command invocations
//!
//! Handlers receive a store instead of reaching for process-wide variables.
//! The only implementation is in memory; nothing here touches disk.

use std::hash::Hash;

use dashmap::{DashMap, mapref::entry::Entry};

/// Narrow key-value interface for cross-command state.
pub trait StateStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    /// Insert or replace, returning the previous value.
    fn put(&self, key: K, value: V) -> Option<V>;

    /// Remove, returning the value that was there.
    fn delete(&self, key: &K) -> Option<V>;

    /// Insert `value` when `key` is vacant or `replace` accepts the current
    /// value, as one atomic step. A refused insert returns the current value.
    fn put_if(
        &self,
        key: K,
        value: V,
        replace: &(dyn Fn(&V) -> bool + Send + Sync),
    ) -> std::result::Result<(), V>;

    /// Drop every entry `keep` rejects.
    fn retain(&self, keep: &(dyn Fn(&K, &V) -> bool + Send + Sync));

    /// Snapshot of every entry, in no particular order.
    fn entries(&self) -> Vec<(K, V)>;
}

/// Concurrent in-memory [`StateStore`].
#[derive(Debug)]
pub struct MemoryStore<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, V>,
}

impl<K, V> Default for MemoryStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> MemoryStore<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> StateStore<K, V> for MemoryStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    fn delete(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    fn put_if(
        &self,
        key: K,
        value: V,
        replace: &(dyn Fn(&V) -> bool + Send + Sync),
    ) -> std::result::Result<(), V> {
        // The entry guard holds the shard lock until the insert is done
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                if replace(entry.get()) {
                    entry.insert(value);
                    Ok(())
                } else {
                    Err(entry.get().clone())
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    fn retain(&self, keep: &(dyn Fn(&K, &V) -> bool + Send + Sync)) {
        self.entries.retain(|key, value| keep(key, value));
    }

    fn entries(&self) -> Vec<(K, V)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
