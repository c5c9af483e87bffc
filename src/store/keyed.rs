//! Thread-safe keyed store
//!
//! A small map wrapper shared across request handlers and the reload
//! path. Callers never take a lock themselves; values are cloned out,
//! so `V` is normally an `Arc`.

use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Concurrent map from key to value with whole-table replacement.
///
/// `load` on an absent key returns `None`; callers branch on the
/// option, never on a sentinel value. `count` is a snapshot and makes
/// no promise against concurrent mutation.
#[derive(Debug)]
pub struct KeyedStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite the value under `key`.
    pub fn store(&self, key: K, value: V) {
        self.inner.write().insert(key, value);
    }

    /// Clone out the value under `key`, if present.
    pub fn load<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.read().get(key).cloned()
    }

    /// Remove the value under `key`, if present.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.write().remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Number of entries at the moment the lock was held.
    pub fn count(&self) -> usize {
        self.inner.read().len()
    }

    /// Swap in a complete replacement table under a single write lock.
    ///
    /// Readers observe either the previous table or `next` in full,
    /// never a partially-built mix. This is the reload path; in-place
    /// mutation of a live table is reserved for single-entry updates.
    pub fn replace(&self, next: HashMap<K, V>) {
        *self.inner.write() = next;
    }
}

impl<K, V> Default for KeyedStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn store_load_delete() {
        let store: KeyedStore<String, i32> = KeyedStore::new();
        assert_eq!(store.load("a"), None);

        store.store("a".to_string(), 1);
        store.store("b".to_string(), 2);
        assert_eq!(store.load("a"), Some(1));
        assert_eq!(store.count(), 2);

        store.store("a".to_string(), 3);
        assert_eq!(store.load("a"), Some(3));

        store.delete("a");
        assert_eq!(store.load("a"), None);
        assert_eq!(store.count(), 1);

        store.clear();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn concurrent_mixed_access() {
        let store: Arc<KeyedStore<String, usize>> = Arc::new(KeyedStore::new());

        std::thread::scope(|s| {
            for t in 0..8 {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    for i in 0..200 {
                        let key = format!("k{}", i % 16);
                        store.store(key.clone(), t * 1000 + i);
                        let _ = store.load(key.as_str());
                        let _ = store.count();
                    }
                });
            }
        });

        assert_eq!(store.count(), 16);
    }

    /// A reader racing `replace` must only ever see a complete
    /// generation: the table always holds exactly N entries.
    #[test]
    fn replace_is_observed_wholesale() {
        const N: usize = 32;
        let store: Arc<KeyedStore<String, u64>> = Arc::new(KeyedStore::new());

        let generation = |gen: u64| -> HashMap<String, u64> {
            (0..N).map(|i| (format!("k{i}"), gen)).collect()
        };
        store.replace(generation(0));

        std::thread::scope(|s| {
            let writer = Arc::clone(&store);
            s.spawn(move || {
                for gen in 1..500u64 {
                    writer.replace(generation(gen));
                }
            });

            for _ in 0..4 {
                let reader = Arc::clone(&store);
                s.spawn(move || {
                    for _ in 0..2000 {
                        assert_eq!(reader.count(), N);
                        // Every key of the current generation resolves.
                        assert!(reader.load("k0").is_some());
                    }
                });
            }
        });
    }
}
