//! Sharded in-memory key/value store with per-key atomic updates.
//!
//! Both the slot calendar and the appointment ledger sit on top of this map.
//! Every mutation goes through [`AtomicMap::update`], which runs the caller's
//! closure under the lock of the shard owning the key, so a read-modify-write
//! on one key can never interleave with another writer of the same key.
//! Keys on different shards never contend, which keeps unrelated doctors'
//! bookings from serializing against each other.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use parking_lot::RwLock;

const DEFAULT_SHARDS: usize = 16;

pub struct AtomicMap<K, V> {
    shards: Vec<RwLock<HashMap<K, V>>>,
}

impl<K, V> AtomicMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    fn shard_for(&self, key: &K) -> &RwLock<HashMap<K, V>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        &self.shards[index]
    }

    /// Run `f` against the value stored under `key`, holding only a shard
    /// read lock for the duration of the closure.
    pub fn read<R>(&self, key: &K, f: impl FnOnce(Option<&V>) -> R) -> R {
        let shard = self.shard_for(key).read();
        f(shard.get(key))
    }

    /// Atomically read-modify-write the entry for `key`.
    ///
    /// The closure receives `None` when the key is absent; leaving `Some`
    /// behind stores the value, leaving `None` removes it. The whole exchange
    /// happens under one shard write lock, so concurrent updates of the same
    /// key are linearized and no update is ever lost.
    pub fn update<R>(&self, key: K, f: impl FnOnce(&mut Option<V>) -> R) -> R {
        let mut shard = self.shard_for(&key).write();
        let mut slot = shard.remove(&key);
        let result = f(&mut slot);
        if let Some(value) = slot {
            shard.insert(key, value);
        }
        result
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.shard_for(key).read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> AtomicMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Clone out every entry. Shards are drained one at a time, so the
    /// snapshot is consistent per key but not across keys; listings sort the
    /// result before returning it to callers.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.len());
        for shard in &self.shards {
            let shard = shard.read();
            entries.extend(shard.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        entries
    }
}

impl<K, V> Default for AtomicMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
