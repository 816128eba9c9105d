use crate::cache::RandomState;
use crate::{AccessPolicy, LruCache, Result, Stats};
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

/// Thread-safe LRU cache.
///
/// Every operation takes one lock around the whole [`LruCache`], so the index and the recency
/// list are always updated together. Under [`AccessPolicy::RefreshOnPut`] lookups do not change
/// recency and only take the shared lock, which lets readers proceed in parallel.
///
/// Wrap the cache in a [`std::sync::Arc`] to share it between threads. All methods take `&self`.
#[derive(Debug)]
pub struct SyncLruCache<K, V, S = RandomState> {
    inner: RwLock<LruCache<K, V, S>>,
    policy: AccessPolicy,
}

impl<K, V> SyncLruCache<K, V, RandomState>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// The cache uses [`AccessPolicy::RefreshOnPut`], so lookups only take the shared lock.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_policy_and_hasher(capacity, AccessPolicy::default(), Default::default())
    }

    pub fn with_policy(capacity: usize, policy: AccessPolicy) -> Result<Self> {
        Self::with_policy_and_hasher(capacity, policy, Default::default())
    }
}

impl<K, V, S> SyncLruCache<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    /// Creates a cache holding at most `capacity` entries, using `hash_builder` to hash the keys.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Self::with_policy_and_hasher(capacity, AccessPolicy::default(), hash_builder)
    }

    pub fn with_policy_and_hasher(
        capacity: usize,
        policy: AccessPolicy,
        hash_builder: S,
    ) -> Result<Self> {
        let cache = LruCache::with_policy_and_hasher(capacity, policy, hash_builder)?;

        Ok(Self {
            inner: RwLock::new(cache),
            policy,
        })
    }

    /// Inserts or updates a key-value pair and returns the previous value, if any.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.inner.write().put(key, value)
    }

    /// Returns the value corresponding to the key.
    ///
    /// This method clones the value when returning the item. Consider wrapping your values in
    /// [`std::sync::Arc`] if cloning is too expensive for your use case.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.policy {
            AccessPolicy::RefreshOnGet => self.inner.write().get(key).cloned(),
            AccessPolicy::RefreshOnPut => self.inner.read().get_untouched(key).cloned(),
        }
    }

    /// Returns the value without refreshing recency or counting a lookup.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.read().peek(key).cloned()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.read().contains_key(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.write().remove(key)
    }

    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.write().pop_lru()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl<K, V, S> SyncLruCache<K, V, S> {
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn access_policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Returns the counters gathered since the previous call and resets them.
    pub fn stats(&self) -> Stats {
        self.inner.write().take_stats()
    }

    pub fn into_inner(self) -> LruCache<K, V, S> {
        self.inner.into_inner()
    }
}
