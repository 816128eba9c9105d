use crate::Stats;
use crate::error::{Error, Result};
use index::Index;
use recency_list::RecencyList;
use stats::Counters;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::time::Instant;
use tracing::{debug, trace, warn};

mod index;
mod node;
mod recency_list;
pub(crate) mod stats;

pub use recency_list::Iter;

pub(crate) type RandomState = ahash::RandomState;

/// Decides which operations count as a "use" of an entry.
///
/// `put` always moves the written entry to the most recently used position. The policy only
/// changes what `get` does.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum AccessPolicy {
    /// `get` moves a hit to the most recently used position.
    RefreshOnGet,
    /// `get` is a pure read. Only `put` refreshes recency.
    #[default]
    RefreshOnPut,
}

/// Fixed-capacity key-value cache with least-recently-used eviction.
///
/// A hash index maps each key to a handle into an arena-backed doubly-linked recency list, so
/// lookup, insertion, update, removal and eviction are all O(1). The cache is the single owner
/// of every entry; the index only holds handles.
///
/// The cache is not synchronized. Wrap it in a lock, or use
/// [`SyncLruCache`](crate::SyncLruCache), to share it between threads.
#[derive(Debug)]
pub struct LruCache<K, V, S = RandomState> {
    index: Index<K, S>,
    list: RecencyList<K, V>,
    capacity: usize,
    policy: AccessPolicy,
    counters: Counters,
    counters_reset_at: Instant,
}

impl<K, V> LruCache<K, V, RandomState>
where
    K: Eq + Hash,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// The cache uses [`AccessPolicy::RefreshOnPut`], so only `put` refreshes recency. Returns
    /// [`Error::InvalidArgument`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_policy_and_hasher(capacity, AccessPolicy::default(), Default::default())
    }

    /// Creates a cache holding at most `capacity` entries with the given access policy.
    pub fn with_policy(capacity: usize, policy: AccessPolicy) -> Result<Self> {
        Self::with_policy_and_hasher(capacity, policy, Default::default())
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash,
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
        if capacity == 0 {
            warn!("rejecting LRU cache with zero capacity");
            return Err(Error::InvalidArgument(String::from(
                "capacity must be greater than 0",
            )));
        }

        debug!(capacity, ?policy, "creating LRU cache");

        Ok(Self {
            index: Index::with_capacity_and_hasher(capacity, hash_builder),
            list: RecencyList::with_capacity(capacity),
            capacity,
            policy,
            counters: Counters::default(),
            counters_reset_at: Instant::now(),
        })
    }
}

impl<K, V, S> LruCache<K, V, S> {
    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn access_policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Iterates over the entries from least to most recently used. Does not refresh recency.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.list.iter()
    }

    /// Iterates over the keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|(key, _)| key)
    }

    /// Returns the least recently used entry, the next one to be evicted.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let handle = self.list.head()?;
        self.list.get(handle).map(|node| (node.key(), node.value()))
    }

    /// Returns the counters accumulated since the last reset.
    pub fn stats(&self) -> Stats {
        Stats {
            miss_count: self.counters.miss_count(),
            hit_count: self.counters.hit_count(),
            eviction_count: self.counters.eviction_count(),
            millis_elapsed: self.counters_reset_at.elapsed().as_millis(),
        }
    }

    pub fn reset_stats(&mut self) {
        self.counters.reset();
        self.counters_reset_at = Instant::now();
    }

    /// Returns the current counters and resets them.
    pub fn take_stats(&mut self) -> Stats {
        let stats = self.stats();
        self.reset_stats();
        stats
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns `true` if the cache holds `key`. Does not count as a use of the entry.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.lookup(key).is_some()
    }

    /// Returns the value for `key` without refreshing recency and without touching the stats.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.index.lookup(key)?;
        self.list.get(handle).map(|node| node.value())
    }

    /// Returns the value for `key`.
    ///
    /// Under [`AccessPolicy::RefreshOnGet`] a hit becomes the most recently used entry. Under
    /// [`AccessPolicy::RefreshOnPut`] the recency order is left alone.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.policy == AccessPolicy::RefreshOnPut {
            return self.get_untouched(key);
        }

        let Some(handle) = self.index.lookup(key) else {
            self.counters.increment_miss_count();
            return None;
        };

        self.counters.increment_hit_count();
        self.list.touch(handle);
        debug_assert_eq!(self.list.tail(), Some(handle));

        #[cfg(debug_assertions)]
        self.check_consistency();

        self.list.get(handle).map(|node| node.value())
    }

    /// Counted lookup that leaves recency alone. Lets shared-lock readers record hits.
    pub(crate) fn get_untouched<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.peek(key) {
            Some(value) => {
                self.counters.increment_hit_count();
                Some(value)
            }
            None => {
                self.counters.increment_miss_count();
                None
            }
        }
    }

    /// Removes `key` and returns its value, if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.index.remove(key)?;
        let (_, value) = self.list.unlink(handle);

        #[cfg(debug_assertions)]
        self.check_consistency();

        Some(value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.remove_head().ok()?;
        self.index.remove(&key);

        #[cfg(debug_assertions)]
        self.check_consistency();

        Some((key, value))
    }

    /// Removes every entry. The stats are kept.
    pub fn clear(&mut self) {
        let dropped = self.list.len();

        self.index.clear();
        self.list.clear();
        debug!(dropped, "cleared LRU cache");

        #[cfg(debug_assertions)]
        self.check_consistency();
    }

    fn evict_lru(&mut self) {
        let (key, _) = self
            .list
            .remove_head()
            .expect("a full cache must have a least recently used entry");

        self.index.remove(&key);
        self.counters.increment_eviction_count();
        trace!(capacity = self.capacity, "evicted least recently used entry");
    }

    /// Constant-time agreement check between the index and the recency list.
    #[cfg(any(test, debug_assertions))]
    fn check_consistency(&self) {
        self.list.check_endpoints();

        assert_eq!(
            self.index.len(),
            self.list.len(),
            "index and recency list sizes diverged"
        );
        assert_eq!(self.index.is_empty(), self.list.is_empty());
        assert!(
            self.list.len() <= self.capacity,
            "cache holds more entries than its capacity"
        );
    }

    /// Checks that the index and the recency list agree entry for entry. Walks both.
    #[cfg(test)]
    fn validate_invariants(&self) {
        self.check_consistency();
        self.list.validate_invariants();

        for (key, handle) in self.index.iter() {
            assert!(self.list.contains(handle), "index holds a stale handle");
            let node = self
                .list
                .get(handle)
                .expect("every indexed handle must resolve to a linked node");
            assert!(
                node.key() == key,
                "indexed handle points at a node with a different key"
            );
        }
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher,
{
    /// Inserts or updates `key` and makes it the most recently used entry.
    ///
    /// A new key arriving at a full cache first evicts the least recently used entry. If the key
    /// was already present its value is replaced in place and the old value is returned.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(handle) = self.index.lookup(&key) {
            let previous = self
                .list
                .get_mut(handle)
                .expect("every indexed handle must resolve to a linked node")
                .replace_value(value);
            self.list.touch(handle);
            debug_assert_eq!(self.list.tail(), Some(handle));

            #[cfg(debug_assertions)]
            self.check_consistency();

            return Some(previous);
        }

        if self.list.len() == self.capacity {
            self.evict_lru();
        }

        let handle = self.list.append_tail(key.clone(), value);
        self.index.insert(key, handle);
        debug_assert_eq!(self.list.tail(), Some(handle));

        #[cfg(debug_assertions)]
        self.check_consistency();

        None
    }
}

impl<'a, K, V, S> IntoIterator for &'a LruCache<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_of_three() -> LruCache<i32, i32> {
        LruCache::new(3).unwrap()
    }

    fn keys(cache: &LruCache<i32, i32>) -> Vec<i32> {
        cache.keys().copied().collect()
    }

    #[test]
    fn it_starts_empty() {
        // when
        let cache = cache_of_three();

        // then
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.capacity(), 3);
        assert_eq!(cache.access_policy(), AccessPolicy::RefreshOnPut);
    }

    #[test]
    fn it_rejects_zero_capacity() {
        // when
        let result: Result<LruCache<i32, i32>> = LruCache::new(0);

        // then
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn it_puts_and_gets_basic_values() {
        // given
        let mut cache = cache_of_three();

        // when
        cache.put(1, 4);
        cache.put(2, 5);
        cache.put(3, 6);

        // then
        assert!(!cache.is_empty());
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&1), Some(&4));
        assert_eq!(cache.get(&2), Some(&5));
        assert_eq!(cache.get(&3), Some(&6));
        assert_eq!(cache.get(&4), None);
    }

    #[test]
    fn it_works_with_borrowed_keys() {
        // given
        let mut cache: LruCache<String, i32> = LruCache::new(2).unwrap();
        cache.put(String::from("key1"), 1);

        // then
        assert!(cache.contains_key("key1"));
        assert_eq!(cache.get("key1"), Some(&1));
        assert_eq!(cache.remove("key1"), Some(1));
    }

    #[test]
    fn it_evicts_the_least_recently_used_entry() {
        // given
        let mut cache = cache_of_three();

        // when
        cache.put(1, 5);
        cache.put(2, 6);
        cache.put(3, 7);
        cache.put(4, 8);

        // then
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_key(&1));
        assert!(cache.contains_key(&2));
        assert!(cache.contains_key(&3));
        assert!(cache.contains_key(&4));

        // when
        cache.put(1, 5);

        // then
        assert_eq!(cache.len(), 3);
        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
    }

    #[test]
    fn it_evicts_only_the_first_of_capacity_plus_one_keys() {
        // given
        let mut cache = cache_of_three();

        // when
        for key in 0..4 {
            cache.put(key, key);
        }

        // then
        assert!(!cache.contains_key(&0));
        assert_eq!(keys(&cache), vec![1, 2, 3]);
    }

    #[test]
    fn it_keeps_the_last_three_of_ten_keys() {
        // given
        let mut cache = cache_of_three();

        // when
        for key in 0..10 {
            cache.put(key, key);
        }

        // then
        assert_eq!(keys(&cache), vec![7, 8, 9]);
        assert_eq!(cache.stats().eviction_count, 7);
    }

    #[test]
    fn it_updates_existing_values_in_place() {
        // given
        let mut cache = cache_of_three();
        cache.put(1, 5);
        cache.put(2, 6);
        cache.put(3, 7);

        // when
        let previous = cache.put(1, 8);

        // then
        assert_eq!(previous, Some(5));
        assert_eq!(cache.len(), 3);
        assert!(cache.contains_key(&1));
        assert!(cache.contains_key(&2));
        assert!(cache.contains_key(&3));
        assert_eq!(cache.get(&1), Some(&8));
        assert_eq!(cache.stats().eviction_count, 0);
    }

    #[test]
    fn it_refreshes_recency_on_update() {
        // given
        let mut cache = cache_of_three();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        // when
        cache.put(1, 10);
        cache.put(4, 4);

        // then
        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
        assert_eq!(keys(&cache), vec![3, 1, 4]);
    }

    #[test]
    fn it_refreshes_recency_on_get_when_configured() {
        // given
        let mut cache = LruCache::with_policy(3, AccessPolicy::RefreshOnGet).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        // when
        cache.get(&1);
        cache.put(4, 4);

        // then
        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
    }

    #[test]
    fn it_does_not_refresh_recency_on_get_by_default() {
        // given
        let mut cache = cache_of_three();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        // when
        assert_eq!(cache.get(&1), Some(&1));
        cache.put(4, 4);

        // then
        assert!(!cache.contains_key(&1));
        assert!(cache.contains_key(&2));
        assert_eq!(cache.stats().hit_count, 1);
    }

    #[test]
    fn it_does_not_refresh_recency_on_contains_key_or_peek() {
        // given
        let mut cache = cache_of_three();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        // when
        assert!(cache.contains_key(&1));
        assert_eq!(cache.peek(&1), Some(&1));
        cache.put(4, 4);

        // then
        assert!(!cache.contains_key(&1));
        assert_eq!(cache.stats().hit_count, 0);
    }

    #[test]
    fn it_respects_capacity_after_every_put() {
        // given
        let mut cache = cache_of_three();

        for i in 0..100 {
            // when
            cache.put((i * 7) % 13, i);

            // then
            assert!(cache.len() <= cache.capacity());
        }
    }

    #[test]
    fn it_removes_entries() {
        // given
        let mut cache = cache_of_three();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        // when
        let removed = cache.remove(&2);

        // then
        assert_eq!(removed, Some(2));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains_key(&2));
        assert_eq!(cache.remove(&2), None);
        assert_eq!(keys(&cache), vec![1, 3]);
    }

    #[test]
    fn it_reuses_space_freed_by_remove() {
        // given
        let mut cache = cache_of_three();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        cache.remove(&1);

        // when
        cache.put(4, 4);

        // then
        assert_eq!(keys(&cache), vec![2, 3, 4]);
        assert_eq!(cache.stats().eviction_count, 0);
    }

    #[test]
    fn it_pops_the_least_recently_used_entry() {
        // given
        let mut cache = cache_of_three();
        cache.put(1, 10);
        cache.put(2, 20);

        // when
        let popped = cache.pop_lru();

        // then
        assert_eq!(popped, Some((1, 10)));
        assert_eq!(cache.peek_lru(), Some((&2, &20)));
        assert_eq!(cache.pop_lru(), Some((2, 20)));
        assert_eq!(cache.pop_lru(), None);
        assert!(cache.peek_lru().is_none());
    }

    #[test]
    fn it_clears_fully() {
        // given
        let mut cache = cache_of_three();
        for key in 0..5 {
            cache.put(key, key);
        }

        // when
        cache.clear();

        // then
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.iter().count(), 0);

        cache.put(0, 42);
        assert_eq!(cache.get(&0), Some(&42));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn it_handles_one_capacity() {
        // given
        let mut cache = LruCache::new(1).unwrap();

        // when
        cache.put("key1", "value1");
        cache.put("key2", "value2");

        // then
        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.get("key2"), Some(&"value2"));

        // when
        cache.put("key2", "value3");

        // then
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("key2"), Some(&"value3"));
    }

    #[test]
    fn it_works_with_custom_hasher() {
        // given
        use std::collections::hash_map::RandomState;
        let mut cache = LruCache::with_hasher(100, RandomState::new()).unwrap();

        // when
        cache.put("key1", "value1");

        // then
        assert_eq!(cache.get("key1"), Some(&"value1"));
    }

    #[test]
    fn it_iterates_from_least_to_most_recently_used() {
        // given
        let mut cache = LruCache::with_policy(3, AccessPolicy::RefreshOnGet).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);
        cache.get(&2);

        // when
        let entries: Vec<(i32, i32)> = (&cache).into_iter().map(|(k, v)| (*k, *v)).collect();

        // then
        assert_eq!(entries, vec![(1, 10), (3, 30), (2, 20)]);
    }

    #[test]
    fn it_counts_hits_misses_and_evictions() {
        // given
        let mut cache = cache_of_three();
        for key in 0..5 {
            cache.put(key, key);
        }

        // when
        cache.get(&4);
        cache.get(&3);
        cache.get(&0);

        // then
        let stats = cache.take_stats();
        assert_eq!(stats.hit_count, 2);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.eviction_count, 2);

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.eviction_count, 0);
    }

    #[test]
    fn it_keeps_index_and_list_consistent_through_mixed_operations() {
        // given
        let mut cache = LruCache::new(4).unwrap();

        // when
        for i in 0..200 {
            let key = (i * 31) % 11;
            match i % 5 {
                0 | 1 => {
                    cache.put(key, i);
                }
                2 => {
                    cache.get(&key);
                }
                3 => {
                    cache.remove(&key);
                }
                _ => {
                    if i % 40 == 4 {
                        cache.clear();
                    } else {
                        cache.pop_lru();
                    }
                }
            }

            // then
            cache.validate_invariants();
        }
    }

    #[test]
    #[should_panic(expected = "index and recency list sizes diverged")]
    fn it_detects_an_index_that_diverged_from_the_list() {
        // given
        let mut cache = cache_of_three();
        cache.put(1, 1);
        cache.put(2, 2);

        // when
        cache.index.remove(&1);

        // then
        cache.check_consistency();
    }

    #[test]
    fn it_stays_consistent_across_a_large_workload() {
        // given
        let mut cache = LruCache::with_policy(100_000, AccessPolicy::RefreshOnGet).unwrap();

        // when
        for key in 0..200_000u32 {
            cache.put(key, key);
            cache.get(&(key / 2));
        }

        // then
        assert_eq!(cache.len(), 100_000);
        cache.validate_invariants();
    }
}
