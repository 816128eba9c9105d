use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the cache counters.
///
/// Only lookups through `get` count as hits or misses. `millis_elapsed` is the time since the
/// counters were last reset (or since the cache was built).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Stats {
    pub miss_count: u64,
    pub hit_count: u64,
    pub eviction_count: u64,
    pub millis_elapsed: u128,
}

impl Stats {
    /// Fraction of lookups that were hits, `0.0` when there were no lookups.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Counters are atomic so that read-only lookups behind a shared lock can still record hits.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    eviction_count: AtomicU64,
}

impl Counters {
    pub(crate) fn hit_count(&self) -> u64 {
        self.hit_count.load(Ordering::Acquire)
    }

    pub(crate) fn miss_count(&self) -> u64 {
        self.miss_count.load(Ordering::Acquire)
    }

    pub(crate) fn eviction_count(&self) -> u64 {
        self.eviction_count.load(Ordering::Acquire)
    }

    pub(crate) fn increment_hit_count(&self) {
        self.hit_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn increment_miss_count(&self) {
        self.miss_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn increment_eviction_count(&self) {
        self.eviction_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn reset(&self) {
        self.hit_count.store(0, Ordering::Release);
        self.miss_count.store(0, Ordering::Release);
        self.eviction_count.store(0, Ordering::Release);
    }
}
