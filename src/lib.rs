//! A fixed-capacity key-value cache with least-recently-used eviction.
//!
//! Lookup, insertion, update, removal and eviction all run in amortized O(1). The cache pairs a
//! hash index with a doubly-linked recency list. The list's nodes live in an arena and are
//! addressed by generational handles, so the index can point into the list without sharing
//! ownership of its nodes.
//!
//! # Features
//!
//! - Strict LRU eviction, ordered by the linked list rather than by timestamps
//! - A single [`AccessPolicy`] flag that decides whether `get` refreshes recency (by default it
//!   does not; only `put` counts as a use)
//! - Hit, miss and eviction counters via [`Stats`]
//! - [`SyncLruCache`] for sharing one cache between threads
//! - No unsafe code
//!
//! # Examples
//!
//! Basic usage:
//!
//! ```rust
//! use arena_lru::LruCache;
//!
//! let mut cache = LruCache::new(2).unwrap();
//!
//! cache.put("key1", "value1");
//! cache.put("key2", "value2");
//! assert_eq!(cache.get("key1"), Some(&"value1"));
//!
//! // Lookups do not count as a use, so "key1" is still the oldest entry and gets evicted.
//! cache.put("key3", "value3");
//! assert!(!cache.contains_key("key1"));
//! assert!(cache.contains_key("key2"));
//! assert_eq!(cache.len(), 2);
//! ```
//!
//! A zero capacity is rejected:
//!
//! ```rust
//! use arena_lru::{Error, LruCache};
//!
//! let result = LruCache::<u32, u32>::new(0);
//! assert!(matches!(result, Err(Error::InvalidArgument(_))));
//! ```
//!
//! Letting `get` refresh recency too:
//!
//! ```rust
//! use arena_lru::{AccessPolicy, LruCache};
//!
//! let mut cache = LruCache::with_policy(2, AccessPolicy::RefreshOnGet).unwrap();
//! cache.put(1, "one");
//! cache.put(2, "two");
//! cache.get(&1);
//!
//! // The lookup counted as a use, so key 2 is now the eviction candidate.
//! cache.put(3, "three");
//! assert!(cache.contains_key(&1));
//! assert!(!cache.contains_key(&2));
//! ```
//!
//! Thread-safe usage across multiple threads:
//!
//! ```rust
//! use arena_lru::SyncLruCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(SyncLruCache::new(100).unwrap());
//! cache.put("key1", "value1");
//!
//! let cache_in_arc = Arc::clone(&cache);
//! let handle = thread::spawn(move || {
//!     cache_in_arc.put("key2", "value2");
//! });
//!
//! handle.join().unwrap();
//!
//! assert_eq!(cache.get("key1"), Some("value1"));
//! assert_eq!(cache.get("key2"), Some("value2"));
//! ```

#![forbid(unsafe_code)]
pub mod cache;
mod error;
mod sync;

pub use cache::stats::Stats;
pub use cache::{AccessPolicy, Iter, LruCache};
pub use error::{Error, Result};
pub use sync::SyncLruCache;
