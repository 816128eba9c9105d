use crate::cache::RandomState;
use crate::cache::node::Handle;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Maps keys to the handles of their nodes in the recency list. The index never owns a node.
#[derive(Debug)]
pub(crate) struct Index<K, S = RandomState> {
    handles: HashMap<K, Handle, S>,
}

impl<K, S> Index<K, S> {
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.handles.clear();
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, Handle)> {
        self.handles.iter().map(|(key, handle)| (key, *handle))
    }
}

impl<K, S> Index<K, S>
where
    S: BuildHasher,
{
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            handles: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }
}

impl<K, S> Index<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn lookup<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.handles.get(key).copied()
    }

    /// Registers `handle` for `key`, silently replacing any previous handle.
    pub(crate) fn insert(&mut self, key: K, handle: Handle) {
        self.handles.insert(key, handle);
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.handles.remove(key)
    }
}
