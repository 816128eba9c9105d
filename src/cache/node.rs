/// Identifies a node inside a [`RecencyList`](crate::cache::recency_list::RecencyList).
///
/// A handle is the arena slot index plus the generation the slot had when the node was
/// allocated. Freeing a slot bumps its generation, so a handle that outlives its node no
/// longer resolves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Handle {
    index: usize,
    generation: u64,
}

impl Handle {
    pub(crate) fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    pub(crate) previous: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            previous: None,
            next: None,
        }
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    /// Replaces the value in place and returns the old one. The key never changes.
    pub(crate) fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }
}

/// One arena cell. `node` is `None` while the slot sits on the free list.
#[derive(Debug)]
pub(crate) struct Slot<K, V> {
    pub(crate) generation: u64,
    pub(crate) node: Option<Node<K, V>>,
}
