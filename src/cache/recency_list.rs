use crate::cache::node::{Handle, Node, Slot};
use crate::error::{Error, Result};

/// Doubly-linked list of entries ordered from least recently used (head) to most recently
/// used (tail).
///
/// Nodes live in an arena of slots and link to each other by slot index. Callers address a
/// node through the [`Handle`] returned by [`RecencyList::append_tail`], so every edit is
/// O(1) and no edit ever searches the list.
#[derive(Debug)]
pub(crate) struct RecencyList<K, V> {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
}

impl<K, V> RecencyList<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> RecencyList<K, V> {
        RecencyList {
            head: None,
            tail: None,
            len: 0,
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the handle still refers to a node linked into this list.
    #[cfg(test)]
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        self.resolve(handle).is_some()
    }

    pub(crate) fn get(&self, handle: Handle) -> Option<&Node<K, V>> {
        let index = self.resolve(handle)?;
        self.slots[index].node.as_ref()
    }

    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut Node<K, V>> {
        let index = self.resolve(handle)?;
        self.slots[index].node.as_mut()
    }

    /// Handle of the least recently used node.
    pub(crate) fn head(&self) -> Option<Handle> {
        self.head.map(|index| self.handle_at(index))
    }

    /// Handle of the most recently used node.
    pub(crate) fn tail(&self) -> Option<Handle> {
        self.tail.map(|index| self.handle_at(index))
    }

    /// Creates a node and links it after the current tail.
    pub(crate) fn append_tail(&mut self, key: K, value: V) -> Handle {
        let handle = self.allocate(Node::new(key, value));
        self.attach_tail(handle.index());
        self.len += 1;
        handle
    }

    /// Removes the node from wherever it sits in the chain and frees its slot.
    ///
    /// ## Panics
    /// Panics if the handle does not refer to a node in this list.
    pub(crate) fn unlink(&mut self, handle: Handle) -> (K, V) {
        let index = self
            .resolve(handle)
            .expect("handle must refer to a node linked into this list");

        self.detach(index);
        self.len -= 1;
        self.release(index).into_entry()
    }

    /// Unlinks the least recently used node and returns its entry.
    pub(crate) fn remove_head(&mut self) -> Result<(K, V)> {
        let index = self.head.ok_or(Error::EmptyCollection)?;

        self.detach(index);
        self.len -= 1;
        Ok(self.release(index).into_entry())
    }

    /// Moves the node to the tail. The node keeps its slot, so `handle` stays valid.
    ///
    /// ## Panics
    /// Panics if the handle does not refer to a node in this list.
    pub(crate) fn touch(&mut self, handle: Handle) {
        let index = self
            .resolve(handle)
            .expect("handle must refer to a node linked into this list");

        if self.tail == Some(index) {
            return;
        }

        self.detach(index);
        self.attach_tail(index);
    }

    /// Drops every node. Slot generations are bumped so no handle issued before the clear
    /// resolves afterwards.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }

        self.free.clear();
        self.free.extend((0..self.slots.len()).rev());
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates from the least to the most recently used entry.
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            next: self.head,
            remaining: self.len,
        }
    }

    fn resolve(&self, handle: Handle) -> Option<usize> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation() && slot.node.is_some())
            .map(|_| handle.index())
    }

    fn handle_at(&self, index: usize) -> Handle {
        Handle::new(index, self.slots[index].generation)
    }

    fn node(&self, index: usize) -> &Node<K, V> {
        self.slots[index]
            .node
            .as_ref()
            .expect("a linked index must point at an occupied slot")
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<K, V> {
        self.slots[index]
            .node
            .as_mut()
            .expect("a linked index must point at an occupied slot")
    }

    fn allocate(&mut self, node: Node<K, V>) -> Handle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                Handle::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                Handle::new(index, 0)
            }
        }
    }

    fn release(&mut self, index: usize) -> Node<K, V> {
        let slot = &mut self.slots[index];
        let node = slot
            .node
            .take()
            .expect("a released index must point at an occupied slot");

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        node
    }

    fn attach_tail(&mut self, index: usize) {
        let old_tail = self.tail;

        let node = self.node_mut(index);
        node.previous = old_tail;
        node.next = None;

        match old_tail {
            Some(tail_idx) => self.node_mut(tail_idx).next = Some(index),
            None => self.head = Some(index),
        }

        self.tail = Some(index);
    }

    fn detach(&mut self, index: usize) {
        let (previous, next) = {
            let node = self.node(index);
            (node.previous, node.next)
        };

        match previous {
            Some(previous_idx) => self.node_mut(previous_idx).next = next,
            None => self.head = next,
        }

        match next {
            Some(next_idx) => self.node_mut(next_idx).previous = previous,
            None => self.tail = previous,
        }

        let node = self.node_mut(index);
        node.previous = None;
        node.next = None;
    }

    /// Checks the bookkeeping and the two endpoints without walking the chain.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn check_endpoints(&self) {
        assert_eq!(
            self.len + self.free.len(),
            self.slots.len(),
            "every slot must be either linked or free"
        );

        match (self.head, self.tail) {
            (None, None) => assert_eq!(self.len, 0, "list without endpoints must be empty"),
            (Some(head_idx), Some(tail_idx)) => {
                assert!(self.len > 0, "list with endpoints must not be empty");
                assert!(
                    self.node(head_idx).previous.is_none(),
                    "head must not have a previous node"
                );
                assert!(
                    self.node(tail_idx).next.is_none(),
                    "tail must not have a next node"
                );
                if self.len == 1 {
                    assert_eq!(head_idx, tail_idx, "sole node must be both head and tail");
                }
            }
            _ => panic!("head and tail must both be set or both be empty"),
        }
    }

    /// Walks the chain and checks every link against the bookkeeping.
    #[cfg(test)]
    pub(crate) fn validate_invariants(&self) {
        self.check_endpoints();

        if self.len == 0 {
            return;
        }

        let mut count = 0;
        let mut previous = None;
        let mut current = self.head;

        while let Some(index) = current {
            count += 1;
            assert!(count <= self.len, "cycle detected in recency list");

            let node = self.node(index);
            assert_eq!(node.previous, previous, "broken back-link at slot {index}");

            previous = Some(index);
            current = node.next;
        }

        assert_eq!(count, self.len, "recency list length mismatch");
        assert_eq!(previous, self.tail, "walk from head must end at tail");
    }
}

/// Iterator over cache entries from least to most recently used.
///
/// Created by [`LruCache::iter`](crate::LruCache::iter).
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let node = self.slots[index].node.as_ref()?;

        self.next = node.next;
        self.remaining -= 1;
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
