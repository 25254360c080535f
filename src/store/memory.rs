//! In-memory entry store: FIFO with renewal.
//!
//! An insertion-ordered map from digest to value. Order encodes recency of
//! insertion or promotion, never of plain reads: the oldest entry is always
//! the next eviction candidate, and a re-set or promoted digest moves to the
//! newest end.
//!
//! Implemented as a slab-backed doubly linked list (oldest at head, newest
//! at tail) plus a hash index from digest to slab slot, so contains / get /
//! set / pop_oldest / remove are all O(1) without depending on incidental
//! map iteration order.

use std::collections::HashMap;

use crate::digest::Digest;

#[derive(Debug)]
struct Node<V> {
    digest: Digest,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Ordered digest → value map bounded externally by the cache capacity.
#[derive(Debug)]
pub struct MemoryStore<V> {
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    index: HashMap<Digest, usize>,
    /// Oldest entry (next eviction candidate).
    head: Option<usize>,
    /// Newest entry.
    tail: Option<usize>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.index.contains_key(digest)
    }

    /// Pure lookup. Never changes FIFO order.
    pub fn get(&self, digest: &Digest) -> Option<&V> {
        let slot = *self.index.get(digest)?;
        self.slots[slot].as_ref().map(|node| &node.value)
    }

    /// Insert or renew an entry at the newest end.
    ///
    /// A digest already present keeps its slot but loses its old position;
    /// this is how promotion-on-write and renewal-on-re-set are expressed.
    pub fn set(&mut self, digest: Digest, value: V) {
        if let Some(&slot) = self.index.get(&digest) {
            if let Some(node) = self.slots[slot].as_mut() {
                node.value = value;
            }
            self.unlink(slot);
            self.link_newest(slot);
            return;
        }

        let node = Node {
            digest: digest.clone(),
            value,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(digest, slot);
        self.link_newest(slot);
    }

    /// Remove and return the oldest entry, or `None` if the store is empty.
    pub fn pop_oldest(&mut self) -> Option<(Digest, V)> {
        let slot = self.head?;
        self.unlink(slot);
        let node = self.slots[slot].take()?;
        self.free.push(slot);
        self.index.remove(&node.digest);
        Some((node.digest, node.value))
    }

    /// Remove an entry if present; absent digests are a silent no-op.
    pub fn remove(&mut self, digest: &Digest) -> Option<V> {
        let slot = self.index.remove(digest)?;
        self.unlink(slot);
        let node = self.slots[slot].take()?;
        self.free.push(slot);
        Some(node.value)
    }

    /// Digests from oldest to newest. Test and introspection helper.
    pub fn digests(&self) -> impl Iterator<Item = &Digest> {
        std::iter::successors(self.head, move |&slot| {
            self.slots[slot].as_ref().and_then(|node| node.next)
        })
        .filter_map(move |slot| self.slots[slot].as_ref().map(|node| &node.digest))
    }

    /// Detach a slot from the list, fixing up head/tail and neighbors.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.slots[slot].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.slots[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.slots[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slots[slot].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    /// Attach a detached slot at the newest end.
    fn link_newest(&mut self, slot: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.slots[slot].as_mut() {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(node) = self.slots[t].as_mut() {
                    node.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }
}
