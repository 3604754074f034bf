//! Expiry Heap Module
//!
//! Indexed binary min-heap ordering keys by expiration time.
//!
//! A plain `BinaryHeap` cannot remove an arbitrary key, so overwritten or
//! deleted keys would linger until they reach the top. Keeping a key→slot
//! map alongside the node array makes removal of any key O(log n).

use std::collections::HashMap;

// == Heap Node ==
/// A key scheduled to expire at `expires_at` (Unix milliseconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapNode {
    /// Key of the store entry this node expires
    pub key: String,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl HeapNode {
    /// Creates a new heap node.
    pub fn new(key: impl Into<String>, expires_at: u64) -> Self {
        Self {
            key: key.into(),
            expires_at,
        }
    }
}

// == Expiry Heap ==
/// Min-heap of expiration times with O(log n) removal by key.
///
/// Ties between equal timestamps are broken arbitrarily.
#[derive(Debug, Default)]
pub struct ExpiryHeap {
    /// Nodes in heap order
    nodes: Vec<HeapNode>,
    /// Current slot of every key in `nodes`
    positions: HashMap<String, usize>,
}

impl ExpiryHeap {
    // == Constructor ==
    /// Creates a new empty heap.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            positions: HashMap::new(),
        }
    }

    // == Peek Min ==
    /// Returns the node that expires first without removing it.
    pub fn peek_min(&self) -> Option<&HeapNode> {
        self.nodes.first()
    }

    // == Insert ==
    /// Schedules `key` to expire at `expires_at`.
    ///
    /// The caller must ensure the key is not already present.
    pub fn insert(&mut self, key: String, expires_at: u64) {
        debug_assert!(
            !self.positions.contains_key(&key),
            "key {:?} already scheduled",
            key
        );

        let index = self.nodes.len();
        self.positions.insert(key.clone(), index);
        self.nodes.push(HeapNode { key, expires_at });
        self.sift_up(index);
    }

    // == Extract Min ==
    /// Removes and returns the node that expires first.
    pub fn extract_min(&mut self) -> Option<HeapNode> {
        if self.nodes.is_empty() {
            return None;
        }

        let min = self.nodes.swap_remove(0);
        self.positions.remove(&min.key);

        if let Some(moved) = self.nodes.first() {
            self.positions.insert(moved.key.clone(), 0);
            self.sift_down(0);
        } else {
            self.nodes.clear();
            self.positions.clear();
        }

        Some(min)
    }

    // == Delete ==
    /// Removes the node for `key`, returning it if the key was scheduled.
    pub fn delete(&mut self, key: &str) -> Option<HeapNode> {
        let index = self.positions.remove(key)?;
        let last = self.nodes.len() - 1;

        if index == last {
            return self.nodes.pop();
        }

        let removed = self.nodes.swap_remove(index);
        self.positions.insert(self.nodes[index].key.clone(), index);

        // The moved node may belong either above or below its new slot
        self.sift_down(index);
        self.sift_up(index);

        Some(removed)
    }

    // == Lookup ==
    /// Returns the scheduled expiration for `key`, if any.
    pub fn expires_at(&self, key: &str) -> Option<u64> {
        self.positions
            .get(key)
            .map(|&index| self.nodes[index].expires_at)
    }

    /// Checks if a key is scheduled.
    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    // == Length ==
    /// Returns the number of scheduled keys.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in heap (not sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = &HeapNode> {
        self.nodes.iter()
    }

    // == Internal Helpers ==
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.nodes[parent].expires_at <= self.nodes[index].expires_at {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.nodes[left].expires_at < self.nodes[smallest].expires_at {
                smallest = left;
            }
            if right < len && self.nodes[right].expires_at < self.nodes[smallest].expires_at {
                smallest = right;
            }
            if smallest == index {
                break;
            }

            self.swap(index, smallest);
            index = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.nodes.swap(a, b);
        self.positions.insert(self.nodes[a].key.clone(), a);
        self.positions.insert(self.nodes[b].key.clone(), b);
    }

    /// Panics if heap order or the position index is broken.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.nodes.len(), self.positions.len(), "index size mismatch");

        for (index, node) in self.nodes.iter().enumerate() {
            assert_eq!(
                self.positions.get(&node.key),
                Some(&index),
                "stale position for {:?}",
                node.key
            );
            for child in [2 * index + 1, 2 * index + 2] {
                if let Some(c) = self.nodes.get(child) {
                    assert!(
                        node.expires_at <= c.expires_at,
                        "heap order broken at {} -> {}",
                        index,
                        child
                    );
                }
            }
        }
    }
}
