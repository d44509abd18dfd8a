//! Bounded, access-ordered membership set used for deduplication.

use std::collections::HashMap;
use std::hash::Hash;

/// Index sentinel for "no node".
const NIL: usize = usize::MAX;

/// Default capacity, sized to cover a few head windows of a busy feed.
pub const DEFAULT_RECENCY_CAPACITY: usize = 301;

/// A fixed-capacity set that evicts the least-recently-touched key.
///
/// Both [`contains`](RecencySet::contains) and
/// [`insert`](RecencySet::insert) count as a touch, so keys that keep
/// reappearing in fetched batches stay alive longer than keys that
/// scrolled out of the head window. This is a bounded dedup cache, not
/// a correctness-critical store: under churn beyond capacity an
/// evicted key is reported as unseen again.
///
/// Backed by a hash map into an indexed slab threaded as a doubly
/// linked list (plus a free list), so touch and evict are O(1).
#[derive(Debug)]
pub struct RecencySet<K> {
    map: HashMap<K, usize>,
    nodes: Vec<Node<K>>,
    free: Vec<usize>,
    /// Most-recently-touched node.
    head: usize,
    /// Least-recently-touched node, next in line for eviction.
    tail: usize,
    capacity: usize,
}

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: usize,
    next: usize,
}

impl<K: Hash + Eq + Clone> RecencySet<K> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            map: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Membership test. A hit promotes the key to most-recently-touched,
    /// which affects future eviction order.
    pub fn contains(&mut self, key: &K) -> bool {
        match self.map.get(key) {
            Some(&idx) => {
                self.promote(idx);
                true
            }
            None => false,
        }
    }

    /// Insert or promote. Evicts the least-recently-touched key once
    /// the set grows past capacity. Inserting a present key only
    /// promotes it.
    pub fn insert(&mut self, key: K) {
        if let Some(&idx) = self.map.get(&key) {
            self.promote(idx);
            return;
        }
        let idx = self.alloc(key.clone());
        self.map.insert(key, idx);
        self.push_front(idx);
        if self.map.len() > self.capacity {
            self.evict_tail();
        }
    }

    fn alloc(&mut self, key: K) -> usize {
        let node = Node {
            key,
            prev: NIL,
            next: NIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn promote(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn evict_tail(&mut self) {
        let idx = self.tail;
        if idx == NIL {
            return;
        }
        self.unlink(idx);
        self.map.remove(&self.nodes[idx].key);
        self.free.push(idx);
    }
}

impl<K: Hash + Eq + Clone> Default for RecencySet<K> {
    fn default() -> Self {
        Self::new(DEFAULT_RECENCY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_key_evicted_past_capacity() {
        let mut set = RecencySet::new(3);
        for id in 1..=4u32 {
            set.insert(id);
        }
        assert!(!set.contains(&1));
        assert!(set.contains(&2));
        assert!(set.contains(&3));
        assert!(set.contains(&4));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn contains_promotes_against_eviction() {
        let mut set = RecencySet::new(3);
        set.insert(1u32);
        set.insert(2);
        set.insert(3);
        // Touching 1 makes 2 the least-recently-touched key.
        assert!(set.contains(&1));
        set.insert(4);
        assert!(set.contains(&1));
        assert!(!set.contains(&2));
        assert!(set.contains(&3));
        assert!(set.contains(&4));
    }

    #[test]
    fn reinsert_promotes_without_growing() {
        let mut set = RecencySet::new(3);
        set.insert("a");
        set.insert("b");
        set.insert("c");
        set.insert("a");
        assert_eq!(set.len(), 3);
        set.insert("d");
        assert!(set.contains(&"a"));
        assert!(!set.contains(&"b"));
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut set = RecencySet::new(5);
        for id in 0..100u32 {
            set.insert(id);
            assert!(set.len() <= 5);
        }
        // The five most recent survive.
        for id in 95..100u32 {
            assert!(set.contains(&id));
        }
    }

    #[test]
    fn evicted_key_can_be_reinserted() {
        let mut set = RecencySet::new(2);
        set.insert(1u32);
        set.insert(2);
        set.insert(3); // evicts 1
        assert!(!set.contains(&1));
        set.insert(1); // comes back as a fresh key
        assert!(set.contains(&1));
        assert_eq!(set.len(), 2);
    }
}
