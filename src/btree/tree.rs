//! In-memory B-tree implementing [`OrderedIndex`]
//!
//! Classic top-down B-tree: full nodes are split on the way down so an
//! insert never has to walk back up. Every node touched by a lookup or scan
//! is counted, which gives the tiering layer its cost signal.
//!
//! # Performance
//! - Insert: O(t · log_t n)
//! - Point search: O(log_t n) node visits
//! - Range scan: O(log_t n + k / t) node visits where k = results

use super::node::Node;
use super::{Key, Lookup, OrderedIndex};
use std::fmt;

/// Smallest minimum degree that yields a valid B-tree
pub const MIN_DEGREE: usize = 2;

/// In-memory B-tree with node-visit accounting
pub struct BTreeIndex<V> {
    root: Node<V>,
    /// Minimum degree `t`; nodes hold up to `2t - 1` keys
    min_degree: usize,
    /// Distinct keys stored
    len: usize,
}

impl<V> BTreeIndex<V> {
    /// Create an empty tree. Degrees below 2 are raised to 2.
    pub fn new(min_degree: usize) -> Self {
        Self {
            root: Node::new_leaf(),
            min_degree: min_degree.max(MIN_DEGREE),
            len: 0,
        }
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels (an empty tree has height 1)
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while let Some(child) = node.children.first() {
            height += 1;
            node = child;
        }
        height
    }

    /// Check if the key is present without caring about visit counts
    pub fn contains(&self, key: Key) -> bool {
        self.lookup(key).found()
    }

    fn lookup(&self, key: Key) -> Lookup<'_, V> {
        let mut node = &self.root;
        let mut visits = 0;

        loop {
            visits += 1;
            match node.find(key) {
                Ok(index) => {
                    return Lookup {
                        value: Some(&node.entries[index].1),
                        visits,
                    }
                }
                Err(index) => {
                    if node.is_leaf() {
                        return Lookup {
                            value: None,
                            visits,
                        };
                    }
                    node = &node.children[index];
                }
            }
        }
    }

    fn upsert(&mut self, key: Key, value: V) {
        if self.root.is_full(self.min_degree) {
            let old_root = std::mem::replace(&mut self.root, Node::new_leaf());
            self.root.children.push(old_root);
            self.root.split_child(0, self.min_degree);
        }

        if self.root.insert_non_full(key, value, self.min_degree) {
            self.len += 1;
        }
    }
}

impl<V> OrderedIndex<V> for BTreeIndex<V> {
    fn create(branching_factor: usize) -> Self {
        Self::new(branching_factor)
    }

    fn insert(&mut self, key: Key, value: V) {
        self.upsert(key, value);
    }

    fn search(&self, key: Key) -> Lookup<'_, V> {
        self.lookup(key)
    }

    fn range_search(&self, lo: Key, hi: Key, callback: &mut dyn FnMut(Key, &V)) -> usize {
        let mut visits = 0;
        self.root.range(lo, hi, callback, &mut visits);
        visits
    }

    fn count_keys(&self) -> usize {
        self.len
    }
}

impl<V> fmt::Debug for BTreeIndex<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTreeIndex")
            .field("min_degree", &self.min_degree)
            .field("len", &self.len)
            .field("height", &self.height())
            .finish()
    }
}
