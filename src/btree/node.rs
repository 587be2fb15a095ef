//! B-tree node implementation
//!
//! A node holds sorted `(key, payload)` entries. Internal nodes carry
//! `entries.len() + 1` children; leaves carry none. With minimum degree `t`
//! every node except the root holds between `t - 1` and `2t - 1` entries.

use super::Key;

/// Single B-tree node
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    /// Entries sorted by key
    pub entries: Vec<(Key, V)>,
    /// Child subtrees (empty for leaves). `children[i]` holds keys below `entries[i]`
    pub children: Vec<Node<V>>,
}

impl<V> Node<V> {
    /// Create an empty leaf
    pub fn new_leaf() -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if this node must be split before descending into it
    pub fn is_full(&self, min_degree: usize) -> bool {
        self.entries.len() >= 2 * min_degree - 1
    }

    /// Position of `key` in this node's entries
    pub fn find(&self, key: Key) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.cmp(&key))
    }

    /// Split the full child at `index`, lifting its median entry into `self`
    pub fn split_child(&mut self, index: usize, min_degree: usize) {
        let child = &mut self.children[index];

        let right_entries = child.entries.split_off(min_degree);
        let right_children = if child.is_leaf() {
            Vec::new()
        } else {
            child.children.split_off(min_degree)
        };

        // Median sits at t - 1 once the right half is gone
        let median = match child.entries.pop() {
            Some(entry) => entry,
            None => return,
        };

        self.entries.insert(index, median);
        self.children.insert(
            index + 1,
            Node {
                entries: right_entries,
                children: right_children,
            },
        );
    }

    /// Insert into a node known not to be full.
    ///
    /// Returns `true` if the key was new, `false` if an existing payload was replaced.
    pub fn insert_non_full(&mut self, key: Key, value: V, min_degree: usize) -> bool {
        let mut index = match self.find(key) {
            Ok(index) => {
                self.entries[index].1 = value;
                return false;
            }
            Err(index) => index,
        };

        if self.is_leaf() {
            self.entries.insert(index, (key, value));
            return true;
        }

        if self.children[index].is_full(min_degree) {
            self.split_child(index, min_degree);

            let separator = self.entries[index].0;
            if key == separator {
                self.entries[index].1 = value;
                return false;
            }
            if key > separator {
                index += 1;
            }
        }

        self.children[index].insert_non_full(key, value, min_degree)
    }

    /// In-order scan of `[lo, hi]` below this node
    pub fn range(
        &self,
        lo: Key,
        hi: Key,
        callback: &mut dyn FnMut(Key, &V),
        visits: &mut usize,
    ) {
        *visits += 1;

        // Everything left of `start` is < lo, and so are the subtrees left of it
        let start = self.entries.partition_point(|(k, _)| *k < lo);

        for index in start..self.entries.len() {
            if !self.is_leaf() {
                self.children[index].range(lo, hi, callback, visits);
            }

            let (key, value) = &self.entries[index];
            if *key > hi {
                return;
            }
            callback(*key, value);
        }

        if let Some(last) = self.children.last() {
            last.range(lo, hi, callback, visits);
        }
    }
}
