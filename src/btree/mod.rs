//! Ordered Index Structures
//!
//! The tiering layer sits on top of two ordered key→payload indexes. Both
//! tiers talk to them through the [`OrderedIndex`] contract:
//!
//! - **create**: build an empty index for a branching factor
//! - **insert**: upsert a key/payload pair
//! - **search**: point lookup, reporting nodes visited
//! - **range_search**: ascending scan over `[lo, hi]`, reporting nodes visited
//! - **count_keys**: number of distinct keys stored
//!
//! Dropping an index releases it; payload cleanup is the owner's concern.
//!
//! # Cost Model
//!
//! ```text
//! search(42) on a degree-4 tree
//!
//!              [20 | 50]            ← visit 1
//!             /    |    \
//!      [5|10]  [30|42|45]  [60|70]  ← visit 2, found
//!
//! Lookup { value: Some(..), visits: 2 }
//! ```
//!
//! Node visits are the cost signal the sampling-rate adapter optimizes.

mod node;
mod tree;

pub use tree::BTreeIndex;

/// Key type stored by every index
pub type Key = i64;

/// Result of a point lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<'a, V> {
    /// Payload, if the key is present
    pub value: Option<&'a V>,
    /// Number of index nodes touched by the lookup
    pub visits: usize,
}

impl<'a, V> Lookup<'a, V> {
    pub fn found(&self) -> bool {
        self.value.is_some()
    }
}

/// Contract every ordered index backing a tier must satisfy
pub trait OrderedIndex<V> {
    /// Create an empty index with the given branching factor
    fn create(branching_factor: usize) -> Self
    where
        Self: Sized;

    /// Insert a key, replacing the payload if it already exists
    fn insert(&mut self, key: Key, value: V);

    /// Point lookup
    fn search(&self, key: Key) -> Lookup<'_, V>;

    /// Invoke `callback` once per key in `[lo, hi]`, in ascending key order.
    ///
    /// Returns the number of nodes visited.
    fn range_search(&self, lo: Key, hi: Key, callback: &mut dyn FnMut(Key, &V)) -> usize;

    /// Number of distinct keys stored
    fn count_keys(&self) -> usize;
}
