//! # hctree
//!
//! Hot/cold tiered B-tree index with adaptive promotion.
//!
//! Every key lives in a large "cold" B-tree. Keys that are hit often enough
//! get copied into a small "hot" B-tree, which lookups consult first.
//!
//! ## Features
//!
//! - **Decaying hit scores**: O(1) recency/frequency estimate per key
//! - **Sampled promotion**: stochastic admission gate with a tunable rate
//! - **Bounded hot tier**: promotions stop at a fraction of the key domain
//! - **Self-tuning**: hill-climbing controller trades promotion rate against lookup cost
//! - **Deduplicated range scans** across both tiers
//!
//! ## Modules
//!
//! - [`btree`]: Ordered index contract and in-memory B-tree
//! - [`tiered`]: Tiering layer and the [`TieredIndex`] facade
//! - [`config`]: TOML/environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use hctree::{TieredIndex, TieringParams};
//!
//! let params = TieringParams::default().seed(1);
//! let mut index = TieredIndex::new(10_000, 16, params)?;
//!
//! for key in 0..10_000 {
//!     index.insert(key, key * 2)?;
//! }
//!
//! assert_eq!(index.search(21)?, Some(42));
//! assert_eq!(index.range_collect(10, 12).len(), 3);
//!
//! println!("{}", index.stats());
//! # Ok::<(), hctree::TieredError>(())
//! ```

pub mod btree;
pub mod config;
pub mod tiered;

// Re-export top-level types for convenience
pub use btree::{BTreeIndex, Key, Lookup, OrderedIndex};

pub use tiered::{
    AdaptRule, AdaptState, PromotionOutcome, TieredError, TieredIndex, TieredResult, TieredStats,
    TieringParams,
};

pub use config::{Config, ConfigError, IndexConfig, LoggingConfig, WorkloadConfig};
