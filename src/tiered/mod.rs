//! Hot/Cold Tiering Layer
//!
//! Adds an adaptive caching policy on top of two ordered indexes:
//!
//! - **score**: decaying per-key hit scores
//! - **promotion**: sampling-gated, capacity-bounded copies from cold to hot
//! - **adapter**: hill-climbing controller for the sampling rate
//! - **index**: the [`TieredIndex`] facade tying it together
//! - **stats**: cumulative counters
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────── TieredIndex ────────────────┐
//! search(k) ────→ │ adapter tick → hot → cold → score → promote │
//!                 └──────┬──────────────┬───────────────────────┘
//!                        ↓              ↓
//!                   hot BTree      cold BTree
//!                 (promoted keys)  (every key)
//! ```
//!
//! # Example
//!
//! ```rust
//! use hctree::tiered::{TieredIndex, TieringParams};
//!
//! let params = TieringParams::default()
//!     .sampling_rate(1.0)
//!     .hot_threshold(1.5)
//!     .decay_alpha(0.5)
//!     .max_hot_fraction(1.0)
//!     .seed(7);
//!
//! let mut index = TieredIndex::new(99, 4, params)?;
//! index.insert(42, "A")?;
//!
//! index.search(42)?; // cold hit, score 1.0
//! index.search(42)?; // cold hit, score 1.5, promoted
//! assert!(index.is_hot(42));
//! # Ok::<(), hctree::tiered::TieredError>(())
//! ```

pub mod adapter;
pub mod error;
pub mod index;
pub mod params;
pub mod promotion;
pub mod score;
pub mod stats;

pub use adapter::{AdaptRule, AdaptState, Adaptation, SamplingAdapter, ADAPT_WINDOW};
pub use error::{TieredError, TieredResult};
pub use index::TieredIndex;
pub use params::TieringParams;
pub use promotion::PromotionOutcome;
pub use score::HitScores;
pub use stats::TieredStats;
