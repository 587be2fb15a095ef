//! Promotion Controller - copies popular cold keys into the hot tier
//!
//! A promotion-eligible cold hit passes three gates before its payload is
//! copied:
//!
//! ```text
//! eligible hit
//!     ↓
//! admission:  u ~ U[0,1), u > D        → SampledOut
//!     ↓
//! capacity:   |hot| ≥ fraction × |domain| → AtCapacity
//!     ↓
//! idempotence: key already hot           → AlreadyHot
//!     ↓
//! fetch from cold (missing              → MissingFromCold)
//!     ↓
//! hot.insert(key, payload)               → Promoted
//! ```
//!
//! Cold is never modified, so every hot key stays present in cold.

use crate::btree::{Key, OrderedIndex};
use rand::Rng;

/// What happened to a promotion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// Payload copied into hot
    Promoted,
    /// Rejected by the stochastic admission gate
    SampledOut,
    /// Hot tier already holds its maximum number of keys
    AtCapacity,
    /// Key was already hot
    AlreadyHot,
    /// Key vanished from cold; nothing to copy
    MissingFromCold,
}

/// Maximum hot-tier size for a domain, as compared by the capacity gate
pub fn hot_capacity(max_hot_fraction: f64, domain_size: usize) -> f64 {
    max_hot_fraction * domain_size as f64
}

/// Stochastic admission: pass with probability `sampling_rate` (clamped to [0, 1])
pub fn admit<R: Rng>(sampling_rate: f64, rng: &mut R) -> bool {
    let rate = sampling_rate.clamp(0.0, 1.0);
    let u: f64 = rng.gen();
    u <= rate
}

/// Run the promotion gates for `key` and copy it into `hot` if all pass
pub fn maybe_promote<V, I, R>(
    key: Key,
    hot: &mut I,
    cold: &I,
    sampling_rate: f64,
    capacity: f64,
    rng: &mut R,
) -> PromotionOutcome
where
    V: Clone,
    I: OrderedIndex<V>,
    R: Rng,
{
    if !admit(sampling_rate, rng) {
        return PromotionOutcome::SampledOut;
    }

    if hot.count_keys() as f64 >= capacity {
        return PromotionOutcome::AtCapacity;
    }

    if hot.search(key).found() {
        return PromotionOutcome::AlreadyHot;
    }

    let payload = match cold.search(key).value {
        Some(value) => value.clone(),
        None => return PromotionOutcome::MissingFromCold,
    };

    hot.insert(key, payload);
    PromotionOutcome::Promoted
}
