//! Tiered Index - hot/cold facade over two ordered indexes
//!
//! All mutation enters here:
//!
//! ```text
//! insert(k, v) ──→ cold (new keys always start cold)
//!
//! search(k) ──→ adapter tick
//!           ──→ hot ── hit ──→ bump score ──→ payload
//!                 │
//!                miss
//!                 ↓
//!               cold ── hit ──→ bump score ──→ score ≥ threshold? ──→ promote
//!                 │
//!                miss ──→ None
//! ```
//!
//! Every key in hot is also in cold with the same payload.

use crate::btree::{BTreeIndex, Key, OrderedIndex};
use crate::tiered::adapter::{AdaptState, SamplingAdapter};
use crate::tiered::promotion::{self, PromotionOutcome};
use crate::tiered::{HitScores, TieredError, TieredResult, TieredStats, TieringParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::marker::PhantomData;

/// Two-tier index with adaptive promotion
pub struct TieredIndex<V, I = BTreeIndex<V>, R = StdRng>
where
    I: OrderedIndex<V>,
{
    /// Promoted keys only
    hot: I,
    /// Every inserted key; source of truth
    cold: I,
    /// Inclusive upper bound of the key domain
    max_key: Key,
    scores: HitScores,
    params: TieringParams,
    stats: TieredStats,
    adapter: SamplingAdapter,
    /// Drives the promotion admission gate
    rng: R,
    _payload: PhantomData<fn() -> V>,
}

impl<V: Clone> TieredIndex<V> {
    /// Create a B-tree backed index over `[0, max_key]`.
    ///
    /// The admission RNG is seeded from `params.seed`, or from entropy if unset.
    pub fn new(max_key: Key, branching_factor: usize, params: TieringParams) -> TieredResult<Self> {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(max_key, branching_factor, params, rng)
    }
}

impl<V, I, R> TieredIndex<V, I, R>
where
    V: Clone,
    I: OrderedIndex<V>,
    R: Rng,
{
    /// Create an index with an explicit random source for promotion admission
    pub fn with_rng(
        max_key: Key,
        branching_factor: usize,
        params: TieringParams,
        rng: R,
    ) -> TieredResult<Self> {
        params.validate()?;

        if branching_factor < 2 {
            return Err(TieredError::InvalidParams(format!(
                "branching_factor must be at least 2, got {}",
                branching_factor
            )));
        }

        let domain_size = usize::try_from(max_key)
            .ok()
            .and_then(|max| max.checked_add(1))
            .ok_or_else(|| {
                TieredError::InvalidParams(format!("max_key must not be negative, got {}", max_key))
            })?;
        let scores = HitScores::new(domain_size)?;

        tracing::debug!(
            max_key,
            branching_factor,
            sampling_rate = params.sampling_rate,
            adapt = params.adapt_sampling,
            "Creating tiered index"
        );

        Ok(Self {
            hot: I::create(branching_factor),
            cold: I::create(branching_factor),
            max_key,
            scores,
            adapter: SamplingAdapter::new(params.sampling_rate),
            params,
            stats: TieredStats::default(),
            rng,
            _payload: PhantomData,
        })
    }

    // ==================== Write Path ====================

    /// Insert or replace a payload.
    ///
    /// New keys land in cold only. A key that is already hot has its hot copy
    /// refreshed too, so both tiers keep serving the same payload.
    pub fn insert(&mut self, key: Key, value: V) -> TieredResult<()> {
        if let Err(e) = self.check_key(key) {
            tracing::warn!("Rejected insert: {}", e);
            return Err(e);
        }

        if self.hot.search(key).found() {
            self.hot.insert(key, value.clone());
        }
        self.cold.insert(key, value);

        Ok(())
    }

    // ==================== Read Path ====================

    /// Point lookup, hot tier first.
    ///
    /// Mutates scores, stats, possibly the hot tier and the sampling rate.
    /// Returns `Ok(None)` for a key in range that was never inserted.
    ///
    /// An out-of-range key still counts as a query and a miss, and still
    /// ticks the adapter, but never touches the tiers or scores.
    pub fn search(&mut self, key: Key) -> TieredResult<Option<V>> {
        self.stats.queries += 1;
        self.maybe_adapt();

        if let Err(e) = self.check_key(key) {
            self.stats.not_found += 1;
            return Err(e);
        }

        let hot = self.hot.search(key);
        self.stats.hot_node_visits += hot.visits as u64;

        if let Some(value) = hot.value {
            let value = value.clone();
            self.stats.hot_hits += 1;
            self.scores.record_hit(key, self.params.decay_alpha);
            return Ok(Some(value));
        }

        let cold = self.cold.search(key);
        self.stats.cold_node_visits += cold.visits as u64;

        let value = match cold.value {
            Some(value) => value.clone(),
            None => {
                self.stats.not_found += 1;
                return Ok(None);
            }
        };

        self.stats.cold_hits += 1;
        if let Some(score) = self.scores.record_hit(key, self.params.decay_alpha) {
            if score >= self.params.hot_threshold {
                self.promote(key);
            }
        }

        Ok(Some(value))
    }

    /// Visit every stored key in `[lo, hi]` exactly once.
    ///
    /// Hot matches come first in ascending order, then the cold-only matches
    /// in ascending order; the combined sequence is not globally sorted.
    /// Returns the number of keys passed to `callback`.
    pub fn range_search<F>(&mut self, lo: Key, hi: Key, mut callback: F) -> usize
    where
        F: FnMut(Key, &V),
    {
        let lo_in_domain = lo.max(0);
        let hi_in_domain = hi.min(self.max_key);
        if lo_in_domain > hi_in_domain {
            return 0;
        }

        let mut seen = vec![false; (hi_in_domain - lo_in_domain) as usize + 1];
        let mut emitted = 0;

        let mut emit = |key: Key, value: &V| {
            if key < lo_in_domain || key > hi_in_domain {
                return;
            }
            let slot = &mut seen[(key - lo_in_domain) as usize];
            if !*slot {
                *slot = true;
                emitted += 1;
                callback(key, value);
            }
        };

        let hot_visits = self.hot.range_search(lo, hi, &mut emit);
        let cold_visits = self.cold.range_search(lo, hi, &mut emit);

        self.stats.range_scans += 1;
        self.stats.hot_node_visits += hot_visits as u64;
        self.stats.cold_node_visits += cold_visits as u64;

        emitted
    }

    /// Collect a deduplicated range scan into a vector
    pub fn range_collect(&mut self, lo: Key, hi: Key) -> Vec<(Key, V)> {
        let mut out = Vec::new();
        self.range_search(lo, hi, |key, value| out.push((key, value.clone())));
        out
    }

    // ==================== Stats & Inspection ====================

    /// Cumulative counters plus live key counts and the current sampling rate
    pub fn stats(&self) -> TieredStats {
        TieredStats {
            hot_keys: self.hot.count_keys(),
            cold_keys: self.cold.count_keys(),
            sampling_rate: self.params.sampling_rate,
            ..self.stats.clone()
        }
    }

    /// Current parameters, including the adapted sampling rate
    pub fn params(&self) -> &TieringParams {
        &self.params
    }

    /// Adapter memory from its last decision point
    pub fn adapt_state(&self) -> &AdaptState {
        self.adapter.state()
    }

    /// Inclusive upper bound of the key domain
    pub fn max_key(&self) -> Key {
        self.max_key
    }

    /// Largest hot-tier size the capacity gate allows
    pub fn hot_capacity(&self) -> usize {
        promotion::hot_capacity(self.params.max_hot_fraction, self.scores.len()).ceil() as usize
    }

    /// Current hit score of a key, `None` outside the domain
    pub fn hit_score(&self, key: Key) -> Option<f64> {
        self.scores.get(key)
    }

    /// Check hot-tier membership without touching stats
    pub fn is_hot(&self, key: Key) -> bool {
        self.hot.search(key).found()
    }

    /// Check cold-tier membership without touching stats
    pub fn contains(&self, key: Key) -> bool {
        self.cold.search(key).found()
    }

    /// Read-only view of the hot tier
    pub fn hot(&self) -> &I {
        &self.hot
    }

    /// Read-only view of the cold tier
    pub fn cold(&self) -> &I {
        &self.cold
    }

    fn check_key(&self, key: Key) -> TieredResult<()> {
        if key < 0 || key > self.max_key {
            return Err(TieredError::OutOfRange {
                key,
                max_key: self.max_key,
            });
        }
        Ok(())
    }

    fn promote(&mut self, key: Key) {
        let capacity = promotion::hot_capacity(self.params.max_hot_fraction, self.scores.len());
        let outcome = promotion::maybe_promote(
            key,
            &mut self.hot,
            &self.cold,
            self.params.sampling_rate,
            capacity,
            &mut self.rng,
        );

        match outcome {
            PromotionOutcome::Promoted => {
                self.stats.promotions += 1;
                tracing::debug!(key, hot_keys = self.hot.count_keys(), "Promoted key to hot tier");
            }
            PromotionOutcome::SampledOut => self.stats.sampled_out += 1,
            PromotionOutcome::AtCapacity => {
                self.stats.capacity_refusals += 1;
                tracing::trace!(key, capacity, "Hot tier at capacity");
            }
            PromotionOutcome::AlreadyHot => {}
            PromotionOutcome::MissingFromCold => {
                tracing::error!(key, "Promotion candidate missing from cold tier");
            }
        }
    }

    fn maybe_adapt(&mut self) {
        if !self.params.adapt_sampling {
            return;
        }

        if let Some(adaptation) = self.adapter.maybe_adapt(&self.stats, self.params.sampling_rate) {
            self.params.sampling_rate = adaptation.new_rate;
            self.stats.adaptations += 1;

            tracing::info!(
                queries = self.stats.queries,
                cost = adaptation.cost,
                rule = ?adaptation.rule,
                from = adaptation.previous_rate,
                to = adaptation.new_rate,
                "Adapted sampling rate"
            );
        }
    }
}
