//! Hit-Score Tracker - dense per-key popularity scores
//!
//! One `f64` slot per key in `[0, max_key]`. Every hit applies
//! `score = alpha * score + 1.0`, so a key hit `n` times in a row scores
//! `(1 - alpha^n) / (1 - alpha)`, approaching `1 / (1 - alpha)`.

use crate::btree::Key;
use crate::tiered::{TieredError, TieredResult};

/// Decayed hit counter for a single key
pub fn decayed(old: f64, alpha: f64) -> f64 {
    alpha * old + 1.0
}

/// Dense score array covering the whole key domain
#[derive(Debug, Clone)]
pub struct HitScores {
    scores: Vec<f64>,
}

impl HitScores {
    /// Allocate zeroed scores for `domain_size` keys.
    ///
    /// A domain too large to allocate is reported as `InvalidParams`.
    pub fn new(domain_size: usize) -> TieredResult<Self> {
        let mut scores = Vec::new();
        scores.try_reserve_exact(domain_size).map_err(|e| {
            TieredError::InvalidParams(format!(
                "cannot allocate hit scores for {} keys: {}",
                domain_size, e
            ))
        })?;
        scores.resize(domain_size, 0.0);

        Ok(Self { scores })
    }

    /// Number of keys covered
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Current score, `None` outside the domain
    pub fn get(&self, key: Key) -> Option<f64> {
        let slot = usize::try_from(key).ok()?;
        self.scores.get(slot).copied()
    }

    /// Record a hit and return the updated score, `None` outside the domain
    pub fn record_hit(&mut self, key: Key, alpha: f64) -> Option<f64> {
        let slot = usize::try_from(key).ok()?;
        let score = self.scores.get_mut(slot)?;
        *score = decayed(*score, alpha);
        Some(*score)
    }
}
