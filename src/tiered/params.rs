//! Tiering parameters
//!
//! Deserializable from the `[tiering]` section of the config file. Only
//! `sampling_rate` changes after construction, and only through the adapter.

use crate::tiered::{TieredError, TieredResult};
use serde::{Deserialize, Serialize};

/// Promotion and adaptation knobs for a [`TieredIndex`](crate::tiered::TieredIndex)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieringParams {
    /// Let the hill-climbing adapter retune `sampling_rate`
    #[serde(default = "default_adapt_sampling")]
    pub adapt_sampling: bool,

    /// Probability D that an eligible cold hit is considered for promotion
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,

    /// Weight kept from the previous hit score on every hit
    #[serde(default = "default_decay_alpha")]
    pub decay_alpha: f64,

    /// Hit score a cold hit needs before it may be promoted
    #[serde(default = "default_hot_threshold")]
    pub hot_threshold: f64,

    /// Upper bound on hot keys as a fraction of the key domain
    #[serde(default = "default_max_hot_fraction")]
    pub max_hot_fraction: f64,

    /// Hot keys also stay in cold. Must be true.
    #[serde(default = "default_inclusive")]
    pub inclusive: bool,

    /// Seed for the admission RNG; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_adapt_sampling() -> bool {
    true
}

fn default_sampling_rate() -> f64 {
    0.1
}

fn default_decay_alpha() -> f64 {
    0.9
}

fn default_hot_threshold() -> f64 {
    3.0
}

fn default_max_hot_fraction() -> f64 {
    0.1
}

fn default_inclusive() -> bool {
    true
}

impl Default for TieringParams {
    fn default() -> Self {
        Self {
            adapt_sampling: default_adapt_sampling(),
            sampling_rate: default_sampling_rate(),
            decay_alpha: default_decay_alpha(),
            hot_threshold: default_hot_threshold(),
            max_hot_fraction: default_max_hot_fraction(),
            inclusive: default_inclusive(),
            seed: None,
        }
    }
}

impl TieringParams {
    /// Builder method: enable or disable the adapter
    pub fn adapt_sampling(mut self, enabled: bool) -> Self {
        self.adapt_sampling = enabled;
        self
    }

    /// Builder method: set the initial sampling rate
    pub fn sampling_rate(mut self, rate: f64) -> Self {
        self.sampling_rate = rate;
        self
    }

    /// Builder method: set the decay factor
    pub fn decay_alpha(mut self, alpha: f64) -> Self {
        self.decay_alpha = alpha;
        self
    }

    /// Builder method: set the promotion threshold
    pub fn hot_threshold(mut self, threshold: f64) -> Self {
        self.hot_threshold = threshold;
        self
    }

    /// Builder method: set the hot-tier size bound
    pub fn max_hot_fraction(mut self, fraction: f64) -> Self {
        self.max_hot_fraction = fraction;
        self
    }

    /// Builder method: request inclusive or exclusive tiering
    pub fn inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    /// Builder method: seed the admission RNG
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> TieredResult<()> {
        if !self.inclusive {
            return Err(TieredError::UnsupportedMode);
        }

        if !(0.0..=1.0).contains(&self.sampling_rate) {
            return Err(TieredError::InvalidParams(format!(
                "sampling_rate must be in [0, 1], got {}",
                self.sampling_rate
            )));
        }

        if !(0.0..1.0).contains(&self.decay_alpha) {
            return Err(TieredError::InvalidParams(format!(
                "decay_alpha must be in [0, 1), got {}",
                self.decay_alpha
            )));
        }

        if !(0.0..=1.0).contains(&self.max_hot_fraction) {
            return Err(TieredError::InvalidParams(format!(
                "max_hot_fraction must be in [0, 1], got {}",
                self.max_hot_fraction
            )));
        }

        if !self.hot_threshold.is_finite() || self.hot_threshold < 0.0 {
            return Err(TieredError::InvalidParams(format!(
                "hot_threshold must be a non-negative number, got {}",
                self.hot_threshold
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = TieringParams::default();
        assert!(params.validate().is_ok());
        assert!(params.inclusive);
        assert!(params.adapt_sampling);
        assert_eq!(params.seed, None);
    }

    #[test]
    fn test_builder() {
        let params = TieringParams::default()
            .sampling_rate(1.0)
            .decay_alpha(0.5)
            .hot_threshold(1.5)
            .max_hot_fraction(1.0)
            .adapt_sampling(false)
            .seed(7);

        assert_eq!(params.sampling_rate, 1.0);
        assert_eq!(params.decay_alpha, 0.5);
        assert_eq!(params.hot_threshold, 1.5);
        assert_eq!(params.max_hot_fraction, 1.0);
        assert!(!params.adapt_sampling);
        assert_eq!(params.seed, Some(7));
    }

    #[test]
    fn test_exclusive_mode_rejected() {
        let params = TieringParams::default().inclusive(false);
        assert_eq!(params.validate(), Err(TieredError::UnsupportedMode));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let bad = [
            TieringParams::default().sampling_rate(1.5),
            TieringParams::default().sampling_rate(-0.1),
            TieringParams::default().decay_alpha(1.0),
            TieringParams::default().max_hot_fraction(2.0),
            TieringParams::default().hot_threshold(f64::NAN),
            TieringParams::default().hot_threshold(-1.0),
        ];

        for params in bad {
            assert!(
                matches!(params.validate(), Err(TieredError::InvalidParams(_))),
                "{:?} should be rejected",
                params
            );
        }
    }

    #[test]
    fn test_deserialize_partial() {
        let params: TieringParams = toml::from_str("sampling_rate = 0.5\nseed = 42").unwrap();
        assert_eq!(params.sampling_rate, 0.5);
        assert_eq!(params.seed, Some(42));
        assert_eq!(params.decay_alpha, 0.9);
    }
}
