//! Sampling-Rate Adapter - hill-climbing controller for D
//!
//! Every [`ADAPT_WINDOW`] lookups the adapter compares the lifetime average
//! lookup cost (node visits per query) with the cost at its previous decision
//! and moves the sampling rate D by a fixed [`STEP`]:
//!
//! | situation                         | move                          |
//! |-----------------------------------|-------------------------------|
//! | first decision, or D did not move | toward [`TARGET_HOT_FRACTION`] |
//! | cost moved against D (`dC·dD < 0`) | same direction again          |
//! | cost moved with D (`dC·dD > 0`)    | reverse direction             |
//! | cost unchanged                    | hold                          |
//!
//! The rule keeps one step of memory and has no damping, so D hovers around
//! a good value rather than settling on it.

use crate::tiered::TieredStats;
use serde::{Deserialize, Serialize};

/// Lookups between two adapter decisions
pub const ADAPT_WINDOW: u64 = 5000;

/// Amount D moves per decision
pub const STEP: f64 = 0.05;

/// Hot-hit ratio below which the heuristic asks for more promotion
pub const TARGET_HOT_FRACTION: f64 = 0.6;

/// `|dD|` below this counts as "D did not move"
const STALL_EPSILON: f64 = 1e-9;

/// Memory of the previous decision point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptState {
    /// Query count when the adapter last acted (0 = never)
    pub last_query_count_at_adapt: u64,
    /// Average cost observed at that point
    pub last_cost: f64,
    /// D in effect before that decision was applied
    pub last_sampling_rate: f64,
}

impl AdaptState {
    pub fn new(initial_sampling_rate: f64) -> Self {
        Self {
            last_query_count_at_adapt: 0,
            last_cost: 0.0,
            last_sampling_rate: initial_sampling_rate,
        }
    }
}

/// Which branch of the decision rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptRule {
    /// Direction picked from the hot-hit ratio
    HotFraction,
    /// Cost and D moved in opposite directions; repeat the last move
    Reinforce,
    /// Cost and D moved together; turn around
    Reverse,
    /// Cost did not change; keep D
    Hold,
}

/// One adapter decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adaptation {
    pub rule: AdaptRule,
    /// Lifetime average node visits per query at decision time
    pub cost: f64,
    pub previous_rate: f64,
    pub new_rate: f64,
}

/// Hill-climbing controller owned by a single tiered index
#[derive(Debug, Clone)]
pub struct SamplingAdapter {
    state: AdaptState,
}

impl SamplingAdapter {
    pub fn new(initial_sampling_rate: f64) -> Self {
        Self {
            state: AdaptState::new(initial_sampling_rate),
        }
    }

    pub fn state(&self) -> &AdaptState {
        &self.state
    }

    /// Check whether a decision is due at the current query count
    pub fn is_due(&self, queries: u64) -> bool {
        queries.saturating_sub(self.state.last_query_count_at_adapt) >= ADAPT_WINDOW
    }

    /// Decide a new sampling rate if a window has elapsed.
    ///
    /// Returns `None` when nothing is due; the caller commits `new_rate`.
    pub fn maybe_adapt(&mut self, stats: &TieredStats, sampling_rate: f64) -> Option<Adaptation> {
        let queries = stats.queries;
        if !self.is_due(queries) {
            return None;
        }

        let cost = if queries > 0 {
            (stats.hot_node_visits + stats.cold_node_visits) as f64 / queries as f64
        } else {
            0.0
        };

        let (rule, delta) = if self.state.last_query_count_at_adapt == 0 {
            (AdaptRule::HotFraction, hot_fraction_step(stats))
        } else {
            let d_cost = cost - self.state.last_cost;
            let d_rate = sampling_rate - self.state.last_sampling_rate;
            let direction = if d_rate > 0.0 { 1.0 } else { -1.0 };

            if d_rate.abs() < STALL_EPSILON {
                (AdaptRule::HotFraction, hot_fraction_step(stats))
            } else if d_cost * d_rate < 0.0 {
                (AdaptRule::Reinforce, STEP * direction)
            } else if d_cost * d_rate > 0.0 {
                (AdaptRule::Reverse, -STEP * direction)
            } else {
                (AdaptRule::Hold, 0.0)
            }
        };

        let new_rate = (sampling_rate + delta).clamp(0.0, 1.0);

        self.state = AdaptState {
            last_query_count_at_adapt: queries,
            last_cost: cost,
            last_sampling_rate: sampling_rate,
        };

        Some(Adaptation {
            rule,
            cost,
            previous_rate: sampling_rate,
            new_rate,
        })
    }
}

/// Step toward the target hot-hit ratio
fn hot_fraction_step(stats: &TieredStats) -> f64 {
    let hot_fraction = stats.hot_hits as f64 / stats.queries.max(1) as f64;
    if hot_fraction < TARGET_HOT_FRACTION {
        STEP
    } else {
        -STEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(queries: u64, hot_hits: u64, visits: u64) -> TieredStats {
        TieredStats {
            queries,
            hot_hits,
            cold_node_visits: visits,
            ..Default::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_not_due_before_window() {
        let mut adapter = SamplingAdapter::new(0.5);
        assert!(adapter.maybe_adapt(&stats(4999, 0, 10_000), 0.5).is_none());
        assert_eq!(adapter.state().last_query_count_at_adapt, 0);
    }

    #[test]
    fn test_first_adaptation_low_hot_fraction_increases() {
        let mut adapter = SamplingAdapter::new(0.5);
        let a = adapter.maybe_adapt(&stats(5000, 1000, 15_000), 0.5).unwrap();

        assert_eq!(a.rule, AdaptRule::HotFraction);
        assert!(approx(a.new_rate, 0.55));
        assert!(approx(a.cost, 3.0));

        let state = adapter.state();
        assert_eq!(state.last_query_count_at_adapt, 5000);
        assert!(approx(state.last_cost, 3.0));
        assert!(approx(state.last_sampling_rate, 0.5));
    }

    #[test]
    fn test_first_adaptation_high_hot_fraction_decreases() {
        let mut adapter = SamplingAdapter::new(0.5);
        let a = adapter.maybe_adapt(&stats(5000, 4000, 15_000), 0.5).unwrap();
        assert!(approx(a.new_rate, 0.45));
    }

    #[test]
    fn test_window_measured_from_last_decision() {
        let mut adapter = SamplingAdapter::new(0.5);
        adapter.maybe_adapt(&stats(5000, 0, 15_000), 0.5).unwrap();

        assert!(!adapter.is_due(9999));
        assert!(adapter.maybe_adapt(&stats(9999, 0, 30_000), 0.55).is_none());
        assert!(adapter.is_due(10_000));
    }

    #[test]
    fn test_reinforce_when_increase_lowered_cost() {
        let mut adapter = SamplingAdapter::new(0.5);
        // Cost 3.0 at D = 0.5, moves D to 0.55
        adapter.maybe_adapt(&stats(5000, 0, 15_000), 0.5).unwrap();
        // Cost falls to 2.5 at D = 0.55
        let a = adapter.maybe_adapt(&stats(10_000, 0, 25_000), 0.55).unwrap();

        assert_eq!(a.rule, AdaptRule::Reinforce);
        assert!(approx(a.new_rate, 0.60));
    }

    #[test]
    fn test_reverse_when_increase_raised_cost() {
        let mut adapter = SamplingAdapter::new(0.5);
        adapter.maybe_adapt(&stats(5000, 0, 15_000), 0.5).unwrap();
        // Cost rises to 3.5
        let a = adapter.maybe_adapt(&stats(10_000, 0, 35_000), 0.55).unwrap();

        assert_eq!(a.rule, AdaptRule::Reverse);
        assert!(approx(a.new_rate, 0.50));
    }

    #[test]
    fn test_decrease_that_raised_cost_keeps_decreasing() {
        let mut adapter = SamplingAdapter::new(0.5);
        // High hot fraction: D goes down to 0.45
        adapter.maybe_adapt(&stats(5000, 4000, 15_000), 0.5).unwrap();
        // dC > 0 and dD < 0 have opposite signs, so the last move is repeated
        let a = adapter.maybe_adapt(&stats(10_000, 8000, 40_000), 0.45).unwrap();

        assert_eq!(a.rule, AdaptRule::Reinforce);
        assert!(approx(a.new_rate, 0.40));
    }

    #[test]
    fn test_hold_when_cost_flat() {
        let mut adapter = SamplingAdapter::new(0.5);
        adapter.maybe_adapt(&stats(5000, 0, 15_000), 0.5).unwrap();
        let a = adapter.maybe_adapt(&stats(10_000, 0, 30_000), 0.55).unwrap();

        assert_eq!(a.rule, AdaptRule::Hold);
        assert!(approx(a.new_rate, 0.55));
    }

    #[test]
    fn test_stalled_rate_falls_back_to_hot_fraction() {
        let mut adapter = SamplingAdapter::new(1.0);
        // Already at the top: first step is clamped, D stays 1.0
        let a = adapter.maybe_adapt(&stats(5000, 0, 15_000), 1.0).unwrap();
        assert!(approx(a.new_rate, 1.0));

        let a = adapter.maybe_adapt(&stats(10_000, 9000, 20_000), 1.0).unwrap();
        assert_eq!(a.rule, AdaptRule::HotFraction);
        assert!(approx(a.new_rate, 0.95));
    }

    #[test]
    fn test_clamped_at_bounds() {
        let mut adapter = SamplingAdapter::new(0.0);
        let a = adapter.maybe_adapt(&stats(5000, 5000, 5000), 0.0).unwrap();
        assert_eq!(a.new_rate, 0.0);

        let mut adapter = SamplingAdapter::new(0.98);
        let a = adapter.maybe_adapt(&stats(5000, 0, 5000), 0.98).unwrap();
        assert_eq!(a.new_rate, 1.0);
    }
}
