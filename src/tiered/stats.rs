//! Cumulative statistics for a tiered index

use serde::{Deserialize, Serialize};

/// Counters accumulated since construction.
///
/// `hot_keys`, `cold_keys` and `sampling_rate` are filled in live by
/// [`TieredIndex::stats`](crate::tiered::TieredIndex::stats).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TieredStats {
    /// Point lookups issued
    pub queries: u64,
    /// Lookups answered by the hot tier
    pub hot_hits: u64,
    /// Lookups answered by the cold tier
    pub cold_hits: u64,
    /// Lookups that found nothing
    pub not_found: u64,
    /// Nodes visited in the hot tier (lookups and range scans)
    pub hot_node_visits: u64,
    /// Nodes visited in the cold tier (lookups and range scans)
    pub cold_node_visits: u64,
    /// Range scans issued
    pub range_scans: u64,
    /// Keys copied from cold to hot
    pub promotions: u64,
    /// Eligible promotions skipped by the admission gate
    pub sampled_out: u64,
    /// Eligible promotions refused because hot was full
    pub capacity_refusals: u64,
    /// Times the adapter retuned the sampling rate
    pub adaptations: u64,
    /// Keys currently in the hot tier
    pub hot_keys: usize,
    /// Keys currently in the cold tier
    pub cold_keys: usize,
    /// Current sampling rate D
    pub sampling_rate: f64,
}

impl TieredStats {
    /// Lifetime average node visits per lookup
    pub fn avg_node_visits(&self) -> f64 {
        if self.queries == 0 {
            return 0.0;
        }
        (self.hot_node_visits + self.cold_node_visits) as f64 / self.queries as f64
    }

    /// Fraction of lookups answered by the hot tier
    pub fn hot_hit_ratio(&self) -> f64 {
        self.hot_hits as f64 / self.queries.max(1) as f64
    }
}

impl std::fmt::Display for TieredStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Queries: {} (hot {}, cold {}, missing {}), Keys: hot {} / cold {}, \
             Promotions: {}, Avg visits: {:.3}, D: {:.2}",
            self.queries,
            self.hot_hits,
            self.cold_hits,
            self.not_found,
            self.hot_keys,
            self.cold_keys,
            self.promotions,
            self.avg_node_visits(),
            self.sampling_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios_on_empty() {
        let stats = TieredStats::default();
        assert_eq!(stats.avg_node_visits(), 0.0);
        assert_eq!(stats.hot_hit_ratio(), 0.0);
    }

    #[test]
    fn test_ratios() {
        let stats = TieredStats {
            queries: 4,
            hot_hits: 1,
            hot_node_visits: 2,
            cold_node_visits: 8,
            ..Default::default()
        };
        assert_eq!(stats.avg_node_visits(), 2.5);
        assert_eq!(stats.hot_hit_ratio(), 0.25);
    }

    #[test]
    fn test_display() {
        let stats = TieredStats {
            queries: 3,
            hot_hits: 1,
            cold_hits: 2,
            hot_keys: 1,
            cold_keys: 1,
            promotions: 1,
            sampling_rate: 1.0,
            ..Default::default()
        };
        assert_eq!(
            stats.to_string(),
            "Queries: 3 (hot 1, cold 2, missing 0), Keys: hot 1 / cold 1, \
             Promotions: 1, Avg visits: 0.000, D: 1.00"
        );
    }

    #[test]
    fn test_json_output() {
        let stats = TieredStats {
            queries: 10,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["queries"], 10);
        assert_eq!(json["hot_keys"], 0);
    }
}
