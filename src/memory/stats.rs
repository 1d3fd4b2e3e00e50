//! Cache Statistics Module
//!
//! Hit/miss/eviction counters for the memory tier, with a snapshot of the
//! live entry count and cost.

use serde::Serialize;

// == Cache Stats ==
/// Memory-tier performance counters.
///
/// Counters accumulate for the lifetime of the cache; `total_count` and
/// `total_cost` reflect the state at the moment the snapshot was taken.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries removed by count, cost, or age trimming
    pub evictions: u64,
    /// Live entries at snapshot time
    pub total_count: usize,
    /// Sum of live entries' costs at snapshot time
    pub total_cost: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Fraction of lookups that hit, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }
}
