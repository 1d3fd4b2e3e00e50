//! Configuration Module
//!
//! Handles loading and managing memory-tier configuration from environment
//! variables.

use std::env;
use std::time::Duration;

/// Default auto-trim interval in seconds.
pub const DEFAULT_AUTO_TRIM_INTERVAL_SECS: u64 = 5;

/// Default inline-storage threshold for the disk tier, in bytes.
///
/// Values larger than this are written to standalone files; smaller ones
/// live inline in the manifest database.
pub const DEFAULT_INLINE_THRESHOLD: u64 = 20 * 1024;

/// Memory-tier configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. Limits default to unbounded so a fresh cache never evicts
/// until the application opts in.
#[derive(Debug, Clone)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries the cache should hold
    pub count_limit: usize,
    /// Maximum total cost the cache should hold
    pub cost_limit: u64,
    /// Maximum age of an entry before the periodic trim evicts it
    pub age_limit: Duration,
    /// Interval between background trim passes
    pub auto_trim_interval: Duration,
    /// Remove every entry when the application reports memory pressure
    pub remove_all_on_memory_pressure: bool,
    /// Remove every entry when the application moves to the background
    pub remove_all_on_backgrounded: bool,
}

impl MemoryCacheConfig {
    /// Creates a new config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_COUNT_LIMIT` - Maximum entry count (default: unbounded)
    /// - `CACHE_COST_LIMIT` - Maximum total cost (default: unbounded)
    /// - `CACHE_AGE_LIMIT_SECS` - Maximum entry age in seconds (default: unbounded)
    /// - `CACHE_AUTO_TRIM_INTERVAL_SECS` - Trim frequency in seconds (default: 5)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            count_limit: env::var("CACHE_COUNT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.count_limit),
            cost_limit: env::var("CACHE_COST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cost_limit),
            age_limit: env::var("CACHE_AGE_LIMIT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.age_limit),
            auto_trim_interval: env::var("CACHE_AUTO_TRIM_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.auto_trim_interval),
            remove_all_on_memory_pressure: defaults.remove_all_on_memory_pressure,
            remove_all_on_backgrounded: defaults.remove_all_on_backgrounded,
        }
    }
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            count_limit: usize::MAX,
            cost_limit: u64::MAX,
            age_limit: Duration::MAX,
            auto_trim_interval: Duration::from_secs(DEFAULT_AUTO_TRIM_INTERVAL_SECS),
            remove_all_on_memory_pressure: true,
            remove_all_on_backgrounded: true,
        }
    }
}
