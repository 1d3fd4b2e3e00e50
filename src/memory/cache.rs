//! Memory Cache Module
//!
//! The memory tier: an LRU cache bounded by entry count, total cost, and
//! entry age, fronted by a single cache-wide lock.
//!
//! Every public operation, including limit getters and setters, runs for
//! its full duration under that lock, so configuration changes are
//! linearized with data operations. Nothing here performs I/O, which keeps
//! the critical sections short.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::MemoryCacheConfig;
use crate::memory::entry::CacheEntry;
use crate::memory::linked_index::LinkedIndex;
use crate::memory::stats::CacheStats;

// == Memory Cache ==
/// In-memory LRU cache with count, cost, and age limits.
///
/// Values must be `Clone`; `get` hands back a clone while the entry stays
/// owned by the cache. Wrap large values in `Arc` to make that cheap.
#[derive(Debug)]
pub struct MemoryCache<T> {
    inner: Mutex<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    index: LinkedIndex<T>,
    count_limit: usize,
    cost_limit: u64,
    age_limit: Duration,
    auto_trim_interval: Duration,
    remove_all_on_memory_pressure: bool,
    remove_all_on_backgrounded: bool,
    stats: CacheStats,
}

impl<T: Clone> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoryCache<T> {
    // == Constructors ==
    /// Creates an unbounded cache (no limit evicts until configured).
    pub fn new() -> Self {
        Self::with_config(MemoryCacheConfig::default())
    }

    /// Creates a cache from explicit configuration.
    pub fn with_config(config: MemoryCacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                index: LinkedIndex::new(),
                count_limit: config.count_limit,
                cost_limit: config.cost_limit,
                age_limit: config.age_limit,
                auto_trim_interval: config.auto_trim_interval,
                remove_all_on_memory_pressure: config.remove_all_on_memory_pressure,
                remove_all_on_backgrounded: config.remove_all_on_backgrounded,
                stats: CacheStats::default(),
            }),
        }
    }

    /// Acquires the cache-wide lock, recovering the guard if a previous
    /// holder panicked.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Set ==
    /// Stores a value under `key` with zero cost.
    pub fn set(&self, key: &str, value: T) {
        self.set_with_cost(key, value, 0);
    }

    /// Stores a value under `key` with an application-defined cost.
    ///
    /// An empty key is ignored. A repeat set updates the entry in place
    /// (adjusting the cost aggregate by the delta) and makes it the most
    /// recently used. Crossing the count or cost limit triggers the
    /// matching trim before the call returns.
    pub fn set_with_cost(&self, key: &str, value: T, cost: u64) {
        if key.is_empty() {
            return;
        }

        let mut inner = self.lock();
        match inner.index.handle_of(key) {
            Some(handle) => {
                let old_cost = inner.index.entry_mut(handle).map(|entry| {
                    let old = entry.cost;
                    entry.value = value;
                    entry.cost = cost;
                    entry.last_access = Instant::now();
                    old
                });
                if let Some(old) = old_cost {
                    // Rebuild the cost aggregate around the in-place update.
                    inner.index.adjust_cost(old, cost);
                }
                inner.index.move_to_head(handle);
            }
            None => {
                inner
                    .index
                    .insert_at_head(CacheEntry::new(key.to_string(), value, cost));
            }
        }

        // Trims run synchronously on the state we already hold, so the
        // limit is honored before the lock is released.
        if inner.index.total_count() > inner.count_limit {
            let limit = inner.count_limit;
            inner.trim_to_count(limit);
        }
        if inner.index.total_cost() > inner.cost_limit {
            let limit = inner.cost_limit;
            inner.trim_to_cost(limit);
        }
    }

    // == Get ==
    /// Retrieves a clone of the value for `key`.
    ///
    /// A hit refreshes the entry's access time and makes it the most
    /// recently used. An empty key is a miss.
    pub fn get(&self, key: &str) -> Option<T> {
        if key.is_empty() {
            return None;
        }

        let mut inner = self.lock();
        match inner.index.handle_of(key) {
            Some(handle) => {
                if let Some(entry) = inner.index.entry_mut(handle) {
                    entry.last_access = Instant::now();
                }
                inner.index.move_to_head(handle);
                inner.stats.record_hit();
                inner.index.entry(handle).map(|e| e.value.clone())
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Checks key membership without affecting recency.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().index.contains_key(key)
    }

    // == Remove ==
    /// Removes the entry for `key`; no-op on a miss.
    pub fn remove(&self, key: &str) {
        self.lock().index.remove(key);
    }

    /// Removes every entry.
    pub fn remove_all(&self) {
        self.lock().index.remove_all();
    }

    // == Trim ==
    /// Evicts least-recently-used entries until at most `limit` remain.
    /// A limit of zero clears the cache.
    pub fn trim_to_count(&self, limit: usize) {
        self.lock().trim_to_count(limit);
    }

    /// Evicts least-recently-used entries until the total cost is at most
    /// `limit`. A limit of zero clears the cache.
    pub fn trim_to_cost(&self, limit: u64) {
        self.lock().trim_to_cost(limit);
    }

    /// Evicts entries whose age exceeds `max_age`, walking from the tail.
    ///
    /// The list is recency-ordered, so the walk stops at the first tail
    /// entry that is still fresh. A zero `max_age` clears the cache.
    pub fn trim_to_age(&self, max_age: Duration) {
        self.lock().trim_to_age(max_age);
    }

    /// Applies the configured cost, count, and age limits, in that order.
    ///
    /// This is what the periodic background worker invokes.
    pub fn auto_trim(&self) {
        let mut inner = self.lock();
        let (cost_limit, count_limit, age_limit) =
            (inner.cost_limit, inner.count_limit, inner.age_limit);
        inner.trim_to_cost(cost_limit);
        inner.trim_to_count(count_limit);
        inner.trim_to_age(age_limit);
    }

    // == Lifecycle Signals ==
    /// Reaction to the application's memory-pressure notification.
    ///
    /// Clears the cache when `remove_all_on_memory_pressure` is set; the
    /// surrounding application wires its runtime signal to this call.
    pub fn handle_memory_pressure(&self) {
        let mut inner = self.lock();
        if inner.remove_all_on_memory_pressure {
            debug!("memory pressure signal: clearing memory cache");
            inner.index.remove_all();
        }
    }

    /// Reaction to the application moving to the background.
    pub fn handle_backgrounded(&self) {
        let mut inner = self.lock();
        if inner.remove_all_on_backgrounded {
            debug!("backgrounded signal: clearing memory cache");
            inner.index.remove_all();
        }
    }

    // == Aggregates & Stats ==
    /// Number of live entries.
    pub fn total_count(&self) -> usize {
        self.lock().index.total_count()
    }

    /// Sum of live entries' costs.
    pub fn total_cost(&self) -> u64 {
        self.lock().index.total_cost()
    }

    /// Snapshot of the performance counters and live aggregates.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let mut stats = inner.stats.clone();
        stats.total_count = inner.index.total_count();
        stats.total_cost = inner.index.total_cost();
        stats
    }

    // == Configuration Accessors ==
    // Each accessor takes the cache lock, so limit changes are ordered
    // with respect to data operations.

    /// Maximum number of entries the cache should hold.
    pub fn count_limit(&self) -> usize {
        self.lock().count_limit
    }

    /// Sets the count limit. Takes effect at the next trim.
    pub fn set_count_limit(&self, limit: usize) {
        self.lock().count_limit = limit;
    }

    /// Maximum total cost the cache should hold.
    pub fn cost_limit(&self) -> u64 {
        self.lock().cost_limit
    }

    /// Sets the cost limit. Takes effect at the next trim.
    pub fn set_cost_limit(&self, limit: u64) {
        self.lock().cost_limit = limit;
    }

    /// Maximum entry age before the periodic trim evicts it.
    pub fn age_limit(&self) -> Duration {
        self.lock().age_limit
    }

    /// Sets the age limit. Takes effect at the next trim.
    pub fn set_age_limit(&self, limit: Duration) {
        self.lock().age_limit = limit;
    }

    /// Interval between background trim passes.
    pub fn auto_trim_interval(&self) -> Duration {
        self.lock().auto_trim_interval
    }

    /// Sets the background trim interval. The worker re-reads it every
    /// cycle.
    pub fn set_auto_trim_interval(&self, interval: Duration) {
        self.lock().auto_trim_interval = interval;
    }

    /// Whether a memory-pressure signal clears the cache.
    pub fn remove_all_on_memory_pressure(&self) -> bool {
        self.lock().remove_all_on_memory_pressure
    }

    /// Configures the memory-pressure reaction.
    pub fn set_remove_all_on_memory_pressure(&self, enabled: bool) {
        self.lock().remove_all_on_memory_pressure = enabled;
    }

    /// Whether a backgrounded signal clears the cache.
    pub fn remove_all_on_backgrounded(&self) -> bool {
        self.lock().remove_all_on_backgrounded
    }

    /// Configures the backgrounded reaction.
    pub fn set_remove_all_on_backgrounded(&self, enabled: bool) {
        self.lock().remove_all_on_backgrounded = enabled;
    }
}

// Trim loops operate on the already-locked state; public wrappers above
// never re-enter the lock, so a trim triggered inside `set` cannot
// deadlock.
impl<T> Inner<T> {
    fn trim_to_count(&mut self, limit: usize) {
        if limit == 0 {
            let evicted = self.index.total_count() as u64;
            self.index.remove_all();
            self.stats.record_evictions(evicted);
            return;
        }
        let mut evicted = 0;
        while self.index.total_count() > limit {
            if self.index.remove_tail().is_none() {
                break;
            }
            evicted += 1;
        }
        if evicted > 0 {
            debug!(evicted, limit, "count trim evicted entries");
            self.stats.record_evictions(evicted);
        }
    }

    fn trim_to_cost(&mut self, limit: u64) {
        if limit == 0 {
            let evicted = self.index.total_count() as u64;
            self.index.remove_all();
            self.stats.record_evictions(evicted);
            return;
        }
        let mut evicted = 0;
        while self.index.total_cost() > limit {
            if self.index.remove_tail().is_none() {
                break;
            }
            evicted += 1;
        }
        if evicted > 0 {
            debug!(evicted, limit, "cost trim evicted entries");
            self.stats.record_evictions(evicted);
        }
    }

    fn trim_to_age(&mut self, max_age: Duration) {
        if max_age.is_zero() {
            let evicted = self.index.total_count() as u64;
            self.index.remove_all();
            self.stats.record_evictions(evicted);
            return;
        }
        let mut evicted = 0;
        loop {
            let stale = match self.index.tail_entry() {
                Some(tail) => tail.age() > max_age,
                None => break,
            };
            if !stale {
                break;
            }
            self.index.remove_tail();
            evicted += 1;
        }
        if evicted > 0 {
            debug!(evicted, "age trim evicted entries");
            self.stats.record_evictions(evicted);
        }
    }
}
