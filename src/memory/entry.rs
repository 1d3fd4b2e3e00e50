//! Cache Entry Module
//!
//! Defines the structure for individual memory-tier entries.

use std::time::Instant;

/// Arena slot handle used by the recency list.
///
/// Entries refer to their neighbors by slot index rather than by
/// reference, so list surgery never touches ownership.
pub(crate) type SlotHandle = usize;

// == Cache Entry ==
/// A single memory-tier entry: the value plus its eviction metadata.
///
/// Entries are owned exclusively by the linked index; the recency links
/// are slot handles into the same arena that holds the entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The key identifying this entry
    pub key: String,
    /// The cached value
    pub value: T,
    /// Application-defined eviction weight
    pub cost: u64,
    /// Moment of the last read or write that touched this entry
    pub last_access: Instant,
    /// Handle of the next-more-recent entry (`None` at the head)
    pub(crate) prev: Option<SlotHandle>,
    /// Handle of the next-less-recent entry (`None` at the tail)
    pub(crate) next: Option<SlotHandle>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a detached entry stamped with the current time.
    pub fn new(key: String, value: T, cost: u64) -> Self {
        Self {
            key,
            value,
            cost,
            last_access: Instant::now(),
            prev: None,
            next: None,
        }
    }

    // == Age ==
    /// Time elapsed since the entry was last touched.
    pub fn age(&self) -> std::time::Duration {
        self.last_access.elapsed()
    }
}
