//! Tiered Cache - a two-tier object cache
//!
//! A fast in-memory tier with LRU eviction under count, cost, and age
//! limits, over a persistent disk tier that keeps small values inline in
//! a SQLite manifest and large values in standalone files.
//!
//! The tiers compose but do not call each other: applications read the
//! [`MemoryCache`] first and consult the [`DiskCache`] on a miss,
//! promoting whatever they find.

pub mod config;
pub mod disk;
pub mod error;
pub mod memory;
pub mod tasks;

pub use config::MemoryCacheConfig;
pub use disk::{DiskCache, KVStorage, StorageItem, StorageMode, ValueCodec};
pub use error::{CacheError, Result};
pub use memory::{CacheStats, MemoryCache};
pub use tasks::spawn_trim_task;
