//! Disk Tier Module
//!
//! Provides the persistent cache: a hybrid key-value storage engine
//! (SQLite manifest + data files + trash-based bulk deletion) behind a
//! threshold-policy façade.
//!
//! The disk tier stores opaque byte buffers. Turning application values
//! into bytes is the caller's job, expressed through [`ValueCodec`].

mod disk_cache;
mod item;
mod kv_storage;

// Re-export public types
pub use disk_cache::DiskCache;
pub use item::{StorageItem, StorageMode};
pub use kv_storage::KVStorage;

use crate::error::Result;

// == Value Codec ==
/// Caller-supplied serialization collaborator.
///
/// The cache core never interprets value bytes; implementations decide
/// the encoding and report failures as [`crate::CacheError::Codec`].
pub trait ValueCodec {
    /// The application value type this codec handles.
    type Value;

    /// Encodes a value into the bytes the disk tier stores.
    fn serialize(&self, value: &Self::Value) -> Result<Vec<u8>>;

    /// Decodes stored bytes back into a value.
    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Value>;
}
