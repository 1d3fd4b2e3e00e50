//! Disk Cache Module
//!
//! A thin façade over `KVStorage` that owns the size-threshold policy:
//! values larger than the threshold go to standalone files named by a
//! SHA-256 digest of the key, smaller ones are stored inline in the
//! manifest. This is the only place the storage-location decision is
//! made; the engine below is policy-free beyond its configured mode.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sha2::{Digest, Sha256};

use crate::config::DEFAULT_INLINE_THRESHOLD;
use crate::disk::item::{StorageItem, StorageMode};
use crate::disk::kv_storage::KVStorage;
use crate::disk::ValueCodec;
use crate::error::Result;

// == Disk Cache ==
/// Persistent byte-buffer cache with threshold-based placement.
///
/// All operations serialize on one lock around the storage engine and
/// block the calling thread until the filesystem or database call
/// completes.
#[derive(Debug)]
pub struct DiskCache {
    storage: Mutex<KVStorage>,
    inline_threshold: u64,
}

impl DiskCache {
    // == Constructors ==
    /// Opens a disk cache at `path` with the default 20 KiB threshold.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_threshold(path, DEFAULT_INLINE_THRESHOLD)
    }

    /// Opens a disk cache with an explicit inline threshold.
    ///
    /// The threshold fixes the store's mode: zero forces every value into
    /// a file, `u64::MAX` forces every value inline, anything between
    /// selects per item.
    pub fn open_with_threshold(path: impl AsRef<Path>, inline_threshold: u64) -> Result<Self> {
        let mode = match inline_threshold {
            0 => StorageMode::File,
            u64::MAX => StorageMode::Relational,
            _ => StorageMode::Mixed,
        };
        Ok(Self {
            storage: Mutex::new(KVStorage::open(path, mode)?),
            inline_threshold,
        })
    }

    /// The configured inline threshold in bytes.
    pub fn inline_threshold(&self) -> u64 {
        self.inline_threshold
    }

    fn storage(&self) -> MutexGuard<'_, KVStorage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Set ==
    /// Stores `value` under `key`; an empty key is ignored.
    ///
    /// May block the calling thread until the file write finishes.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        let mut storage = self.storage();
        if storage.mode().supports_files() && value.len() as u64 > self.inline_threshold {
            let file_name = file_name_for_key(key);
            storage.save_item(key, value, Some(&file_name))
        } else {
            storage.save_item(key, value, None)
        }
    }

    // == Get ==
    /// Retrieves the value bytes for `key`; an empty key is a miss.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if key.is_empty() {
            return Ok(None);
        }
        self.storage().get_item_value(key)
    }

    /// Retrieves the item with its manifest metadata.
    pub fn get_item(&self, key: &str) -> Result<Option<StorageItem>> {
        if key.is_empty() {
            return Ok(None);
        }
        self.storage().get_item(key)
    }

    // == Contains ==
    /// Checks key membership without reading the value.
    pub fn contains(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        self.storage().item_exists(key)
    }

    // == Remove ==
    /// Removes the value for `key`; no-op on a miss.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.storage().remove_item(key)
    }

    /// Removes every value. Appears instantaneous to callers; the bulk of
    /// the filesystem teardown happens in the background.
    pub fn remove_all(&self) -> Result<()> {
        self.storage().remove_all_items()
    }

    // == Trim ==
    /// Evicts oldest-accessed items until at most `max` remain.
    pub fn trim_to_count(&self, max: u64) -> Result<()> {
        self.storage().remove_items_to_fit_count(max)
    }

    /// Number of stored items.
    pub fn item_count(&self) -> Result<u64> {
        self.storage().item_count()
    }

    // == Codec Convenience ==
    /// Serializes `value` with the caller's codec and stores the bytes.
    pub fn set_with<C: ValueCodec>(&self, codec: &C, key: &str, value: &C::Value) -> Result<()> {
        let bytes = codec.serialize(value)?;
        self.set(key, &bytes)
    }

    /// Retrieves and deserializes the value for `key` with the caller's
    /// codec.
    pub fn get_with<C: ValueCodec>(&self, codec: &C, key: &str) -> Result<Option<C::Value>> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(codec.deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// Content-derived, collision-resistant file name for a key: the SHA-256
/// digest of the key bytes, hex-encoded.
fn file_name_for_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}
