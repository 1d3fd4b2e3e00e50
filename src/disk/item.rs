//! Storage Item Module
//!
//! The disk tier's per-item record and the per-store placement mode.

// == Storage Mode ==
/// Where a store is allowed to place values.
///
/// The mode is fixed per store at construction; the per-item decision in
/// Mixed mode belongs to `DiskCache`, not the storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Every value lives in a standalone file; inline saves fail
    File,
    /// Every value lives inline in the manifest; file-backed saves fail
    Relational,
    /// A size threshold decides per item between file and inline
    Mixed,
}

impl StorageMode {
    /// Whether file-backed saves are allowed.
    pub fn supports_files(self) -> bool {
        !matches!(self, StorageMode::Relational)
    }

    /// Whether inline saves are allowed.
    pub fn supports_inline(self) -> bool {
        !matches!(self, StorageMode::File)
    }
}

// == Storage Item ==
/// One disk-tier item: the value bytes plus its manifest metadata.
///
/// `file_name` is `Some` exactly when the value lives in a standalone
/// file; an inline value has populated `value` bytes and no file name.
#[derive(Debug, Clone)]
pub struct StorageItem {
    /// The key identifying this item
    pub key: String,
    /// The value bytes
    pub value: Vec<u8>,
    /// Backing file name, `None` for inline values
    pub file_name: Option<String>,
    /// Value size in bytes
    pub size: u64,
    /// Last write time, milliseconds since the Unix epoch
    pub mod_time: i64,
    /// Last successful read time, milliseconds since the Unix epoch
    pub access_time: i64,
}
