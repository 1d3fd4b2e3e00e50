//! KV Storage Module
//!
//! The persistent engine behind the disk cache: a SQLite manifest plus a
//! data directory for file-backed values and a trash directory for
//! deferred bulk deletion.
//!
//! The engine is synchronous and not internally reentrant-safe; the owner
//! (`DiskCache`, or a test) must serialize access to an instance, which
//! the `&mut self` receivers make explicit. Two instances must never share
//! a base path.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::disk::item::{StorageItem, StorageMode};
use crate::error::{CacheError, Result};

const DATA_DIR_NAME: &str = "data";
const TRASH_DIR_NAME: &str = "trash";
const MANIFEST_DB_NAME: &str = "manifest.db";

/// Rows deleted per round while trimming to a count bound.
const TRIM_BATCH: usize = 16;

/// Attempts to close the manifest before giving up and dropping the handle.
const CLOSE_RETRIES: usize = 5;

// == KV Storage ==
/// Hybrid key-value store: manifest rows for metadata and small values,
/// standalone files under `data/` for large ones.
#[derive(Debug)]
pub struct KVStorage {
    path: PathBuf,
    data_path: PathBuf,
    trash_path: PathBuf,
    mode: StorageMode,
    /// `None` only after a failed reopen; the store then refuses service.
    conn: Option<Connection>,
    #[cfg(test)]
    fail_next_manifest_write: bool,
}

impl KVStorage {
    // == Constructor ==
    /// Opens (or creates) a store rooted at `path`.
    ///
    /// Ensures the root, data, and trash directories exist and
    /// initializes the manifest database. If the manifest cannot be
    /// opened, the store nukes its own database files, stages the data
    /// directory for reclamation, and retries once; a second failure is
    /// fatal for the instance. Stale trash from a previous run is swept
    /// in the background on every open.
    pub fn open(path: impl AsRef<Path>, mode: StorageMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data_path = path.join(DATA_DIR_NAME);
        let trash_path = path.join(TRASH_DIR_NAME);

        fs::create_dir_all(&path)?;
        fs::create_dir_all(&data_path)?;
        fs::create_dir_all(&trash_path)?;

        let conn = match Self::open_manifest(&path) {
            Ok(conn) => conn,
            Err(first) => {
                warn!(error = %first, "manifest failed to open, resetting storage");
                Self::delete_manifest_files(&path)?;
                stage_to_trash(&data_path, &trash_path)?;
                fs::create_dir_all(&data_path)?;
                Self::open_manifest(&path).map_err(|err| {
                    CacheError::Initialization(format!(
                        "manifest reopen failed after reset: {err}"
                    ))
                })?
            }
        };

        spawn_trash_sweep(trash_path.clone());
        info!(path = %path.display(), ?mode, "kv storage opened");

        Ok(Self {
            path,
            data_path,
            trash_path,
            mode,
            conn: Some(conn),
            #[cfg(test)]
            fail_next_manifest_write: false,
        })
    }

    /// The store's placement mode.
    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Directory holding file-backed values.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    // == Save ==
    /// Saves an item, replacing any previous value for `key`.
    ///
    /// A non-empty `file_name` requests file-backed storage: the file is
    /// written first and the manifest row second, and a manifest failure
    /// rolls the file back, so the manifest never references a file that
    /// was not durably recorded. Without a file name the value is stored
    /// inline. Either placement fails with a mode violation when the
    /// store's mode forbids it.
    pub fn save_item(&mut self, key: &str, value: &[u8], file_name: Option<&str>) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        match file_name {
            Some(name) if !name.is_empty() => self.save_file_backed(key, value, name),
            _ => self.save_inline(key, value),
        }
    }

    fn save_file_backed(&mut self, key: &str, value: &[u8], file_name: &str) -> Result<()> {
        if !self.mode.supports_files() {
            return Err(CacheError::ModeViolation(
                "file-backed save in a relational-only store".to_string(),
            ));
        }

        let file_path = self.data_path.join(file_name);
        fs::write(&file_path, value)?;

        if let Err(err) = self.upsert_row(key, Some(file_name), value.len() as u64, None) {
            // Roll the file back so no orphan outlives the failed save.
            if let Err(cleanup) = fs::remove_file(&file_path) {
                warn!(file = file_name, error = %cleanup, "rollback of data file failed");
            }
            return Err(err);
        }
        Ok(())
    }

    fn save_inline(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if !self.mode.supports_inline() {
            return Err(CacheError::ModeViolation(
                "inline save in a file-only store".to_string(),
            ));
        }

        // An overwrite that shrinks below the caller's threshold must not
        // orphan the previous backing file.
        if self.mode == StorageMode::Mixed {
            if let Some(stale) = self.file_name_of(key)? {
                remove_file_best_effort(&self.data_path.join(&stale), &stale);
            }
        }

        self.upsert_row(key, None, value.len() as u64, Some(value))
    }

    // == Read ==
    /// Reads the item for `key`, including its manifest metadata.
    ///
    /// A manifest row whose backing file has vanished is repaired: the
    /// stray row is deleted and the read reports a miss. Every successful
    /// read refreshes the row's last-access time.
    pub fn get_item(&mut self, key: &str) -> Result<Option<StorageItem>> {
        if key.is_empty() {
            return Ok(None);
        }

        let row = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare_cached(
                "SELECT filename, size, inline_data, modification_time
                 FROM manifest WHERE key = ?1",
            )?;
            stmt.query_row(params![key], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<Vec<u8>>>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .optional()?
        };
        let (file_name, size, inline, mod_time) = match row {
            Some(row) => row,
            None => return Ok(None),
        };
        let file_name = file_name.filter(|name| !name.is_empty());

        let value = match &file_name {
            Some(name) => match fs::read(self.data_path.join(name)) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    warn!(key, file = %name, "backing file missing, repairing manifest row");
                    self.delete_row(key)?;
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            },
            None => inline.unwrap_or_default(),
        };

        let access_time = self.touch_row(key)?;

        Ok(Some(StorageItem {
            key: key.to_string(),
            value,
            file_name,
            size: size as u64,
            mod_time,
            access_time,
        }))
    }

    /// Reads just the value bytes for `key`.
    pub fn get_item_value(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get_item(key)?.map(|item| item.value))
    }

    // == Existence ==
    /// Checks for a manifest row, independent of file presence.
    pub fn item_exists(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("SELECT COUNT(*) FROM manifest WHERE key = ?1")?;
        let count: i64 = stmt.query_row(params![key], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Number of items in the manifest.
    pub fn item_count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("SELECT COUNT(*) FROM manifest")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count as u64)
    }

    // == Remove ==
    /// Removes the item for `key`; no-op on a miss or an empty key.
    ///
    /// File deletion is best-effort: a failure to unlink the backing file
    /// never blocks deletion of the manifest row.
    pub fn remove_item(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        if self.mode != StorageMode::Relational {
            if let Some(name) = self.file_name_of(key)? {
                remove_file_best_effort(&self.data_path.join(&name), &name);
            }
        }
        self.delete_row(key)
    }

    // == Bulk Clear ==
    /// Removes every item, in O(1) as observed by callers.
    ///
    /// Closes the manifest (retrying while SQLite reports it busy),
    /// deletes the database files, renames the whole data directory into
    /// a uniquely named trash subdirectory in one atomic step, recreates
    /// an empty data directory, and reopens a fresh manifest. The staged
    /// trash is deleted on a background worker, so the caller never waits
    /// on filesystem teardown proportional to the data size.
    pub fn remove_all_items(&mut self) -> Result<()> {
        self.close_manifest();
        Self::delete_manifest_files(&self.path)?;

        stage_to_trash(&self.data_path, &self.trash_path)?;
        fs::create_dir_all(&self.data_path)?;
        spawn_trash_sweep(self.trash_path.clone());

        match Self::open_manifest(&self.path) {
            Ok(conn) => {
                self.conn = Some(conn);
                info!("kv storage cleared and reinitialized");
                Ok(())
            }
            Err(err) => Err(CacheError::Initialization(format!(
                "manifest reopen after clear failed: {err}"
            ))),
        }
    }

    // == Count-Bounded Trim ==
    /// Evicts oldest-accessed items until at most `max` remain.
    ///
    /// `u64::MAX` means unbounded (no-op); zero clears the store. The
    /// eviction order comes from the `last_access_time` index, so this
    /// never scans the whole manifest.
    pub fn remove_items_to_fit_count(&mut self, max: u64) -> Result<()> {
        if max == u64::MAX {
            return Ok(());
        }
        if max == 0 {
            return self.remove_all_items();
        }

        loop {
            let count = self.item_count()?;
            if count <= max {
                break;
            }
            let take = usize::min((count - max) as usize, TRIM_BATCH);

            let victims: Vec<(String, Option<String>)> = {
                let conn = self.conn()?;
                let mut stmt = conn.prepare_cached(
                    "SELECT key, filename FROM manifest
                     ORDER BY last_access_time ASC
                     LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![take as i64], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
                })?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            };
            if victims.is_empty() {
                break;
            }

            for (key, file_name) in victims {
                if let Some(name) = file_name.filter(|name| !name.is_empty()) {
                    remove_file_best_effort(&self.data_path.join(&name), &name);
                }
                self.delete_row(&key)?;
            }
            debug!(max, "disk trim pass deleted a batch");
        }
        Ok(())
    }

    // == Manifest Plumbing ==
    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| {
            CacheError::Initialization("manifest database is unavailable".to_string())
        })
    }

    /// Opens the manifest with write-ahead journaling and relaxed
    /// synchronous durability, creating the schema if needed.
    fn open_manifest(base: &Path) -> Result<Connection> {
        let conn = Connection::open(base.join(MANIFEST_DB_NAME))?;
        // journal_mode returns the resulting mode as a row.
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS manifest (
                 key                TEXT PRIMARY KEY,
                 filename           TEXT,
                 size               INTEGER,
                 inline_data        BLOB,
                 modification_time  INTEGER,
                 last_access_time   INTEGER
             );
             CREATE INDEX IF NOT EXISTS idx_manifest_last_access
                 ON manifest (last_access_time);",
        )?;
        Ok(conn)
    }

    /// Closes the manifest, finalizing cached statements and retrying
    /// while SQLite reports the handle busy. As a last resort the handle
    /// is dropped, which finalizes whatever remains.
    fn close_manifest(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        for _ in 0..CLOSE_RETRIES {
            conn.flush_prepared_statement_cache();
            match conn.close() {
                Ok(()) => return,
                Err((returned, err)) => {
                    warn!(error = %err, "manifest close busy, retrying");
                    conn = returned;
                }
            }
        }
        warn!("manifest close kept failing, dropping the handle");
    }

    fn delete_manifest_files(base: &Path) -> Result<()> {
        for name in [
            MANIFEST_DB_NAME,
            "manifest.db-wal",
            "manifest.db-shm",
        ] {
            match fs::remove_file(base.join(name)) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn upsert_row(
        &mut self,
        key: &str,
        file_name: Option<&str>,
        size: u64,
        inline: Option<&[u8]>,
    ) -> Result<()> {
        #[cfg(test)]
        if self.fail_next_manifest_write {
            self.fail_next_manifest_write = false;
            return Err(CacheError::Io(std::io::Error::other(
                "injected manifest write failure",
            )));
        }

        let now = now_ms();
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "INSERT OR REPLACE INTO manifest
                 (key, filename, size, inline_data, modification_time, last_access_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        stmt.execute(params![key, file_name, size as i64, inline, now, now])?;
        Ok(())
    }

    fn file_name_of(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("SELECT filename FROM manifest WHERE key = ?1")?;
        let name = stmt
            .query_row(params![key], |row| row.get::<_, Option<String>>(0))
            .optional()?
            .flatten();
        Ok(name.filter(|name| !name.is_empty()))
    }

    fn delete_row(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("DELETE FROM manifest WHERE key = ?1")?;
        stmt.execute(params![key])?;
        Ok(())
    }

    /// Stamps the row's last-access time, returning the new stamp.
    fn touch_row(&self, key: &str) -> Result<i64> {
        let now = now_ms();
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare_cached("UPDATE manifest SET last_access_time = ?2 WHERE key = ?1")?;
        stmt.execute(params![key, now])?;
        Ok(now)
    }

    #[cfg(test)]
    fn inject_manifest_write_failure(&mut self) {
        self.fail_next_manifest_write = true;
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Unlinks a data file, logging instead of failing; a missing file is
/// already the desired outcome.
fn remove_file_best_effort(path: &Path, name: &str) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(file = name, error = %err, "failed to delete data file");
        }
    }
}

/// Renames the data directory into a uniquely named trash subdirectory.
///
/// A single rename, so a concurrent reader sees either the fully-old or
/// the fully-new directory contents, never a mix.
fn stage_to_trash(data_path: &Path, trash_path: &Path) -> Result<()> {
    if !data_path.exists() {
        return Ok(());
    }
    let staged = trash_path.join(Uuid::new_v4().to_string());
    fs::rename(data_path, &staged)?;
    debug!(staged = %staged.display(), "data directory staged for reclamation");
    Ok(())
}

/// Deletes everything under the trash directory on a dedicated thread.
///
/// The storage engine is synchronous and must be constructible outside
/// any async runtime, so this worker is a plain OS thread. Individual
/// deletion failures are logged and left for the next sweep.
fn spawn_trash_sweep(trash_path: PathBuf) {
    let builder = std::thread::Builder::new().name("cache-trash-sweep".to_string());
    let spawned = builder.spawn(move || {
        let entries = match fs::read_dir(&trash_path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "trash sweep could not list directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(err) = result {
                warn!(path = %path.display(), error = %err, "trash sweep failed to delete");
            }
        }
        debug!("trash sweep finished");
    });
    if let Err(err) = spawned {
        warn!(error = %err, "failed to spawn trash sweep thread");
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open_store(tmp: &TempDir, mode: StorageMode) -> KVStorage {
        KVStorage::open(tmp.path().join("store"), mode).unwrap()
    }

    fn data_files(store: &KVStorage) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(store.data_path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_open_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, StorageMode::Mixed);

        let base = tmp.path().join("store");
        assert!(base.join("data").is_dir());
        assert!(base.join("trash").is_dir());
        assert!(base.join("manifest.db").is_file());
        assert_eq!(store.item_count().unwrap(), 0);
    }

    #[test]
    fn test_inline_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Relational);

        store.save_item("k", b"small value", None).unwrap();
        let item = store.get_item("k").unwrap().unwrap();

        assert_eq!(item.value, b"small value");
        assert_eq!(item.file_name, None);
        assert_eq!(item.size, 11);
        assert!(store.item_exists("k").unwrap());
        assert!(data_files(&store).is_empty());
    }

    #[test]
    fn test_file_backed_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        store.save_item("k", b"large value", Some("abc123")).unwrap();
        let item = store.get_item("k").unwrap().unwrap();

        assert_eq!(item.value, b"large value");
        assert_eq!(item.file_name.as_deref(), Some("abc123"));
        assert_eq!(data_files(&store), vec!["abc123"]);
    }

    #[test]
    fn test_empty_key_is_rejected_on_save() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        let result = store.save_item("", b"v", None);
        assert!(matches!(result, Err(CacheError::InvalidKey)));
        assert!(store.get_item("").unwrap().is_none());
    }

    #[test]
    fn test_mode_violations() {
        let tmp = TempDir::new().unwrap();

        let mut file_only = KVStorage::open(tmp.path().join("f"), StorageMode::File).unwrap();
        let result = file_only.save_item("k", b"v", None);
        assert!(matches!(result, Err(CacheError::ModeViolation(_))));

        let mut relational =
            KVStorage::open(tmp.path().join("r"), StorageMode::Relational).unwrap();
        let result = relational.save_item("k", b"v", Some("name"));
        assert!(matches!(result, Err(CacheError::ModeViolation(_))));

        // Neither failure may leave a partial write behind.
        assert_eq!(file_only.item_count().unwrap(), 0);
        assert_eq!(relational.item_count().unwrap(), 0);
    }

    #[test]
    fn test_read_refreshes_access_time() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        store.save_item("k", b"v", None).unwrap();
        let first = store.get_item("k").unwrap().unwrap();
        sleep(Duration::from_millis(10));
        let second = store.get_item("k").unwrap().unwrap();

        assert!(second.access_time > first.mod_time);
        assert!(second.access_time > first.access_time);
    }

    #[test]
    fn test_inline_overwrite_deletes_stale_file() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        store.save_item("k", b"big", Some("stale-file")).unwrap();
        assert_eq!(data_files(&store), vec!["stale-file"]);

        // Overwrite with an inline value: the old file must not linger.
        store.save_item("k", b"s", None).unwrap();

        assert!(data_files(&store).is_empty());
        let item = store.get_item("k").unwrap().unwrap();
        assert_eq!(item.value, b"s");
        assert_eq!(item.file_name, None);
    }

    #[test]
    fn test_missing_file_repairs_manifest() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        store.save_item("k", b"value", Some("gone")).unwrap();
        fs::remove_file(store.data_path().join("gone")).unwrap();

        // The stray row is repaired away and the read is a plain miss.
        assert!(store.get_item("k").unwrap().is_none());
        assert!(!store.item_exists("k").unwrap());
    }

    #[test]
    fn test_manifest_failure_rolls_back_file() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        store.inject_manifest_write_failure();
        let result = store.save_item("k", b"value", Some("orphan"));

        assert!(result.is_err());
        assert!(data_files(&store).is_empty(), "no orphan file may remain");
        assert!(!store.item_exists("k").unwrap());
    }

    #[test]
    fn test_remove_item_deletes_file_and_row() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        store.save_item("k", b"value", Some("f1")).unwrap();
        store.remove_item("k").unwrap();

        assert!(!store.item_exists("k").unwrap());
        assert!(data_files(&store).is_empty());

        // Removing again (or an empty key) is a quiet no-op.
        store.remove_item("k").unwrap();
        store.remove_item("").unwrap();
    }

    #[test]
    fn test_remove_all_items_clears_and_reopens() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        store.save_item("a", b"inline", None).unwrap();
        store.save_item("b", b"file-backed", Some("fb")).unwrap();

        store.remove_all_items().unwrap();

        assert_eq!(store.item_count().unwrap(), 0);
        assert!(store.get_item("a").unwrap().is_none());
        assert!(data_files(&store).is_empty());

        // The store stays usable on the fresh manifest.
        store.save_item("c", b"again", None).unwrap();
        assert_eq!(store.get_item_value("c").unwrap().unwrap(), b"again");
    }

    #[test]
    fn test_trash_is_swept_in_background() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Mixed);

        store.save_item("a", b"file-backed", Some("fb")).unwrap();
        store.remove_all_items().unwrap();

        let trash = tmp.path().join("store").join("trash");
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            let empty = fs::read_dir(&trash).unwrap().next().is_none();
            if empty {
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "trash was not reclaimed in time"
            );
            sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn test_fit_count_evicts_oldest_accessed() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Relational);

        for key in ["a", "b", "c"] {
            store.save_item(key, b"v", None).unwrap();
            sleep(Duration::from_millis(10));
        }
        // Touch "a" so "b" becomes the oldest-accessed item.
        store.get_item("a").unwrap().unwrap();

        store.remove_items_to_fit_count(2).unwrap();

        assert_eq!(store.item_count().unwrap(), 2);
        assert!(store.item_exists("a").unwrap());
        assert!(!store.item_exists("b").unwrap());
        assert!(store.item_exists("c").unwrap());
    }

    #[test]
    fn test_fit_count_bounds() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp, StorageMode::Relational);

        for i in 0..4 {
            store.save_item(&format!("k{i}"), b"v", None).unwrap();
        }

        // Unbounded max is a no-op.
        store.remove_items_to_fit_count(u64::MAX).unwrap();
        assert_eq!(store.item_count().unwrap(), 4);

        // Zero clears everything.
        store.remove_items_to_fit_count(0).unwrap();
        assert_eq!(store.item_count().unwrap(), 0);
    }

    #[test]
    fn test_reopen_preserves_items() {
        let tmp = TempDir::new().unwrap();
        {
            let mut store = open_store(&tmp, StorageMode::Mixed);
            store.save_item("persist", b"inline", None).unwrap();
            store.save_item("big", b"file-backed", Some("bf")).unwrap();
        }

        let mut store = open_store(&tmp, StorageMode::Mixed);
        assert_eq!(store.get_item_value("persist").unwrap().unwrap(), b"inline");
        assert_eq!(store.get_item_value("big").unwrap().unwrap(), b"file-backed");
    }
}
