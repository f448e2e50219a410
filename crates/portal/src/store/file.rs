//! JSON-file store that persists across process runs.
//!
//! The whole store is one JSON object of string values. Every read loads the
//! file, so separate processes sharing a file see each other's writes; every
//! write replaces the file atomically through a temp file in the same
//! directory. Concurrent writers from different processes are
//! last-write-wins.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use super::memory::BROWSER_QUOTA_BYTES;
use super::{KeyValueStore, StoreError, WriteBatch, apply_to_map, check_quota, used_bytes};

/// A store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    quota: Option<usize>,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path` with the browser quota.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an existing
    /// file is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            quota: Some(BROWSER_QUOTA_BYTES),
            write_lock: Mutex::new(()),
        };

        let dir = store.dir();
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&dir)?;
        }
        store.load()?;

        tracing::debug!(path = %store.path.display(), "Opened file store");
        Ok(store)
    }

    /// Replace the quota; `None` removes the limit.
    #[must_use]
    pub const fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        serde_json::to_writer_pretty(&mut tmp, entries)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.into_keys().collect())
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut entries = self.load()?;
        let before = used_bytes(&entries);
        apply_to_map(&mut entries, batch);
        check_quota(self.quota, before, used_bytes(&entries))?;

        self.save(&entries)
    }
}
