//! Key-value persistence behind the session store.
//!
//! The portal never talks to a storage backend directly; it goes through the
//! [`KeyValueStore`] trait so tests can use [`MemoryStore`] and the CLI can use
//! [`FileStore`]. Multi-key writes are expressed as a [`WriteBatch`] and
//! applied atomically: either every operation lands or none does.

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write would exceed the store's size limit.
    #[error("storage quota exceeded: {required} bytes needed, limit is {limit}")]
    QuotaExceeded { limit: usize, required: usize },

    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A previous writer panicked while holding the lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// One operation of a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Set { key: String, value: String },
    Remove { key: String },
}

/// An ordered list of writes applied atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write of `value` under `key`.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Queue a removal of `key`. Removing a missing key is not an error.
    #[must_use]
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Remove { key: key.into() });
        self
    }

    /// Returns true if the batch holds no operation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of queued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// The queued operations in order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

/// A string-to-string store with prefix scans and atomic batches.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Every key currently stored, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Apply every operation of `batch`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written or the result would
    /// exceed its quota. The store is left unchanged in that case.
    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// See [`KeyValueStore::apply`].
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.apply(WriteBatch::new().set(key, value))
    }

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// See [`KeyValueStore::apply`].
    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.apply(WriteBatch::new().remove(key))
    }

    /// Keys starting with `prefix`. Linear scan over [`KeyValueStore::keys`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).apply(batch)
    }
}

/// Apply `batch` to an in-memory map. Shared by the backends.
fn apply_to_map(map: &mut std::collections::BTreeMap<String, String>, batch: WriteBatch) {
    for op in batch.ops {
        match op {
            WriteOp::Set { key, value } => {
                map.insert(key, value);
            }
            WriteOp::Remove { key } => {
                map.remove(&key);
            }
        }
    }
}

/// Bytes used by `map`, counting keys and values.
fn used_bytes(map: &std::collections::BTreeMap<String, String>) -> usize {
    map.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Reject a write that grows the store from `before` to `after` bytes past
/// `quota`. Writes that do not grow the store always pass, so an over-quota
/// store can still be cleaned up.
const fn check_quota(quota: Option<usize>, before: usize, after: usize) -> Result<(), StoreError> {
    match quota {
        Some(limit) if after > limit && after > before => Err(StoreError::QuotaExceeded {
            limit,
            required: after,
        }),
        _ => Ok(()),
    }
}
