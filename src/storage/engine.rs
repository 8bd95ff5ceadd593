//! Thread-Safe Key-Value Store
//!
//! This module implements the one piece of state every connection shares:
//! a map from keys to values behind a reader/writer lock.
//!
//! ## Locking Discipline
//!
//! ```text
//!   get ──────> read lock ─────────────────────────────> lookup
//!
//!   set ──────> upgradable read ──> upgrade to write ──> insert
//!
//!   delete ───> upgradable read ──> contains? ──no────> False
//!                                      │
//!                                     yes
//!                                      ▼
//!                               upgrade to write ─────> remove
//! ```
//!
//! An upgradable read coexists with ordinary readers and excludes other
//! upgradable readers and writers, so promotion never races another writer
//! and the exclusive window covers only the mutation itself.
//!
//! ## Iteration
//!
//! [`StorageEngine::for_each`] holds the read lock for the whole traversal.
//! [`StorageEngine::snapshot`] copies the entries under a brief read lock so
//! slow visitors (scripts) can run without blocking writers.

use bytes::Bytes;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// The shared key-value store.
///
/// # Thread Safety
///
/// Wrap in an `Arc` and share across all connection tasks. All operations
/// take `&self`.
///
/// # Example
///
/// ```
/// use tidekv::storage::StorageEngine;
/// use bytes::Bytes;
///
/// let engine = StorageEngine::new();
///
/// engine.set(Bytes::from("name"), Bytes::from("tide"));
/// assert_eq!(engine.get(b"name"), Some(Bytes::from("tide")));
///
/// assert!(engine.delete(b"name"));
/// assert!(!engine.delete(b"name"));
/// ```
pub struct StorageEngine {
    data: RwLock<HashMap<Bytes, Bytes>>,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total DEL operations
    del_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("keys", &self.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .field("del_count", &self.del_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
        }
    }

    /// Gets the value for a key.
    ///
    /// Takes the shared lock only; concurrent gets never block each other.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let data = self.data.read();
        data.get(key).cloned()
    }

    /// Sets a key-value pair, overwriting any existing value.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set(&self, key: Bytes, value: Bytes) -> bool {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let data = self.data.upgradable_read();
        let mut data = RwLockUpgradableReadGuard::upgrade(data);

        data.insert(key, value).is_none()
    }

    /// Deletes a key.
    ///
    /// The exclusive lock is only taken when there is something to remove.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was deleted, `false` if it didn't exist.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        let data = self.data.upgradable_read();
        if !data.contains_key(key) {
            return false;
        }

        let mut data = RwLockUpgradableReadGuard::upgrade(data);
        data.remove(key).is_some()
    }

    /// Replaces the values of several keys under a single exclusive hold,
    /// each only if the key still holds `update.previous`.
    ///
    /// Keys deleted or rewritten since `updates` was computed keep their
    /// current state.
    ///
    /// # Returns
    ///
    /// Returns the number of keys whose value was replaced.
    pub fn update_many(&self, updates: Vec<ValueUpdate>) -> usize {
        if updates.is_empty() {
            return 0;
        }
        self.set_count
            .fetch_add(updates.len() as u64, Ordering::Relaxed);

        let data = self.data.upgradable_read();
        let mut data = RwLockUpgradableReadGuard::upgrade(data);

        let mut updated = 0;
        for update in updates {
            match data.get_mut(&update.key) {
                Some(slot) if *slot == update.previous => {
                    *slot = update.value;
                    updated += 1;
                }
                _ => {}
            }
        }
        updated
    }

    /// Calls `visitor` for every entry while holding the read lock.
    ///
    /// Writers wait until the traversal finishes, so the visitor sees one
    /// consistent state. The visitor must not call back into the store's
    /// write operations.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&Bytes, &Bytes),
    {
        let data = self.data.read();
        for (key, value) in data.iter() {
            visitor(key, value);
        }
    }

    /// Copies every entry under a brief read lock.
    ///
    /// Cloning `Bytes` only bumps reference counts, so the copy is cheap
    /// even for large values.
    pub fn snapshot(&self) -> Vec<(Bytes, Bytes)> {
        let data = self.data.read();
        data.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
        }
    }
}

/// A conditional write for [`StorageEngine::update_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueUpdate {
    pub key: Bytes,
    /// The value the key must still hold
    pub previous: Bytes,
    /// The replacement
    pub value: Bytes,
}

impl ValueUpdate {
    pub fn new(key: Bytes, previous: Bytes, value: Bytes) -> Self {
        Self {
            key,
            previous,
            value,
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub keys: u64,
    pub get_ops: u64,
    pub set_ops: u64,
    pub del_ops: u64,
}
