#![forbid(unsafe_code)]

//! Persistence of tour progress behind an injectable key-value store.
//!
//! Two layers:
//!
//! - [`KeyValueStore`]: string keys to string values. [`MemoryStore`] keeps
//!   them in memory; [`FileStore`] keeps one JSON file per key.
//! - [`ProgressStore`]: the completed/skipped tour sets the engine loads at
//!   construction and saves after every completion or skip.
//!   [`KvProgressStore`] implements it on top of any [`KeyValueStore`].
//!
//! # Corruption
//!
//! Stored data is never trusted. A value that fails to parse is logged,
//! its key is removed, and the load returns an empty set.
//!
//! # Atomic Writes
//!
//! [`FileStore`] writes use a temp-file-then-rename pattern to prevent
//! corruption on crash.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::StoreError;

/// Key for the completed tour ids.
pub const COMPLETED_TOURS_KEY: &str = "wayfinder.tours.completed";
/// Key for the skipped tour ids.
pub const SKIPPED_TOURS_KEY: &str = "wayfinder.tours.skipped";
/// Key for user-authored tours.
pub const USER_TOURS_KEY: &str = "wayfinder.tours.user";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Directory-backed store: `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_owned(),
            });
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|source| StoreError::Encoding {
                    key: key.to_owned(),
                    source,
                }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Completed/skipped tour persistence.
///
/// Loads never fail: unreadable or corrupted state loads as an empty set.
pub trait ProgressStore {
    fn load_completed_tours(&mut self) -> BTreeSet<String>;
    fn load_skipped_tours(&mut self) -> BTreeSet<String>;
    fn save_completed_tours(&mut self, ids: &BTreeSet<String>) -> Result<(), StoreError>;
    fn save_skipped_tours(&mut self, ids: &BTreeSet<String>) -> Result<(), StoreError>;
}

/// [`ProgressStore`] over a [`KeyValueStore`], storing JSON arrays of ids.
#[derive(Debug, Clone, Default)]
pub struct KvProgressStore<S> {
    store: S,
}

impl<S: KeyValueStore> KvProgressStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn load_set(&mut self, key: &str) -> BTreeSet<String> {
        load_json_or_reset(&mut self.store, key).unwrap_or_default()
    }

    fn save_set(&mut self, key: &str, ids: &BTreeSet<String>) -> Result<(), StoreError> {
        let json = serde_json::to_string(ids)?;
        self.store.set(key, &json)
    }
}

impl<S: KeyValueStore> ProgressStore for KvProgressStore<S> {
    fn load_completed_tours(&mut self) -> BTreeSet<String> {
        self.load_set(COMPLETED_TOURS_KEY)
    }

    fn load_skipped_tours(&mut self) -> BTreeSet<String> {
        self.load_set(SKIPPED_TOURS_KEY)
    }

    fn save_completed_tours(&mut self, ids: &BTreeSet<String>) -> Result<(), StoreError> {
        self.save_set(COMPLETED_TOURS_KEY, ids)
    }

    fn save_skipped_tours(&mut self, ids: &BTreeSet<String>) -> Result<(), StoreError> {
        self.save_set(SKIPPED_TOURS_KEY, ids)
    }
}

/// Read and parse `key`. Missing keys and read failures load as `None`;
/// values that are not valid text or fail to parse are removed.
pub(crate) fn load_json_or_reset<S, T>(store: &mut S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: serde::de::DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) if err.is_corruption() => {
            discard(store, key, &err);
            return None;
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read stored value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            discard(store, key, &err);
            None
        }
    }
}

fn discard<S>(store: &mut S, key: &str, err: &dyn std::error::Error)
where
    S: KeyValueStore + ?Sized,
{
    tracing::warn!(key, error = %err, "discarding corrupted stored value");
    if let Err(err) = store.remove(key) {
        tracing::warn!(key, error = %err, "failed to clear corrupted stored value");
    }
}
