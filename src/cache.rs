//! Persistent key-value cache backed by a single JSON document
//!
//! Used for two bookkeeping jobs: locally created interaction placeholders
//! and UTXOs reserved by in-flight transactions. The whole store is one
//! JSON object; every read re-loads it from the backend (so concurrent
//! writers sharing a backend are observed) and every mutation re-writes
//! the full object. Storage failures are swallowed: a cache that cannot be
//! read behaves as empty, a write that fails is dropped. No error type
//! leaves this module.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage backend for a cache namespace
pub trait CacheBackend: Send + Sync {
    /// Load the serialized store, or `None` when absent or unreadable
    fn load(&self) -> Option<String>;

    /// Persist the serialized store; failures are ignored
    fn store(&self, data: &str);
}

/// Backend persisting the store to one JSON file on disk
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Backend for a named cache under the default cache directory
    /// (`~/.pegbtc-client/cache/<namespace>.json`)
    pub fn new(namespace: &str) -> Self {
        let base = dirs::home_dir()
            .map(|home| home.join(".pegbtc-client").join("cache"))
            .unwrap_or_else(|| PathBuf::from(".pegbtc-client/cache"));
        Self {
            path: base.join(format!("{}.json", namespace)),
        }
    }

    /// Backend at an explicit file path
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CacheBackend for FileBackend {
    fn load(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn store(&self, data: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::debug!("cache directory {} not writable: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, data) {
            log::debug!("cache write to {} failed: {}", self.path.display(), e);
        }
    }
}

/// In-memory backend for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheBackend for MemoryBackend {
    fn load(&self) -> Option<String> {
        match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        }
    }

    fn store(&self, data: &str) {
        if let Ok(mut guard) = self.data.lock() {
            *guard = Some(data.to_string());
        }
    }
}

/// Typed key-value store over a [`CacheBackend`]
pub struct Cache<T> {
    backend: Arc<dyn CacheBackend>,
    _value: PhantomData<fn() -> T>,
}

impl<T> Cache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            _value: PhantomData,
        }
    }

    /// Cache persisted under the default cache directory
    pub fn persistent(namespace: &str) -> Self {
        Self::new(Arc::new(FileBackend::new(namespace)))
    }

    /// Look up a key, re-reading storage first
    pub fn get(&self, key: &str) -> Option<T> {
        self.read().remove(key)
    }

    /// Look up a key, falling back to `default` when absent
    pub fn get_or(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// All keys currently in the store
    pub fn keys(&self) -> Vec<String> {
        self.read().into_keys().collect()
    }

    /// All entries currently in the store
    pub fn entries(&self) -> Vec<(String, T)> {
        self.read().into_iter().collect()
    }

    /// Upsert a key; `None` deletes it instead of storing a null
    pub fn set(&self, key: &str, value: Option<T>) {
        let mut store = self.read();
        match value {
            Some(v) => {
                store.insert(key.to_string(), v);
            }
            None => {
                store.remove(key);
            }
        }
        self.write(&store);
    }

    /// Remove several keys in a single write
    pub fn delete<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut store = self.read();
        for key in keys {
            store.remove(key.as_ref());
        }
        self.write(&store);
    }

    /// Empty the store
    pub fn clear(&self) {
        self.write(&BTreeMap::new());
    }

    fn read(&self) -> BTreeMap<String, T> {
        let Some(raw) = self.backend.load() else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(store) => store,
            Err(e) => {
                log::debug!("cache contents unreadable, starting empty: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn write(&self, store: &BTreeMap<String, T>) {
        match serde_json::to_string(store) {
            Ok(raw) => self.backend.store(&raw),
            Err(e) => log::debug!("cache serialization failed: {}", e),
        }
    }
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _value: PhantomData,
        }
    }
}
