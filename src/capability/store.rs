// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Durable key/value storage

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{Error, ErrorContext, Result};

/// Durable JSON key/value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a key, `None` if it was never written
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Write several keys as one atomic replacement
    async fn store_many(&self, entries: Vec<(String, Value)>) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, Value>>,
    writes: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key directly
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.values.write().insert(key.into(), value);
    }

    /// Current value of a key
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    /// Number of successful `store_many` calls
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Make subsequent writes fail (simulates a full disk)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get(key))
    }

    async fn store_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::persistence("memory store rejected write"));
        }

        let mut values = self.values.write();
        values.extend(entries);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Store backed by a single JSON document on disk
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    /// Create a store for `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<BTreeMap<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .persistence_context(&format!("parsing {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e).persistence_context(&format!("reading {}", self.path.display())),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        Ok(document.remove(key))
    }

    async fn store_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let _guard = self.lock.lock().await;

        // A corrupt document is replaced rather than blocking every later save
        let mut document = match self.read_document().await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Replacing unreadable state file");
                BTreeMap::new()
            }
        };
        document.extend(entries);

        let bytes = serde_json::to_vec_pretty(&document)?;
        let temp = self.temp_path();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .persistence_context("creating state directory")?;
        }
        tokio::fs::write(&temp, &bytes)
            .await
            .persistence_context(&format!("writing {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .persistence_context(&format!("replacing {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load("domains").await.unwrap().is_none());

        store
            .store_many(vec![("domains".to_string(), json!(["x.com"]))])
            .await
            .unwrap();
        assert_eq!(store.load("domains").await.unwrap(), Some(json!(["x.com"])));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_failure() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let err = store
            .store_many(vec![("isCapturing".to_string(), json!(true))])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(store.get("isCapturing").is_none());
    }

    #[tokio::test]
    async fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        assert!(store.load("sessions").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("state.json"));

        store
            .store_many(vec![
                ("isCapturing".to_string(), json!(true)),
                ("domains".to_string(), json!(["x.com"])),
            ])
            .await
            .unwrap();
        store
            .store_many(vec![("isCapturing".to_string(), json!(false))])
            .await
            .unwrap();

        assert_eq!(store.load("isCapturing").await.unwrap(), Some(json!(false)));
        assert_eq!(store.load("domains").await.unwrap(), Some(json!(["x.com"])));
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = FileStore::new(&path);

        assert!(matches!(store.load("domains").await, Err(Error::Persistence(_))));

        store
            .store_many(vec![("domains".to_string(), json!([]))])
            .await
            .unwrap();
        assert_eq!(store.load("domains").await.unwrap(), Some(json!([])));
    }
}
