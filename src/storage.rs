// ===============================
// src/storage.rs
// ===============================
//
// Snapshot Store Adapter: transport byte buta untuk satu blob bernama.
// Core memiliki schema isi blob; adapter tidak pernah menafsirkannya.
// - FsStore  : file lokal di bawah satu root dir, replace atomik (tmp+rename).
// - MemStore : map in-process untuk dry run & test.
//
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ahash::AHashMap;
use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("storage io on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    async fn write(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;
}

/// Blob = file di bawah `root`. `content_type` tidak relevan untuk filesystem.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

async fn ensure_parent(path: &Path, key: &str) -> Result<(), StorageError> {
    // Pastikan parent directory ada (kalau ada)
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(|e| StorageError::Io {
                key: key.to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

#[async_trait]
impl SnapshotStore for FsStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match fs::metadata(self.path_for(key)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io { key: key.to_string(), source: e }),
        }
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io { key: key.to_string(), source: e }),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        ensure_parent(&path, key).await?;

        // Tulis ke file temp lalu rename: replace blob jadi atomik
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).await.map_err(|e| StorageError::Io {
            key: key.to_string(),
            source: e,
        })?;
        fs::rename(&tmp, &path).await.map_err(|e| StorageError::Io {
            key: key.to_string(),
            source: e,
        })?;
        debug!(%key, bytes = bytes.len(), "blob written");
        Ok(())
    }
}

/// Store in-memory: STORE_MODE=mem (tidak persist) dan test engine.
#[derive(Default)]
pub struct MemStore {
    blobs: Mutex<AHashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.blobs.lock().expect("memstore lock").contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .lock()
            .expect("memstore lock")
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn write(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<(), StorageError> {
        self.blobs
            .lock()
            .expect("memstore lock")
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
