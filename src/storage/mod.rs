// src/storage/mod.rs
//! Extension-scoped key/value storage

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::core::FsOps;

pub mod resume_store;

pub use resume_store::{ResumeRecord, ResumeStore};

#[async_trait]
pub trait ExtensionStorage: Send + Sync {
    /// Values for the requested keys; absent keys are simply missing.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    async fn set(&self, items: Map<String, Value>) -> Result<()>;

    async fn remove(&self, keys: &[&str]) -> Result<()>;
}

fn pick(all: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| all.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

/// Storage persisted as a single JSON object on disk.
pub struct FileStorage {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = FsOps::read_file_safe(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Corrupt storage file: {}", self.path.display()))
    }

    async fn write_all(&self, items: &Map<String, Value>) -> Result<()> {
        let content =
            serde_json::to_string_pretty(items).context("Failed to serialize storage")?;
        FsOps::write_file_safe(&self.path, &content).await
    }
}

#[async_trait]
impl ExtensionStorage for FileStorage {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let all = self.read_all().await?;
        Ok(pick(&all, keys))
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        debug!("Storing {} key(s) in {}", items.len(), self.path.display());
        all.extend(items);
        self.write_all(&all).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        for key in keys {
            all.remove(*key);
        }
        self.write_all(&all).await
    }
}

/// Storage that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<Map<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Map<String, Value>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ExtensionStorage for MemoryStorage {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        Ok(pick(&self.lock(), keys))
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        self.lock().extend(items);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut items = self.lock();
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}
