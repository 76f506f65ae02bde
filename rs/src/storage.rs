//! File-based snapshot source
//!
//! The engine itself never performs I/O. This module is the retrieval
//! collaborator used by the server: a directory of JSON files exported from
//! the dashboard's document store, each holding one item or an array of items.

use crate::models::InsightItem;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot directory error: {message}")]
    Directory { message: String },
}

/// Source of insight item snapshots
///
/// Abstracts over where candidate items come from (exported files, a
/// database, a remote store).
#[async_trait::async_trait]
pub trait InsightSource: Send + Sync {
    /// Load every item currently available, duplicates included
    async fn load_snapshot(&self) -> crate::Result<Vec<InsightItem>>;
}

/// A snapshot file holds either a single item or a list of items
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Many(Vec<InsightItem>),
    One(InsightItem),
}

/// Snapshot source backed by a directory of JSON files
pub struct FileSource {
    /// Base directory for snapshot files
    snapshot_dir: PathBuf,
}

impl FileSource {
    /// Create a new file source
    ///
    /// The snapshot directory will be created if it doesn't exist.
    pub async fn new<P: AsRef<Path>>(snapshot_dir: P) -> Result<Self, StorageError> {
        let snapshot_dir = snapshot_dir.as_ref().to_path_buf();

        if !snapshot_dir.exists() {
            fs::create_dir_all(&snapshot_dir).await?;
        }

        let metadata = fs::metadata(&snapshot_dir).await?;
        if !metadata.is_dir() {
            return Err(StorageError::Directory {
                message: format!("{} is not a directory", snapshot_dir.display()),
            });
        }

        Ok(Self { snapshot_dir })
    }

    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// Write `items` as the snapshot file `<name>.json`, replacing any previous one
    pub async fn write_items(&self, name: &str, items: &[InsightItem]) -> Result<(), StorageError> {
        let path = self.snapshot_dir.join(format!("{name}.json"));
        let content = serde_json::to_string_pretty(items)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load a single snapshot file
    async fn load_file(&self, path: &Path) -> Result<Vec<InsightItem>, StorageError> {
        let content = fs::read_to_string(path).await?;
        let items = match serde_json::from_str::<SnapshotFile>(&content)? {
            SnapshotFile::Many(items) => items,
            SnapshotFile::One(item) => vec![item],
        };
        Ok(items)
    }

    /// JSON files of the snapshot directory in file-name order
    async fn snapshot_files(&self) -> Result<Vec<PathBuf>, StorageError> {
        let mut entries = fs::read_dir(&self.snapshot_dir).await?;
        let mut paths = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            paths.push(path);
        }

        paths.sort();
        Ok(paths)
    }
}

#[async_trait::async_trait]
impl InsightSource for FileSource {
    async fn load_snapshot(&self) -> crate::Result<Vec<InsightItem>> {
        tracing::info!("Loading insight snapshot from {}", self.snapshot_dir.display());
        let start = std::time::Instant::now();

        let paths = self
            .snapshot_files()
            .await
            .context("Failed to list snapshot directory")?;

        let mut items = Vec::new();
        for path in paths {
            match self.load_file(&path).await {
                Ok(loaded) => items.extend(loaded),
                Err(e) => {
                    tracing::warn!("Failed to load snapshot file {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("Loaded {} insight items in {:?}", items.len(), start.elapsed());
        Ok(items)
    }
}
