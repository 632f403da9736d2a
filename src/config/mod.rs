//! Toolkit configuration
//!
//! Chooses where the toolkit keeps its data and which blob store backs it.

use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::storage::{BlobStore, InMemoryBlobStore, JsonFileBlobStore, RedbBlobStore};
use crate::shared::errors::{StorageError, StorageResult};

/// File name of the embedded database inside the data directory
pub const DATABASE_FILE: &str = "measurement_toolkit.redb";

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Single redb database file
    #[default]
    Redb,
    /// One JSON file per collection
    JsonFiles,
    /// Nothing survives the process
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitConfig {
    pub data_dir: Option<PathBuf>,
    pub backend: StorageBackend,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        match default_data_dir() {
            Some(dir) => Self::new(dir, StorageBackend::Redb),
            None => {
                warn!("no project data directory available, using in-memory storage");
                Self::in_memory()
            }
        }
    }
}

impl ToolkitConfig {
    pub fn new(data_dir: impl Into<PathBuf>, backend: StorageBackend) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            backend,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            backend: StorageBackend::InMemory,
        }
    }

    /// Build the blob store for the configured backend.
    ///
    /// On-disk backends without a data directory are an error; see
    /// [`open_store_or_fallback`](Self::open_store_or_fallback) for the
    /// forgiving variant.
    pub async fn open_store(&self) -> StorageResult<Arc<dyn BlobStore>> {
        let store: Arc<dyn BlobStore> = match self.backend {
            StorageBackend::InMemory => Arc::new(InMemoryBlobStore::new()),
            StorageBackend::Redb => {
                let dir = self.require_data_dir()?;
                Arc::new(RedbBlobStore::open(dir.join(DATABASE_FILE))?)
            }
            StorageBackend::JsonFiles => {
                let dir = self.require_data_dir()?;
                Arc::new(JsonFileBlobStore::open(dir).await?)
            }
        };
        info!(backend = ?self.backend, "blob store ready");
        Ok(store)
    }

    /// Like [`open_store`](Self::open_store), but falls back to in-memory
    /// storage when the configured backend cannot be opened.
    pub async fn open_store_or_fallback(&self) -> Arc<dyn BlobStore> {
        match self.open_store().await {
            Ok(store) => store,
            Err(e) => {
                warn!(backend = ?self.backend, error = %e, "failed to open blob store, using in-memory fallback");
                Arc::new(InMemoryBlobStore::new())
            }
        }
    }

    fn require_data_dir(&self) -> StorageResult<PathBuf> {
        self.data_dir
            .clone()
            .ok_or_else(|| StorageError::Unavailable("No data directory configured".to_string()))
    }
}

/// Platform data directory for the toolkit, if the platform has one.
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "measurement", "toolkit").map(|dirs| dirs.data_dir().to_path_buf())
}
