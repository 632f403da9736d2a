use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, TableDefinition};
use tracing::info;

use super::BlobStore;
use crate::shared::errors::{StorageError, StorageResult};

/// Redb table holding every toolkit blob
/// Key: blob key, Value: JSON bytes
const BLOB_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("measurement_toolkit");

/// Embedded database backend.
///
/// redb is synchronous; every call runs on the blocking pool so the writer
/// task never stalls the runtime.
#[derive(Clone)]
pub struct RedbBlobStore {
    db: Arc<Database>,
}

impl RedbBlobStore {
    /// Open or create the database file and make sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Io(format!("Failed to create data directory: {}", e)))?;
        }

        let db = Database::create(path)
            .map_err(|e| StorageError::Database(format!("Failed to create database: {}", e)))?;

        // Initialize table
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| StorageError::Database(format!("Failed to begin write transaction: {}", e)))?;
            {
                let _table = write_txn
                    .open_table(BLOB_TABLE)
                    .map_err(|e| StorageError::Database(format!("Failed to open table: {}", e)))?;
            }
            write_txn
                .commit()
                .map_err(|e| StorageError::Database(format!("Failed to commit transaction: {}", e)))?;
        }

        info!(path = %path.display(), "opened redb blob store");
        Ok(Self { db: Arc::new(db) })
    }

    fn read_blob(db: &Database, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(format!("Failed to begin read: {}", e)))?;
        let table = read_txn
            .open_table(BLOB_TABLE)
            .map_err(|e| StorageError::Database(format!("Failed to open table: {}", e)))?;
        let value = table
            .get(key)
            .map_err(|e| StorageError::Database(format!("Failed to read entry: {}", e)))?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn write_blob(db: &Database, key: &str, value: &[u8]) -> StorageResult<()> {
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(format!("Failed to begin write: {}", e)))?;
        {
            let mut table = write_txn
                .open_table(BLOB_TABLE)
                .map_err(|e| StorageError::Database(format!("Failed to open table: {}", e)))?;
            table
                .insert(key, value)
                .map_err(|e| StorageError::Database(format!("Failed to insert: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| StorageError::Database(format!("Failed to commit: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for RedbBlobStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::read_blob(&db, &key))
            .await
            .map_err(|e| StorageError::Unavailable(format!("Blocking task failed: {}", e)))?
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::write_blob(&db, &key, &value))
            .await
            .map_err(|e| StorageError::Unavailable(format!("Blocking task failed: {}", e)))?
    }
}
