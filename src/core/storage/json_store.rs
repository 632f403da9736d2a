use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::BlobStore;
use crate::shared::errors::StorageResult;

/// One `<key>.json` file per blob under a directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct JsonFileBlobStore {
    dir: PathBuf,
}

impl JsonFileBlobStore {
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "opened json file blob store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl BlobStore for JsonFileBlobStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileBlobStore::open(dir.path().join("data")).await.unwrap();

        assert_eq!(store.get("appmodule.measurement.counters").await.unwrap(), None);

        store
            .set("appmodule.measurement.counters", b"[]".to_vec())
            .await
            .unwrap();
        assert_eq!(
            store.get("appmodule.measurement.counters").await.unwrap(),
            Some(b"[]".to_vec())
        );
        assert!(dir
            .path()
            .join("data")
            .join("appmodule.measurement.counters.json")
            .exists());
        assert!(!dir
            .path()
            .join("data")
            .join("appmodule.measurement.counters.json.tmp")
            .exists());
    }
}
