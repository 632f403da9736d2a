//! Persistence for the toolkit collections
//!
//! Each collection is stored as one JSON blob under a fixed key in an opaque
//! async key/value [`BlobStore`]. The [`PersistenceGateway`] owns the codec and
//! the recovery policy: a missing or unreadable blob loads as the typed
//! default, a failed save is logged and dropped.

pub mod json_store;
pub mod redb_store;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::shared::errors::{StorageError, StorageResult};
use crate::shared::settings::ToolkitSettings;
use crate::shared::types::{ConversionHistoryEntry, ConversionPreset, CounterItem, CustomUnit, StopwatchLog};

pub use json_store::JsonFileBlobStore;
pub use redb_store::RedbBlobStore;

/// Maximum number of history entries kept in memory and on disk
pub const MAX_HISTORY_SIZE: usize = 20;

/// Blob keys, one per collection.
pub mod keys {
    pub const SETTINGS: &str = "appmodule.measurement.settings";
    pub const FAVORITES: &str = "appmodule.measurement.favorites";
    pub const HISTORY: &str = "appmodule.measurement.history";
    pub const COUNTERS: &str = "appmodule.measurement.counters";
    pub const CUSTOM_UNITS: &str = "appmodule.measurement.customUnits";
    pub const STOPWATCH: &str = "appmodule.measurement.stopwatch";
}

/// Opaque asynchronous get/set-by-key blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()>;
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Volatile store, used in tests and as the fallback when no on-disk backend
/// can be opened.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;
        Ok(blobs.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;
        blobs.insert(key.to_string(), value);
        Ok(())
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Typed load/save of every toolkit collection over a [`BlobStore`].
///
/// Never returns errors: loads fall back to defaults, saves are best-effort.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn BlobStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBlobStore::new()))
    }

    pub fn store(&self) -> Arc<dyn BlobStore> {
        Arc::clone(&self.store)
    }

    pub async fn load_settings(&self) -> ToolkitSettings {
        self.load::<ToolkitSettings>(keys::SETTINGS)
            .await
            .map(ToolkitSettings::sanitized)
            .unwrap_or_default()
    }

    pub async fn save_settings(&self, settings: &ToolkitSettings) {
        self.save(keys::SETTINGS, settings).await;
    }

    pub async fn load_favorites(&self) -> Vec<ConversionPreset> {
        self.load(keys::FAVORITES).await.unwrap_or_default()
    }

    pub async fn save_favorites(&self, favorites: &[ConversionPreset]) {
        self.save_collection(keys::FAVORITES, favorites).await;
    }

    /// Newest first, whatever order the blob was written in.
    pub async fn load_history(&self) -> Vec<ConversionHistoryEntry> {
        let mut history: Vec<ConversionHistoryEntry> = self.load(keys::HISTORY).await.unwrap_or_default();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history
    }

    /// Only the first [`MAX_HISTORY_SIZE`] entries are written.
    pub async fn save_history(&self, history: &[ConversionHistoryEntry]) {
        let capped = &history[..history.len().min(MAX_HISTORY_SIZE)];
        self.save_collection(keys::HISTORY, capped).await;
    }

    pub async fn load_counters(&self) -> Vec<CounterItem> {
        self.load(keys::COUNTERS).await.unwrap_or_default()
    }

    pub async fn save_counters(&self, counters: &[CounterItem]) {
        self.save_collection(keys::COUNTERS, counters).await;
    }

    pub async fn load_custom_units(&self) -> Vec<CustomUnit> {
        self.load(keys::CUSTOM_UNITS).await.unwrap_or_default()
    }

    pub async fn save_custom_units(&self, units: &[CustomUnit]) {
        self.save_collection(keys::CUSTOM_UNITS, units).await;
    }

    /// Newest first, whatever order the blob was written in.
    pub async fn load_stopwatch_logs(&self) -> Vec<StopwatchLog> {
        let mut logs: Vec<StopwatchLog> = self.load(keys::STOPWATCH).await.unwrap_or_default();
        logs.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        logs
    }

    pub async fn save_stopwatch_logs(&self, logs: &[StopwatchLog]) {
        self.save_collection(keys::STOPWATCH, logs).await;
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key, "no stored blob, using default");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "failed to read blob, using default");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "malformed blob, using default");
                None
            }
        }
    }

    /// JSON has no encoding for NaN or infinity; serde_json would write
    /// `null` and the blob would no longer decode. Such a save is dropped so
    /// the last good blob stays in place.
    async fn save_collection<T: Serialize + FiniteValues>(&self, key: &str, items: &[T]) {
        if let Some(position) = items.iter().position(|item| !item.has_finite_values()) {
            warn!(key, position, "non-finite number in collection, save dropped");
            return;
        }
        self.save(key, items).await;
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "failed to encode blob, save dropped");
                return;
            }
        };

        if let Err(e) = self.store.set(key, bytes).await {
            warn!(key, error = %e, "failed to write blob, save dropped");
        }
    }
}

/// Collection items whose numeric fields must be finite to survive a JSON
/// round trip.
pub(crate) trait FiniteValues {
    fn has_finite_values(&self) -> bool;
}

fn finite_or_none(value: Option<f64>) -> bool {
    value.map_or(true, f64::is_finite)
}

impl FiniteValues for ConversionPreset {
    fn has_finite_values(&self) -> bool {
        finite_or_none(self.last_input_value)
    }
}

impl FiniteValues for ConversionHistoryEntry {
    fn has_finite_values(&self) -> bool {
        self.input_value.is_finite() && self.output_value.is_finite()
    }
}

impl FiniteValues for CounterItem {
    fn has_finite_values(&self) -> bool {
        self.value.is_finite()
            && self.step.is_finite()
            && finite_or_none(self.lower_bound)
            && finite_or_none(self.upper_bound)
    }
}

impl FiniteValues for CustomUnit {
    fn has_finite_values(&self) -> bool {
        self.multiplier_to_base.is_finite()
    }
}

impl FiniteValues for StopwatchLog {
    fn has_finite_values(&self) -> bool {
        self.duration.is_finite()
    }
}
