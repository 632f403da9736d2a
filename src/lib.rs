pub mod api;
pub mod config;
pub mod core;
pub mod shared;

pub use crate::config::{StorageBackend, ToolkitConfig};
pub use crate::core::storage::PersistenceGateway;
pub use crate::core::{ToolkitStore, UnitCatalog};
pub use crate::shared::{CommandError, CommandResult, ValidationError};

/// Open the configured blob store and hydrate a toolkit store from it.
///
/// Falls back to in-memory storage when the configured backend cannot be
/// opened, so the toolkit always starts.
pub async fn open_toolkit(config: &ToolkitConfig) -> ToolkitStore {
    let store = config.open_store_or_fallback().await;
    ToolkitStore::hydrate(PersistenceGateway::new(store)).await
}
