pub mod catalog;
pub mod conversion;
pub mod format;
pub mod storage;
pub mod store;

// Re-export the main entry points
pub use catalog::UnitCatalog;
pub use storage::{BlobStore, InMemoryBlobStore, JsonFileBlobStore, PersistenceGateway, RedbBlobStore};
pub use store::{ToolkitState, ToolkitStore};
