pub mod types;
pub mod settings;
pub mod errors;

// Re-export error types for convenience
pub use errors::{CommandError, CommandResult, StorageError, StorageResult, ValidationError};
