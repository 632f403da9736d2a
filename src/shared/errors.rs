//! Error types for the toolkit
//!
//! Conversion problems are not errors: they surface as `NaN` / infinity from
//! the conversion engine. What remains is custom unit validation, storage
//! failures (recovered inside the persistence layer) and command errors.

use serde::Serialize;
use thiserror::Error;

/// Rejection reasons for custom unit add/update.
///
/// A rejected mutation leaves the store untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ValidationError {
    #[error("Multiplier must be greater than zero.")]
    InvalidMultiplier,

    #[error("A unit with this symbol already exists.")]
    DuplicateSymbol,

    /// Custom units are linear; categories with a non-linear base unit
    /// (temperature) cannot host them.
    #[error("Custom units are not supported in this category.")]
    UnsupportedCategory,
}

/// Blob store and codec failures
///
/// These never leave the persistence gateway; loads fall back to defaults and
/// saves are dropped after logging.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend cannot serve requests (poisoned lock, stopped task, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Command execution errors
///
/// All variants are serializable for IPC with a front-end shell.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CommandError {
    /// Invalid input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced unit, preset or counter does not exist (anymore)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Custom unit validation failed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Conversion produced NaN or infinity
    #[error("Result is undefined: {0}")]
    UndefinedResult(String),
}

pub type CommandResult<T> = Result<T, CommandError>;
