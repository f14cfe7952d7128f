//! # Error Types
//!
//! Structured error types for costing_core. The calculator itself never fails;
//! these errors come from the collaborators around it (sheet storage, ID
//! sequencing, settings files and report rendering).
//!
//! ## Example
//!
//! ```rust
//! use costing_core::errors::{CostError, CostResult};
//!
//! fn require_company(company: &str) -> CostResult<()> {
//!     if company.trim().is_empty() {
//!         return Err(CostError::missing_field("company"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_company("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for costing_core operations
pub type CostResult<T> = Result<T, CostError>;

/// Structured error type for storage and reporting operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CostError {
    /// An input value is invalid
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// No stored record carries the requested key
    #[error("Record not found: {key} in table '{table}'")]
    RecordNotFound { table: String, key: String },

    /// A row with the same key column value already exists
    #[error("Duplicate key: {key} already exists in table '{table}'")]
    DuplicateKey { table: String, key: String },

    /// The table has not been initialized in the store
    #[error("Table not found: '{table}'")]
    TableNotFound { table: String },

    /// Every attempt to claim a fresh identifier collided with another writer
    #[error("Could not allocate a unique ID for table '{table}' after {attempts} attempts")]
    IdExhausted { table: String, attempts: u32 },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another process
    #[error("File locked: '{path}' is locked by {locked_by}")]
    FileLocked { path: String, locked_by: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Settings file could not be parsed
    #[error("Config error in '{path}': {reason}")]
    ConfigError { path: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CostError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CostError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CostError::MissingField {
            field: field.into(),
        }
    }

    /// Create a RecordNotFound error
    pub fn record_not_found(table: impl Into<String>, key: impl Into<String>) -> Self {
        CostError::RecordNotFound {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a DuplicateKey error
    pub fn duplicate_key(table: impl Into<String>, key: impl Into<String>) -> Self {
        CostError::DuplicateKey {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a TableNotFound error
    pub fn table_not_found(table: impl Into<String>) -> Self {
        CostError::TableNotFound { table: table.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CostError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>) -> Self {
        CostError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CostError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CostError::FileLocked { .. } | CostError::DuplicateKey { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CostError::InvalidInput { .. } => "INVALID_INPUT",
            CostError::MissingField { .. } => "MISSING_FIELD",
            CostError::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            CostError::DuplicateKey { .. } => "DUPLICATE_KEY",
            CostError::TableNotFound { .. } => "TABLE_NOT_FOUND",
            CostError::IdExhausted { .. } => "ID_EXHAUSTED",
            CostError::FileError { .. } => "FILE_ERROR",
            CostError::FileLocked { .. } => "FILE_LOCKED",
            CostError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CostError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CostError::ConfigError { .. } => "CONFIG_ERROR",
            CostError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CostError {
    fn from(e: serde_json::Error) -> Self {
        CostError::serialization(e.to_string())
    }
}
