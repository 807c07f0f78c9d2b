//! Error types for VICAR label operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Key;

/// Errors that can occur when parsing, editing, or writing VICAR labels.
#[derive(Debug, Error)]
pub enum VicarError {
    /// Malformed label text.
    #[error("invalid label syntax at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A file does not begin with a readable LBLSIZE marker.
    #[error("missing LBLSIZE keyword in {path}")]
    MissingLblsize { path: PathBuf },

    /// Parameter name does not match `[A-Z][A-Z0-9_]*`.
    #[error("invalid parameter name: {name:?}")]
    InvalidName { name: String },

    /// Parameter value fails the value-shape rules.
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    /// First occurrence of a constrained parameter holds a disallowed value.
    #[error("invalid value for {name}: {value}; must be one of {allowed}")]
    ConstrainedValue {
        name: String,
        value: String,
        allowed: &'static str,
    },

    /// A required integer parameter holds a negative or non-integer value.
    #[error("invalid value for {name}: {value}; must be a non-negative integer")]
    RequiredInt { name: String, value: String },

    /// Lookup key does not resolve to any entry.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// Numeric entry index out of range.
    #[error("index {index} out of range")]
    IndexOutOfRange { index: isize },

    /// Occurrence index out of range for a name that does exist.
    #[error("{name} occurrence index out of range")]
    OccurrenceOutOfRange { name: String },

    /// Key resolved, but the entry there does not hold the expected value.
    #[error("key {key} does not have value {value}")]
    ValueMismatch { key: String, value: String },

    /// Attempt to delete the first occurrence of a required parameter.
    #[error("the first occurrence of {name} cannot be deleted")]
    RequiredParameter { name: String },

    /// `reorder` was given keys resolving to the same position.
    #[error("reorder keys must resolve to distinct positions")]
    DuplicateKey,

    /// A write was requested but no file path is known.
    #[error("file path is missing")]
    NoFilePath,

    /// Invalid regular expression supplied as an iterator filter.
    #[error("invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for VICAR label operations.
pub type Result<T> = std::result::Result<T, VicarError>;

impl VicarError {
    /// Create a Syntax error.
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// Create an InvalidName error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Create an InvalidValue error.
    pub fn invalid_value(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a KeyNotFound error.
    pub fn key_not_found(key: &Key) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
        }
    }

    /// Create a ValueMismatch error.
    pub fn value_mismatch(key: &Key, value: impl std::fmt::Display) -> Self {
        Self::ValueMismatch {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a RequiredParameter error.
    pub fn required_parameter(name: impl Into<String>) -> Self {
        Self::RequiredParameter { name: name.into() }
    }
}
