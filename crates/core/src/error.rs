//! Error types for the SVJ event loader
//!
//! This module defines all error types used throughout the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Registration errors (`DuplicateName`, `UnknownColumn`, `InvalidArity`) are
//! fatal to setup. Per-record errors (`OutOfRange`, `InconsistentLength`) are
//! surfaced synchronously from `advance` and never retried.

use std::io;
use thiserror::Error;

/// Result type alias for loader operations
pub type SvjResult<T> = std::result::Result<T, SvjError>;

/// Error types for the event loader
#[derive(Debug, Error)]
pub enum SvjError {
    /// A variable with this name is already registered
    #[error("variable '{name}' already exists")]
    DuplicateName {
        /// Offending variable name
        name: String,
    },

    /// The record source has no column with this name
    #[error("unknown column '{name}'")]
    UnknownColumn {
        /// Column name that failed to resolve
        name: String,
    },

    /// Component count outside the range supported by the variable kind
    #[error("variable '{name}' takes {min}..={max} components, got {arity}")]
    InvalidArity {
        /// Variable being registered
        name: String,
        /// Number of components supplied
        arity: usize,
        /// Smallest accepted component count
        min: usize,
        /// Largest accepted component count
        max: usize,
    },

    /// Record index past the end of the dataset
    #[error("entry {index} out of range (dataset has {total} entries)")]
    OutOfRange {
        /// Requested entry
        index: u64,
        /// Total entries in the dataset
        total: u64,
    },

    /// Component columns of one variable disagree on the per-record length
    #[error(
        "variable '{variable}': column '{column}' has {actual} elements, expected {expected}"
    )]
    InconsistentLength {
        /// Variable whose components disagree
        variable: String,
        /// Column with the mismatched length
        column: String,
        /// Length reported by the first component
        expected: usize,
        /// Length reported by `column`
        actual: usize,
    },

    /// Cut range outside `[0, CutKind::COUNT]` or reversed
    #[error("invalid cut range {start}..{end} (table has {count} cuts)")]
    InvalidCutRange {
        /// Range start
        start: usize,
        /// Range end (exclusive)
        end: usize,
        /// Number of cuts in the table
        count: usize,
    },

    /// I/O error (file lists, tree files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration or setup input
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SvjError {
    /// Create a `DuplicateName` error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        SvjError::DuplicateName { name: name.into() }
    }

    /// Create an `UnknownColumn` error
    pub fn unknown_column(name: impl Into<String>) -> Self {
        SvjError::UnknownColumn { name: name.into() }
    }

    /// Create a `Serialization` error from any displayable cause
    pub fn serialization(msg: impl std::fmt::Display) -> Self {
        SvjError::Serialization(msg.to_string())
    }

    /// Create an `InvalidConfig` error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        SvjError::InvalidConfig(msg.into())
    }

    /// True for errors raised while registering variables
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            SvjError::DuplicateName { .. }
                | SvjError::UnknownColumn { .. }
                | SvjError::InvalidArity { .. }
        )
    }

    /// True when an `OutOfRange` error points exactly one past the last entry,
    /// i.e. the caller simply ran off the end of the dataset.
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, SvjError::OutOfRange { index, total } if index == total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_duplicate_name() {
        let err = SvjError::duplicate_name("jets");
        let msg = err.to_string();
        assert!(msg.contains("jets"));
        assert!(msg.contains("already exists"));
    }

    #[test]
    fn test_error_display_unknown_column() {
        let err = SvjError::unknown_column("Jet.PT");
        assert!(err.to_string().contains("Jet.PT"));
    }

    #[test]
    fn test_error_display_invalid_arity() {
        let err = SvjError::InvalidArity {
            name: "jet".to_string(),
            arity: 5,
            min: 2,
            max: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("2..=4"));
        assert!(msg.contains("got 5"));
    }

    #[test]
    fn test_error_display_out_of_range() {
        let err = SvjError::OutOfRange { index: 7, total: 3 };
        let msg = err.to_string();
        assert!(msg.contains("entry 7"));
        assert!(msg.contains("3 entries"));
    }

    #[test]
    fn test_error_display_inconsistent_length() {
        let err = SvjError::InconsistentLength {
            variable: "jet".to_string(),
            column: "Jet.Eta".to_string(),
            expected: 2,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("Jet.Eta"));
        assert!(msg.contains("expected 2"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing.list");
        let err: SvjError = io_err.into();
        assert!(matches!(err, SvjError::Io(_)));
    }

    #[test]
    fn test_registration_error_classification() {
        assert!(SvjError::duplicate_name("x").is_registration_error());
        assert!(SvjError::unknown_column("x").is_registration_error());
        assert!(!SvjError::OutOfRange { index: 0, total: 0 }.is_registration_error());
    }

    #[test]
    fn test_end_of_data_vs_bad_index() {
        assert!(SvjError::OutOfRange { index: 3, total: 3 }.is_end_of_data());
        assert!(!SvjError::OutOfRange { index: 9, total: 3 }.is_end_of_data());
        assert!(!SvjError::invalid_config("x").is_end_of_data());
    }
}
