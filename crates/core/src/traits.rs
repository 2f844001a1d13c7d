//! Core trait for record source abstraction
//!
//! This module defines the `RecordSource` trait that lets the loader run over
//! any column-oriented dataset without knowing how it is stored.

use crate::error::SvjResult;
use crate::types::ColumnHandle;

/// Sequential, column-addressable source of event records
///
/// A source exposes one logical ordered stream of entries, even when it is
/// backed by several files. Exactly one entry is "current" at a time; column
/// reads always refer to the entry most recently passed to [`load`].
///
/// Implementations are single-threaded by contract: the loader never calls a
/// source concurrently.
///
/// [`load`]: RecordSource::load
pub trait RecordSource {
    /// Total number of entries across the whole dataset
    fn total_entries(&self) -> u64;

    /// Make entry `index` current
    ///
    /// # Errors
    ///
    /// Returns `SvjError::OutOfRange` if `index >= total_entries()`, or any
    /// error raised while reading the backing storage.
    fn load(&mut self, index: u64) -> SvjResult<()>;

    /// Resolve a column by name
    ///
    /// # Errors
    ///
    /// Returns `SvjError::UnknownColumn` if no such column exists.
    fn resolve_column(&self, name: &str) -> SvjResult<ColumnHandle>;

    /// Number of elements `column` holds for the current entry
    ///
    /// Returns 0 before the first successful `load`.
    fn column_length(&self, column: ColumnHandle) -> usize;

    /// Value of `column` at `sub_index` for the current entry
    ///
    /// Out-of-bounds sub-indices read as `NaN`.
    fn column_value(&self, column: ColumnHandle, sub_index: usize) -> f64;
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn total_entries(&self) -> u64 {
        (**self).total_entries()
    }

    fn load(&mut self, index: u64) -> SvjResult<()> {
        (**self).load(index)
    }

    fn resolve_column(&self, name: &str) -> SvjResult<ColumnHandle> {
        (**self).resolve_column(name)
    }

    fn column_length(&self, column: ColumnHandle) -> usize {
        (**self).column_length(column)
    }

    fn column_value(&self, column: ColumnHandle, sub_index: usize) -> f64 {
        (**self).column_value(column, sub_index)
    }
}
