//! Identifier and tag types shared across crates
//!
//! - `ColumnHandle`: opaque reference to a resolved source column
//! - `ValueKind`: discriminates the materialization rule of a variable

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SvjError;

/// Opaque handle to a column resolved by a record source
///
/// Only meaningful for the source that issued it. Handles are resolved once
/// at registration time and stay valid for the lifetime of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnHandle(u32);

impl ColumnHandle {
    /// Wrap a source-specific column index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Source-specific column index
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ColumnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column#{}", self.0)
    }
}

/// Materialization rule of a registered variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Single number from sub-index 0
    Scalar,
    /// Ragged array of numbers
    #[serde(rename = "vector")]
    VectorScalar,
    /// List of 2–4 component composite objects
    Composite,
    /// List of full four-vectors from (pt, eta, phi, mass)
    Lorentz,
    /// List of raw N-wide tuples
    Tuple,
}

impl ValueKind {
    /// Every kind, in dump order
    pub const ALL: [ValueKind; 5] = [
        ValueKind::Scalar,
        ValueKind::VectorScalar,
        ValueKind::Composite,
        ValueKind::Lorentz,
        ValueKind::Tuple,
    ];

    /// Accepted component counts, `(min, max)`
    pub const fn arity_range(self) -> (usize, usize) {
        match self {
            ValueKind::Scalar | ValueKind::VectorScalar => (1, 1),
            ValueKind::Composite => (2, 4),
            ValueKind::Lorentz => (4, 4),
            ValueKind::Tuple => (1, usize::MAX),
        }
    }

    /// Short lowercase name used in configs
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Scalar => "scalar",
            ValueKind::VectorScalar => "vector",
            ValueKind::Composite => "composite",
            ValueKind::Lorentz => "lorentz",
            ValueKind::Tuple => "tuple",
        }
    }

    /// Heading used when dumping the current state
    pub const fn heading(self) -> &'static str {
        match self {
            ValueKind::Scalar => "SINGLE VARIABLES",
            ValueKind::VectorScalar => "VECTOR VARIABLES",
            ValueKind::Composite => "COMPOSITE VECTORS",
            ValueKind::Lorentz => "LORENTZ VECTORS",
            ValueKind::Tuple => "TUPLE VECTORS",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = SvjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SvjError::invalid_config(format!("unknown variable kind '{}'", s)))
    }
}

/// Last dot-separated segment of a column name (`"Jet.PT"` → `"PT"`)
pub fn short_label(column: &str) -> &str {
    column
        .rsplit('.')
        .find(|segment| !segment.is_empty())
        .unwrap_or(column)
}
