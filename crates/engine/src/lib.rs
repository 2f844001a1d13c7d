//! Per-event loading engine
//!
//! This crate turns a [`svj_core::RecordSource`] into typed per-event state:
//! - VariableRegistry: named variables bound to source columns
//! - Entry refresh: every slot rebuilt on `advance`
//! - CutTable: tri-state selection ledger with range queries
//! - EventLoader: owned context tying the three together
//! - StateDump: grouped snapshot of the current entry
//! - AnalysisConfig: `svj.toml` run description
//!
//! The engine is single-threaded. One entry is materialized at a time and
//! slot contents are valid until the next `advance`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod cuts;
pub mod diagnostics;
pub mod instrumentation;
pub mod loader;
mod refresh;
pub mod registry;

pub use config::{AnalysisConfig, VariableSpec, CONFIG_FILE_NAME, DEFAULT_TREE_NAME};
pub use cuts::CutTable;
pub use diagnostics::{DumpGroup, DumpedValue, DumpedVariable, StateDump};
pub use instrumentation::{RefreshStats, RefreshTrace};
pub use loader::{EventLoader, LoaderOptions};
pub use registry::{
    ColumnBinding, CompositeHandle, LorentzHandle, ScalarHandle, Slot, TupleHandle, TupleList,
    VarHandle, VarId, Variable, VariableRegistry, VectorHandle,
};
