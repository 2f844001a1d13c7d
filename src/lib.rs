//! svj-analysis - per-event column loader and cut tracker for SVJ analyses
//!
//! Event records spread over many files are chained into one entry stream.
//! Named variables are bound to the records' columns once, and every
//! `advance` rebuilds their values in place. A fixed table of tri-state cuts
//! records the selection decisions made for each event.
//!
//! # Quick Start
//!
//! ```ignore
//! use svj_analysis::{Chain, CutKind, EventLoader};
//!
//! let chain = Chain::open("lists/qcd.txt".as_ref(), "Delphes")?;
//! let mut loader = EventLoader::new(chain);
//! let jets = loader.register_lorentz("jets", &["Jet.PT", "Jet.Eta", "Jet.Phi", "Jet.Mass"])?;
//!
//! for i in 0..loader.entries() {
//!     loader.advance(i)?;
//!     loader.init_cuts();
//!     let n = loader.lorentz(jets).len();
//!     loader.cut(CutKind::JetCounts, n >= 2);
//!     if loader.cuts_range(0, CutKind::COUNT)? {
//!         // selected
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - `svj-core`: errors, cut kinds, value kinds, kinematics, `RecordSource`
//! - `svj-source`: in-memory trees, tree files, file lists, chains
//! - `svj-engine`: registry, refresh, cut table, loader, dump, config

pub use svj_core::{
    short_label, wrap_phi, ColumnHandle, Composite, CutKind, CutState, LorentzVector,
    RecordSource, SvjError, SvjResult, UnsetPolicy, ValueKind,
};
pub use svj_engine::{
    AnalysisConfig, CompositeHandle, CutTable, DumpGroup, DumpedValue, DumpedVariable,
    EventLoader, LoaderOptions, LorentzHandle, ScalarHandle, Slot, StateDump, TupleHandle,
    TupleList, VarHandle, VarId, Variable, VariableRegistry, VariableSpec, VectorHandle,
    CONFIG_FILE_NAME,
};
pub use svj_source::{Chain, FileCollection, FileFormat, MemoryTree, TreeBuilder, TreeFile};
