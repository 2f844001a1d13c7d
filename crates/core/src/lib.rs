//! Core types and traits for the SVJ event loader
//!
//! This crate defines the foundational types used throughout the workspace:
//! - SvjError / SvjResult: Error type hierarchy
//! - RecordSource: Trait every column-oriented dataset implements
//! - ColumnHandle, ValueKind: Column references and variable kind tags
//! - CutKind, CutState, UnsetPolicy: The fixed cut enumeration and its values
//! - LorentzVector, Composite: Kinematic objects built from columns

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cuts;
pub mod error;
pub mod kinematics;
pub mod traits;
pub mod types;

pub use cuts::{CutKind, CutState, UnsetPolicy};
pub use error::{SvjError, SvjResult};
pub use kinematics::{wrap_phi, Composite, LorentzVector};
pub use traits::RecordSource;
pub use types::{short_label, ColumnHandle, ValueKind};
