//! Record sources for the SVJ event loader
//!
//! This crate provides the concrete datasets the loader runs over:
//! - MemoryTree: one in-memory columnar tree (flat values + offsets)
//! - TreeFile: named trees serialized as JSON or MessagePack
//! - FileCollection: the file list making up one sample
//! - Chain: many trees concatenated into a single entry stream
//!
//! Every source implements [`svj_core::RecordSource`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chain;
pub mod collection;
pub mod file;
pub mod tree;

pub use chain::Chain;
pub use collection::FileCollection;
pub use file::{FileFormat, TreeFile};
pub use tree::{MemoryTree, TreeBuilder};
