//! Tree files: named trees serialized to disk
//!
//! A tree file holds any number of named [`MemoryTree`]s. The encoding is
//! picked from the file extension:
//!
//! | Extension          | Encoding    |
//! |--------------------|-------------|
//! | `.json`            | JSON        |
//! | `.msgpack`, `.mpk` | MessagePack |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use svj_core::{SvjError, SvjResult};

use crate::tree::MemoryTree;

/// On-disk encoding of a tree file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// serde_json
    Json,
    /// rmp-serde with named fields
    MessagePack,
}

impl FileFormat {
    /// Detect the encoding from a path's extension
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for missing or unsupported extensions.
    pub fn from_path(path: &Path) -> SvjResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some("msgpack") | Some("mpk") => Ok(FileFormat::MessagePack),
            _ => Err(SvjError::invalid_config(format!(
                "unsupported tree file '{}' (expected .json, .msgpack or .mpk)",
                path.display()
            ))),
        }
    }
}

/// Collection of named trees stored in one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeFile {
    trees: BTreeMap<String, MemoryTree>,
}

impl TreeFile {
    /// Empty file
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a tree
    pub fn insert(&mut self, name: impl Into<String>, tree: MemoryTree) -> &mut Self {
        self.trees.insert(name.into(), tree);
        self
    }

    /// Whether a tree with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.trees.contains_key(name)
    }

    /// Tree names in sorted order
    pub fn tree_names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Remove and return a tree
    pub fn take(&mut self, name: &str) -> Option<MemoryTree> {
        self.trees.remove(name)
    }

    /// Read a tree file, detecting the encoding from the extension
    pub fn read(path: &Path) -> SvjResult<Self> {
        let format = FileFormat::from_path(path)?;
        let bytes = fs::read(path).map_err(|e| {
            SvjError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read tree file '{}': {}", path.display(), e),
            ))
        })?;
        match format {
            FileFormat::Json => serde_json::from_slice(&bytes).map_err(|e| {
                SvjError::serialization(format!("'{}': {}", path.display(), e))
            }),
            FileFormat::MessagePack => rmp_serde::from_slice(&bytes).map_err(|e| {
                SvjError::serialization(format!("'{}': {}", path.display(), e))
            }),
        }
    }

    /// Write this file, picking the encoding from the extension
    pub fn write(&self, path: &Path) -> SvjResult<()> {
        let bytes = match FileFormat::from_path(path)? {
            FileFormat::Json => serde_json::to_vec(self).map_err(SvjError::serialization)?,
            FileFormat::MessagePack => {
                rmp_serde::to_vec_named(self).map_err(SvjError::serialization)?
            }
        };
        fs::write(path, bytes)?;
        Ok(())
    }
}
