//! Chain: several trees concatenated into one logical entry stream
//!
//! ## Index mapping
//!
//! `starts[t]` is the global index of tree `t`'s first entry. A global index
//! maps to the last tree whose start is `<= index`; empty trees share their
//! start with the next tree and are therefore never selected.
//!
//! ## Columns
//!
//! Only columns present in every tree are resolvable. Each shared column gets
//! one chain-level handle; `column_map[handle][tree]` is that column's handle
//! inside the individual tree.

use rustc_hash::FxHashMap;
use std::path::Path;
use svj_core::{ColumnHandle, RecordSource, SvjError, SvjResult};
use tracing::{debug, info, warn};

use crate::collection::FileCollection;
use crate::file::TreeFile;
use crate::tree::MemoryTree;

/// Concatenation of trees sharing a column schema
#[derive(Debug, Clone)]
pub struct Chain {
    trees: Vec<MemoryTree>,
    starts: Vec<u64>,
    total: u64,
    columns: FxHashMap<String, u32>,
    names: Vec<String>,
    column_map: Vec<Vec<ColumnHandle>>,
    current_tree: Option<usize>,
}

impl Chain {
    /// Chain the given trees in order
    pub fn from_trees(trees: Vec<MemoryTree>) -> Self {
        let mut starts = Vec::with_capacity(trees.len());
        let mut total = 0u64;
        for tree in &trees {
            starts.push(total);
            total += tree.entries();
        }

        let mut columns = FxHashMap::default();
        let mut names = Vec::new();
        let mut column_map = Vec::new();
        if let Some(first) = trees.first() {
            for name in first.column_names() {
                let handles: Option<Vec<ColumnHandle>> = trees
                    .iter()
                    .map(|t| t.resolve_column(name).ok())
                    .collect();
                match handles {
                    Some(handles) => {
                        columns.insert(name.to_string(), column_map.len() as u32);
                        names.push(name.to_string());
                        column_map.push(handles);
                    }
                    None => {
                        debug!(target: "svj::source", column = name, "Column missing from some trees; not chained");
                    }
                }
            }
        }

        Self {
            trees,
            starts,
            total,
            columns,
            names,
            column_map,
            current_tree: None,
        }
    }

    /// Open every file of a file list and chain the trees named `tree_name`
    ///
    /// Files that do not contain `tree_name` are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the list or any file cannot be read, or
    /// `InvalidConfig` if no file contains the tree.
    pub fn open(file_list: &Path, tree_name: &str) -> SvjResult<Self> {
        let collection = FileCollection::from_list_file(file_list)?;
        Self::open_collection(&collection, tree_name)
    }

    /// Chain the trees named `tree_name` from an existing collection
    pub fn open_collection(collection: &FileCollection, tree_name: &str) -> SvjResult<Self> {
        let mut trees = Vec::with_capacity(collection.len());
        for path in collection.files() {
            let mut file = TreeFile::read(path)?;
            match file.take(tree_name) {
                Some(tree) => trees.push(tree),
                None => warn!(
                    target: "svj::source",
                    file = %path.display(),
                    tree = tree_name,
                    "File has no such tree; skipping"
                ),
            }
        }
        if trees.is_empty() {
            return Err(SvjError::invalid_config(format!(
                "no file in collection '{}' contains tree '{}'",
                collection.name(),
                tree_name
            )));
        }
        let chain = Self::from_trees(trees);
        info!(
            target: "svj::source",
            collection = collection.name(),
            tree = tree_name,
            files = chain.tree_count(),
            entries = chain.total,
            "Created file chain"
        );
        Ok(chain)
    }

    /// Number of chained trees
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Index of the tree holding the current entry
    pub fn current_tree(&self) -> Option<usize> {
        self.current_tree
    }

    /// Names of the columns resolvable through the chain, in the first
    /// tree's declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Split a global index into `(tree, local entry)`
    pub fn locate(&self, index: u64) -> Option<(usize, u64)> {
        if index >= self.total {
            return None;
        }
        let tree = self.starts.partition_point(|&start| start <= index) - 1;
        Some((tree, index - self.starts[tree]))
    }

    #[inline]
    fn local_handle(&self, column: ColumnHandle) -> Option<(&MemoryTree, ColumnHandle)> {
        let tree = self.current_tree?;
        let handle = *self.column_map.get(column.index())?.get(tree)?;
        Some((&self.trees[tree], handle))
    }
}

impl RecordSource for Chain {
    fn total_entries(&self) -> u64 {
        self.total
    }

    fn load(&mut self, index: u64) -> SvjResult<()> {
        let (tree, local) = self.locate(index).ok_or(SvjError::OutOfRange {
            index,
            total: self.total,
        })?;
        self.trees[tree].load(local)?;
        if let Some(previous) = self.current_tree {
            if previous != tree {
                self.trees[previous].unload();
            }
        }
        self.current_tree = Some(tree);
        Ok(())
    }

    fn resolve_column(&self, name: &str) -> SvjResult<ColumnHandle> {
        self.columns
            .get(name)
            .map(|&i| ColumnHandle::new(i))
            .ok_or_else(|| SvjError::unknown_column(name))
    }

    #[inline]
    fn column_length(&self, column: ColumnHandle) -> usize {
        match self.local_handle(column) {
            Some((tree, handle)) => tree.column_length(handle),
            None => 0,
        }
    }

    #[inline]
    fn column_value(&self, column: ColumnHandle, sub_index: usize) -> f64 {
        match self.local_handle(column) {
            Some((tree, handle)) => tree.column_value(handle, sub_index),
            None => f64::NAN,
        }
    }
}
