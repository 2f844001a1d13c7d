//! File collections: the list of files making up one sample
//!
//! A file list is plain text with one path per line. Blank lines and lines
//! starting with `#` are ignored. Relative paths are resolved against the
//! directory containing the list file.

use std::fs;
use std::path::{Path, PathBuf};
use svj_core::{SvjError, SvjResult};
use tracing::info;

/// Ordered list of tree files for one sample
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCollection {
    name: String,
    files: Vec<PathBuf>,
}

impl FileCollection {
    /// Collection from explicit paths
    pub fn new(name: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    /// Read a file-list text file
    ///
    /// The collection is named after the list file's stem.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the list cannot be read.
    pub fn from_list_file(path: &Path) -> SvjResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SvjError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read file list '{}': {}", path.display(), e),
            ))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let collection = Self::new(name, Self::parse_list(&content, base));
        info!(
            target: "svj::source",
            list = %path.display(),
            files = collection.len(),
            "Loaded file collection"
        );
        Ok(collection)
    }

    /// Parse list content, resolving relative entries against `base`
    pub fn parse_list(content: &str, base: &Path) -> Vec<PathBuf> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                let p = Path::new(line);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    base.join(p)
                }
            })
            .collect()
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Files in list order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the collection has no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
