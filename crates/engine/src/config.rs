//! Analysis configuration via `svj.toml`
//!
//! One file describes a run: which sample, where its file list lives, which
//! tree to chain, where outputs go, the loader switches, and the variables
//! to register. Command-line flags override individual fields.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use svj_core::{RecordSource, SvjError, SvjResult, UnsetPolicy, ValueKind};

use crate::loader::{EventLoader, LoaderOptions};
use crate::registry::VarId;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "svj.toml";

/// Tree chained from every file when none is configured.
pub const DEFAULT_TREE_NAME: &str = "Delphes";

/// One `[[variables]]` declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariableSpec {
    /// Variable name; unique across the file
    pub name: String,
    /// `"scalar"`, `"vector"`, `"composite"`, `"lorentz"` or `"tuple"`
    pub kind: ValueKind,
    /// Bound columns in component order
    pub columns: Vec<String>,
}

/// Analysis configuration loaded from `svj.toml`.
///
/// # Example
///
/// ```toml
/// sample = "qcd"
/// file_list = "lists/qcd.txt"
/// output_dir = "out"
/// tree_name = "Delphes"
/// debug = false
/// timing = false
/// strict_lengths = false
/// unset_cuts = "pass"
///
/// [[variables]]
/// name = "jets"
/// kind = "lorentz"
/// columns = ["Jet.PT", "Jet.Eta", "Jet.Phi", "Jet.Mass"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Sample label used in logs and output names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
    /// Text file listing the sample's data files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_list: Option<PathBuf>,
    /// Directory receiving run outputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Tree to chain from every file
    #[serde(default = "default_tree_name")]
    pub tree_name: String,
    /// Log registrations and advances
    #[serde(default)]
    pub debug: bool,
    /// Add elapsed times to debug logs
    #[serde(default)]
    pub timing: bool,
    /// Reject entries whose component columns disagree on length
    #[serde(default)]
    pub strict_lengths: bool,
    /// Whether never-evaluated cuts pass (`"pass"`) or fail (`"fail"`)
    #[serde(default)]
    pub unset_cuts: UnsetPolicy,
    /// Variables registered in file order
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
}

fn default_tree_name() -> String {
    DEFAULT_TREE_NAME.to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample: None,
            file_list: None,
            output_dir: None,
            tree_name: default_tree_name(),
            debug: false,
            timing: false,
            strict_lengths: false,
            unset_cuts: UnsetPolicy::default(),
            variables: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# SVJ analysis configuration
#
# Sample label and the text file listing its data files (one per line).
# sample = "qcd"
# file_list = "lists/qcd.txt"

# Directory for run outputs such as summary.json.
# output_dir = "out"

# Tree chained from every listed file (default: "Delphes")
tree_name = "Delphes"

# Log every registration and entry load, optionally with timings
debug = false
timing = false

# Fail an entry when the columns of one composite variable disagree on length
strict_lengths = false

# Never-evaluated cuts in range queries: "pass" (default) or "fail"
unset_cuts = "pass"

# Variables, registered in the order written.
# kind is one of: scalar, vector, composite, lorentz, tuple
#
# [[variables]]
# name = "met"
# kind = "scalar"
# columns = ["MissingET.MET"]
#
# [[variables]]
# name = "jets"
# kind = "lorentz"
# columns = ["Jet.PT", "Jet.Eta", "Jet.Phi", "Jet.Mass"]
"#
    }

    /// Parse config from TOML text and validate it.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on a parse or validation failure.
    pub fn from_toml_str(content: &str) -> SvjResult<Self> {
        let config: AnalysisConfig = toml::from_str(content)
            .map_err(|e| SvjError::invalid_config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidConfig` if it does not parse
    /// or validate.
    pub fn from_file(path: &Path) -> SvjResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SvjError::InvalidConfig(msg) => {
                SvjError::InvalidConfig(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> SvjResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> SvjResult<()> {
        let content = toml::to_string_pretty(self).map_err(SvjError::serialization)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check declarations without touching any data.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an empty tree name, a repeated variable name, or a
    /// column count outside what the declared kind accepts.
    pub fn validate(&self) -> SvjResult<()> {
        if self.tree_name.trim().is_empty() {
            return Err(SvjError::invalid_config("tree_name must not be empty"));
        }
        let mut seen = HashSet::new();
        for spec in &self.variables {
            if !seen.insert(spec.name.as_str()) {
                return Err(SvjError::invalid_config(format!(
                    "variable '{}' declared twice",
                    spec.name
                )));
            }
            let (min, max) = spec.kind.arity_range();
            let n = spec.columns.len();
            if n < min || n > max {
                return Err(SvjError::invalid_config(format!(
                    "variable '{}' of kind {} has {} columns",
                    spec.name, spec.kind, n
                )));
            }
        }
        Ok(())
    }

    /// Loader switches described by this config
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            debug: self.debug,
            timing: self.timing,
            strict_lengths: self.strict_lengths,
            unset_policy: self.unset_cuts,
        }
    }

    /// Sample label, falling back to the file list's stem
    pub fn sample_name(&self) -> Option<String> {
        self.sample.clone().or_else(|| {
            self.file_list
                .as_ref()
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
        })
    }

    /// Register every declared variable, in file order
    ///
    /// Stops at the first failure; variables before it stay registered.
    pub fn register_variables<S: RecordSource>(
        &self,
        loader: &mut EventLoader<S>,
    ) -> SvjResult<Vec<VarId>> {
        self.variables
            .iter()
            .map(|spec| loader.register(&spec.name, spec.kind, spec.columns.as_slice()))
            .collect()
    }
}
