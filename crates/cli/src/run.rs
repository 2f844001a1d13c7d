//! Subcommand execution.
//!
//! Every subcommand starts from the same resolved [`AnalysisConfig`]: the
//! config file (explicit `--config`, else `./svj.toml` when present, else
//! defaults) with command-line flags layered on top.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::ArgMatches;
use serde::Serialize;
use svj_core::{SvjError, SvjResult};
use svj_engine::{AnalysisConfig, EventLoader, CONFIG_FILE_NAME};
use svj_source::Chain;
use tracing::info;

/// File written to the output directory by `svj scan`.
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Resolve the run configuration from the config file and flag overrides.
pub fn resolve_config(matches: &ArgMatches) -> SvjResult<AnalysisConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => AnalysisConfig::from_file(Path::new(path))?,
        None => {
            let default_path = Path::new(CONFIG_FILE_NAME);
            if default_path.exists() {
                AnalysisConfig::from_file(default_path)?
            } else {
                AnalysisConfig::default()
            }
        }
    };
    apply_overrides(&mut config, matches);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut AnalysisConfig, matches: &ArgMatches) {
    if let Some(sample) = matches.get_one::<String>("sample") {
        config.sample = Some(sample.clone());
    }
    if let Some(list) = matches.get_one::<String>("file-list") {
        config.file_list = Some(PathBuf::from(list));
    }
    if let Some(tree) = matches.get_one::<String>("tree") {
        config.tree_name = tree.clone();
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.output_dir = Some(PathBuf::from(dir));
    }
    if matches.get_flag("debug") {
        config.debug = true;
    }
    if matches.get_flag("timing") {
        config.timing = true;
    }
}

/// Open the configured chain and register the declared variables.
pub fn open_loader(config: &AnalysisConfig) -> SvjResult<EventLoader<Chain>> {
    let file_list = config.file_list.as_deref().ok_or_else(|| {
        SvjError::invalid_config("no file list given (use --file-list or set file_list)")
    })?;
    let chain = Chain::open(file_list, &config.tree_name)?;
    let mut loader = EventLoader::with_options(chain, config.loader_options());
    config.register_variables(&mut loader)?;
    info!(
        target: "svj::cli",
        sample = config.sample_name().as_deref().unwrap_or("-"),
        entries = loader.entries(),
        variables = loader.registry().len(),
        "Opened sample"
    );
    Ok(loader)
}

/// `svj dump`: print the state of the first `entries` entries.
pub fn run_dump<W: Write>(
    loader: &mut EventLoader<Chain>,
    entries: u64,
    json: bool,
    out: &mut W,
) -> SvjResult<()> {
    let n = entries.min(loader.entries());
    for i in 0..n {
        loader.advance(i)?;
        let dump = loader.dump();
        if json {
            writeln!(out, "{}", dump.to_json()?)?;
        } else {
            write!(out, "{}", dump)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Result of a full pass, written as `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    /// Sample label, if known
    pub sample: Option<String>,
    /// Tree chained from every file
    pub tree: String,
    /// Files in the chain
    pub files: usize,
    /// Entries advanced through
    pub entries: u64,
    /// Registered variables
    pub variables: usize,
    /// Wall time of the pass in milliseconds
    pub elapsed_ms: f64,
    /// Refresh timing summary (populated with `perf-trace`)
    pub refresh: String,
}

/// `svj scan`: advance through every entry once.
pub fn run_scan(loader: &mut EventLoader<Chain>, config: &AnalysisConfig) -> SvjResult<ScanSummary> {
    let start = Instant::now();
    for i in 0..loader.entries() {
        loader.advance(i)?;
    }
    let elapsed: Duration = start.elapsed();

    let summary = ScanSummary {
        sample: config.sample_name(),
        tree: config.tree_name.clone(),
        files: loader.source().tree_count(),
        entries: loader.entries(),
        variables: loader.registry().len(),
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        refresh: loader.stats().summary(),
    };
    info!(
        target: "svj::cli",
        entries = summary.entries,
        elapsed_ms = summary.elapsed_ms,
        "Scan complete"
    );

    if let Some(dir) = &config.output_dir {
        write_summary(dir, &summary)?;
    }
    Ok(summary)
}

fn write_summary(dir: &Path, summary: &ScanSummary) -> SvjResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SUMMARY_FILE_NAME);
    let body = serde_json::to_string_pretty(summary).map_err(SvjError::serialization)?;
    fs::write(&path, body)?;
    info!(target: "svj::cli", path = %path.display(), "Wrote summary");
    Ok(path)
}

/// `svj init`: write the default config unless one already exists.
pub fn run_init(path: Option<&str>) -> SvjResult<PathBuf> {
    let path = path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    AnalysisConfig::write_default_if_missing(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;
    use svj_engine::VariableSpec;
    use svj_source::{MemoryTree, TreeFile};
    use svj_core::ValueKind;
    use tempfile::TempDir;

    fn write_sample(dir: &Path) -> PathBuf {
        for (name, rows) in [
            ("a.json", vec![vec![1.0, 2.0], vec![3.0]]),
            ("b.msgpack", vec![vec![]]),
        ] {
            let tree = MemoryTree::from_columns(vec![("Jet.PT", rows)]).unwrap();
            let mut file = TreeFile::new();
            file.insert("Delphes", tree);
            file.write(&dir.join(name)).unwrap();
        }
        let list = dir.join("qcd.txt");
        fs::write(&list, "a.json\nb.msgpack\n").unwrap();
        list
    }

    fn config_for(list: PathBuf, output_dir: Option<PathBuf>) -> AnalysisConfig {
        AnalysisConfig {
            file_list: Some(list),
            output_dir,
            variables: vec![VariableSpec {
                name: "jetPt".into(),
                kind: ValueKind::VectorScalar,
                columns: vec!["Jet.PT".into()],
            }],
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let cfg = dir.path().join("run.toml");
        fs::write(&cfg, "sample = \"from-file\"\ntree_name = \"Events\"\n").unwrap();

        let m = build_cli()
            .try_get_matches_from([
                "svj",
                "--config",
                cfg.to_str().unwrap(),
                "--tree",
                "Delphes",
                "--timing",
                "scan",
            ])
            .unwrap();
        let config = resolve_config(&m).unwrap();
        assert_eq!(config.sample.as_deref(), Some("from-file"));
        assert_eq!(config.tree_name, "Delphes");
        assert!(config.timing);
        assert!(!config.debug);
    }

    #[test]
    fn test_open_without_file_list_fails() {
        let err = open_loader(&AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, SvjError::InvalidConfig(_)));
    }

    #[test]
    fn test_dump_prints_each_entry() {
        let dir = TempDir::new().unwrap();
        let config = config_for(write_sample(dir.path()), None);
        let mut loader = open_loader(&config).unwrap();

        let mut out = Vec::new();
        run_dump(&mut loader, 10, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Entry 0"));
        assert!(text.contains("Entry 2"));
        assert!(text.contains("      { 1, 2 }"));
        assert!(text.contains("      { }"));
        assert_eq!(loader.current_entry(), Some(2));
    }

    #[test]
    fn test_dump_json_lines() {
        let dir = TempDir::new().unwrap();
        let config = config_for(write_sample(dir.path()), None);
        let mut loader = open_loader(&config).unwrap();

        let mut out = Vec::new();
        run_dump(&mut loader, 1, true, &mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["entry"], 0);
    }

    #[test]
    fn test_scan_writes_summary() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("out");
        let config = config_for(write_sample(dir.path()), Some(out_dir.clone()));
        let mut loader = open_loader(&config).unwrap();

        let summary = run_scan(&mut loader, &config).unwrap();
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.sample.as_deref(), Some("qcd"));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join(SUMMARY_FILE_NAME)).unwrap())
                .unwrap();
        assert_eq!(written["entries"], 3);
        assert_eq!(written["variables"], 1);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("svj.toml");
        fs::write(&path, "tree_name = \"Mine\"\n").unwrap();
        let arg = path.to_string_lossy().into_owned();
        run_init(Some(arg.as_str())).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "tree_name = \"Mine\"\n");
    }
}
