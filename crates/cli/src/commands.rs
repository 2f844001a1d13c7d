//! Clap command tree definition.
//!
//! Global flags override fields of `svj.toml`; subcommands pick what to do
//! with the resulting loader.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("svj")
        .about("Per-event column loader and cut tracker for SVJ analyses")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("Config file (default: ./svj.toml when present)")
                .global(true),
        )
        .arg(
            Arg::new("sample")
                .long("sample")
                .value_name("NAME")
                .help("Sample label")
                .global(true),
        )
        .arg(
            Arg::new("file-list")
                .long("file-list")
                .short('f')
                .value_name("PATH")
                .help("Text file listing the sample's tree files")
                .global(true),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .short('t')
                .value_name("NAME")
                .help("Tree to chain from every file (default: Delphes)")
                .global(true),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('o')
                .value_name("DIR")
                .help("Directory for run outputs")
                .global(true),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Log every registration and entry load")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("timing")
                .long("timing")
                .help("Add elapsed times to debug logs")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_dump())
        .subcommand(build_scan())
        .subcommand(build_init())
}

fn build_dump() -> Command {
    Command::new("dump")
        .about("Print the loaded variables of the first entries")
        .arg(
            Arg::new("entries")
                .long("entries")
                .short('n')
                .value_name("N")
                .help("Number of entries to dump")
                .value_parser(value_parser!(u64))
                .default_value("1"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output")
                .action(ArgAction::SetTrue),
        )
}

fn build_scan() -> Command {
    Command::new("scan").about("Advance through every entry and report timing")
}

fn build_init() -> Command {
    Command::new("init")
        .about("Write a commented default svj.toml if none exists")
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .help("Where to write the config (default: ./svj.toml)"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let m = build_cli()
            .try_get_matches_from(["svj", "dump", "--file-list", "qcd.txt", "--debug", "-n", "3"])
            .unwrap();
        assert_eq!(m.get_one::<String>("file-list").unwrap(), "qcd.txt");
        assert!(m.get_flag("debug"));
        let (name, sub) = m.subcommand().unwrap();
        assert_eq!(name, "dump");
        assert_eq!(*sub.get_one::<u64>("entries").unwrap(), 3);
        assert!(!sub.get_flag("json"));
    }

    #[test]
    fn test_dump_defaults_to_one_entry() {
        let m = build_cli().try_get_matches_from(["svj", "dump"]).unwrap();
        let (_, sub) = m.subcommand().unwrap();
        assert_eq!(*sub.get_one::<u64>("entries").unwrap(), 1);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(build_cli().try_get_matches_from(["svj", "--debug"]).is_err());
    }

    #[test]
    fn test_entries_must_be_numeric() {
        assert!(build_cli()
            .try_get_matches_from(["svj", "dump", "--entries", "many"])
            .is_err());
    }
}
