//! svj: command-line driver for the SVJ event loader.
//!
//! - `svj dump [-n N] [--json]`: print loaded variables of the first entries
//! - `svj scan`: one full pass, timing and `summary.json`
//! - `svj init [PATH]`: write a commented default `svj.toml`
//!
//! Logging goes to stderr through `tracing-subscriber`; set `RUST_LOG` to
//! change the level (default `info`).

mod commands;
mod run;

use std::io;
use std::process;

use svj_core::SvjResult;
use tracing_subscriber::EnvFilter;

use commands::build_cli;

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("info,svj=debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("debug"));

    if let Err(e) = dispatch(&matches) {
        eprintln!("(error) {}", e);
        process::exit(1);
    }
}

fn dispatch(matches: &clap::ArgMatches) -> SvjResult<()> {
    match matches.subcommand() {
        Some(("init", sub)) => {
            let path = run::run_init(sub.get_one::<String>("path").map(String::as_str))?;
            println!("{}", path.display());
            Ok(())
        }
        Some(("dump", sub)) => {
            let config = run::resolve_config(matches)?;
            let mut loader = run::open_loader(&config)?;
            let entries = sub.get_one::<u64>("entries").copied().unwrap_or(1);
            let stdout = io::stdout();
            run::run_dump(&mut loader, entries, sub.get_flag("json"), &mut stdout.lock())
        }
        Some(("scan", _)) => {
            let config = run::resolve_config(matches)?;
            let mut loader = run::open_loader(&config)?;
            let summary = run::run_scan(&mut loader, &config)?;
            println!(
                "{} entries in {:.3}s ({} files, {} variables)",
                summary.entries,
                summary.elapsed_ms / 1000.0,
                summary.files,
                summary.variables
            );
            Ok(())
        }
        _ => Ok(()),
    }
}
