mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use ascii_cam::config::Config;
use cli::{Args, Command};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Load config: an explicit path must exist, the default path may be missing.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from_explicit(path)?),
        None => match Config::load(None) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using default settings.", e);
                Ok(Config::default())
            }
        },
    }
}

fn run(args: Args) -> Result<()> {
    let Args {
        command, config, ..
    } = args;
    match command {
        Command::Config { action } => cli::handle_config_action(action, config.as_deref()),
        Command::Convert(convert) => cli::run_convert(convert, &load_config(config.as_deref())?),
        Command::Bench(bench) => cli::run_bench(bench, &load_config(config.as_deref())?),
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
