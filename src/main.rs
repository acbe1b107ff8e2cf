use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug};

use vtfls::cli::Cli;

fn main() {
    let args = Cli::parse();

    // RUST_LOG still applies per module; --log-level sets the default
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    if let Err(err) = vtfls::run(&args) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
