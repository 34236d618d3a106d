// sunbridge/src/main.rs
use std::process;

use clap::Parser;
use colored::Colorize;
use sunbridge_common::config::Config;
use sunbridge_common::error::{Result as SbResult, SunbridgeError};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::CliArgs;

fn main() -> SbResult<()> {
    let cli_args = CliArgs::parse();

    let level_filter = match cli_args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("SUNBRIDGE_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();

    let config = Config::load().map_err(|e| {
        SunbridgeError::Config(format!("Could not load configuration: {e}"))
    })?;

    if let Err(e) = cli_args.run(&config) {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }

    debug!("Command completed successfully.");
    Ok(())
}
