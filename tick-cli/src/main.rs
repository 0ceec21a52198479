mod cli;
mod cli_modes;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::process::ExitCode;
use tick_core::{Config, Tick, config::parse_utc_offset, parse_input::parse_reference};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use cli_modes::{CliModeResult, decode_mode, write_mode};

fn main() -> ExitCode {
    match run() {
        Ok(CliModeResult::Finish) => ExitCode::SUCCESS,
        Ok(CliModeResult::NothingToDo) => {
            eprintln!("tick: nothing to log, try `tick 9am-11am planning`");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("tick: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<CliModeResult> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = load_config(&cli)?;
    tracing::debug!(?config, "configuration resolved");
    let tick = Tick::with_config(config);

    if cli.decode {
        return decode_mode(&cli, &tick);
    }

    let reference = cli
        .reference
        .as_deref()
        .map(|raw| {
            parse_reference(raw, tick.config.utc_offset)
                .ok_or_else(|| anyhow!("invalid --ref '{raw}', expected RFC 3339 or YYYY-MM-DD"))
        })
        .transpose()?;

    write_mode(&cli, &tick, reference)
}

/// Config file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().context("loading config")?,
    };
    if let Some(user) = &cli.user {
        config.user = user.clone();
    }
    if let Some(raw) = &cli.utc_offset {
        config.utc_offset = parse_utc_offset(raw)
            .ok_or_else(|| anyhow!("invalid --utc-offset '{raw}', expected e.g. +02:00"))?;
    }
    if let Some(policy) = cli.same_clock {
        config.same_clock = policy;
    }
    Ok(config)
}
