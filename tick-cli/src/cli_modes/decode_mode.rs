use super::{CliModeResult, write_mode::print_entry};
use crate::Cli;
use anyhow::{Context, Result, bail};
use std::io::{self, BufRead};
use tick_core::Tick;

/// Prints every record read from stdin. Bad lines are reported and skipped;
/// the run fails if any were bad.
pub fn decode_mode(cli: &Cli, tick: &Tick) -> Result<CliModeResult> {
    let mut failed = 0usize;
    for (n, line) in io::stdin().lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match tick.decode_entry(&line) {
            Ok(entry) => print_entry(cli, tick, &entry)?,
            Err(e) => {
                eprintln!("tick: line {}: {e}", n + 1);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} record(s) could not be decoded");
    }
    Ok(CliModeResult::Finish)
}
