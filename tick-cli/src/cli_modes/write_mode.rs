use super::CliModeResult;
use crate::Cli;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tick_core::{Entry, Tick, render::format_entry_line};

pub fn write_mode(cli: &Cli, tick: &Tick, reference: Option<DateTime<Utc>>) -> Result<CliModeResult> {
    if cli.text.is_empty() {
        return Ok(CliModeResult::NothingToDo);
    }
    let inline = cli.text.join(" ");
    let entry = tick.create_entry(&inline, reference);
    print_entry(cli, tick, &entry)?;
    Ok(CliModeResult::Finish)
}

pub(super) fn print_entry(cli: &Cli, tick: &Tick, entry: &Entry) -> Result<()> {
    if cli.json {
        println!("{}", entry.to_json().context("serializing entry")?);
    } else {
        println!(
            "{}",
            format_entry_line(entry, tick.config.utc_offset, &tick.config.display_date_format)
        );
    }
    Ok(())
}
