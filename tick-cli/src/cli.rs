use clap::Parser;
use std::path::PathBuf;
use tick_core::SameClockPolicy;

/// tick — log work from plain sentences like `1-3pm code review #client`
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Resolve relative phrases against this instant instead of now
    /// (RFC 3339, or `YYYY-MM-DD` for local midnight).
    #[arg(long = "ref", value_name = "WHEN")]
    pub reference: Option<String>,
    /// Name stored on the entry. Overrides `user` from the config file.
    #[arg(long, env = "TICK_USER")]
    pub user: Option<String>,
    /// Offset clock times are read in, e.g. `+02:00`. Overrides the config file.
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true)]
    pub utc_offset: Option<String>,
    /// How a range like `9am-9am` is read: `zero-length` or `full-day`.
    #[arg(long, value_name = "POLICY")]
    pub same_clock: Option<SameClockPolicy>,
    /// Print the serialized entry record instead of a summary line.
    #[arg(long)]
    pub json: bool,
    /// Read JSON entry records from stdin, one per line, and print them.
    #[arg(long, conflicts_with = "text")]
    pub decode: bool,
    /// Use this config file instead of the standard locations.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Log parser decisions to stderr.
    #[arg(long, short)]
    pub verbose: bool,
    /// The entry text (e.g., `tick yesterday 11pm-2am deploy #ops`).
    #[arg()]
    pub text: Vec<String>,
}
