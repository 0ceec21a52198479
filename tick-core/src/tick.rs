use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::{
    Config,
    entry::{Entry, EntryError},
    keywords::Keywords,
    parse_input::{ParseOptions, ParsedTime, parse_time},
};

/// Entry point bundling a [`Config`] with the keyword registry built from it.
pub struct Tick {
    pub config: Config,
    keywords: Keywords,
}

impl Tick {
    /// Creates a new `Tick` instance, loading configuration from standard paths.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        let keywords = config.keywords();
        Self { config, keywords }
    }

    /// Builds an entry for the configured user. `reference` defaults to now.
    pub fn create_entry(&self, input: &str, reference: Option<DateTime<Utc>>) -> Entry {
        let formats = self.config.format_strs();
        let opts = self.options(reference, &formats);
        Entry::new(self.config.user.as_str(), input, Some(opts))
    }

    /// Reads only the time expression out of `input`.
    pub fn parse(&self, input: &str, reference: Option<DateTime<Utc>>) -> ParsedTime {
        let formats = self.config.format_strs();
        parse_time(input, Some(self.options(reference, &formats)))
    }

    /// Rebuilds an entry from one serialized record.
    pub fn decode_entry(&self, json: &str) -> Result<Entry, EntryError> {
        Entry::from_json(json)
    }

    fn options<'a>(
        &'a self,
        reference: Option<DateTime<Utc>>,
        formats: &'a [&'a str],
    ) -> ParseOptions<'a> {
        ParseOptions {
            reference,
            offset: Some(self.config.utc_offset),
            same_clock: self.config.same_clock,
            keywords: Some(&self.keywords),
            formats: Some(formats),
        }
    }
}
