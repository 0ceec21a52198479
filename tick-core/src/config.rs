use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use directories::BaseDirs;
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::dates::DEFAULT_FORMATS;
use crate::keywords::Keywords;
use crate::rollover::SameClockPolicy;

const DEFAULT_DISPLAY_FORMAT: &str = "%a %d %b %Y";

#[derive(Debug, Clone)]
pub struct Config {
    /// Name stamped on every entry. Falls back to `$USER`.
    pub user: String,
    /// Offset clock times are read in. Default is UTC.
    pub utc_offset: FixedOffset,
    /// How `9am-9am` is read (`zero-length` or `full-day`).
    pub same_clock: SameClockPolicy,
    pub input_date_formats: Vec<String>,
    pub display_date_format: String,
    /// Extra date words, alias → existing keyword (eg `ytd = "yesterday"`).
    pub synonyms: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    user: Option<String>,
    /// `"+02:00"`, `"-0500"` or `"Z"`.
    utc_offset: Option<String>,
    same_clock: Option<SameClockPolicy>,
    input_date_formats: Option<Vec<String>>,
    display_date_format: Option<String>,
    /// Optional table:
    /// [synonyms]
    /// ytd = "yesterday"
    /// ayer = "yesterday"
    synonyms: Option<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file_config(FileConfig::default())
    }
}

impl Config {
    /// Loads the first config file found (XDG path, then the native one) and
    /// applies defaults for anything it leaves out. No file at all is fine.
    pub fn load() -> Result<Self> {
        for path in Self::config_file_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Loads a specific config file; unlike [`load`](Self::load) it must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let file_config =
            Self::parse_file(&s).with_context(|| format!("parsing {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(Self::from_file_config(file_config))
    }

    fn from_file_config(file_config: FileConfig) -> Self {
        let utc_offset = match file_config.utc_offset.as_deref() {
            Some(raw) => parse_utc_offset(raw).unwrap_or_else(|| {
                warn!(utc_offset = raw, "unrecognized utc_offset, using UTC");
                Utc.fix()
            }),
            None => Utc.fix(),
        };

        Self {
            user: file_config.user.unwrap_or_else(Self::default_user),
            utc_offset,
            same_clock: file_config.same_clock.unwrap_or_default(),
            input_date_formats: file_config.input_date_formats.unwrap_or_else(|| {
                DEFAULT_FORMATS.iter().map(|f| (*f).to_string()).collect()
            }),
            display_date_format: file_config
                .display_date_format
                .unwrap_or_else(|| DEFAULT_DISPLAY_FORMAT.to_string()),
            synonyms: file_config.synonyms.unwrap_or_default(),
        }
    }

    fn default_user() -> String {
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "anonymous".to_string())
    }

    fn config_file_paths() -> Vec<PathBuf> {
        let mut v = Vec::new();
        if let Some(b) = BaseDirs::new() {
            let xdg = b.home_dir().join(".config").join("tick").join("config.toml");
            v.push(xdg);
            let native = b.config_dir().join("tick").join("config.toml");
            if !v.contains(&native) {
                v.push(native);
            }
        }
        v
    }

    /// Parse a TOML string into `FileConfig`.
    fn parse_file(s: &str) -> Result<FileConfig> {
        Ok(toml::from_str::<FileConfig>(s)?)
    }

    /// A keyword registry with the configured synonyms on top of the built-in
    /// phrases. Synonyms colliding with a canonical keyword (eg "today") are
    /// dropped.
    pub fn keywords(&self) -> Keywords {
        let mut keywords = Keywords::default();
        let pairs: Vec<(String, String)> = self
            .synonyms
            .iter()
            .filter(|(alias, _)| {
                let canonical = Keywords::is_canonical(alias);
                if canonical {
                    warn!(alias = alias.as_str(), "synonym shadows a built-in keyword, ignored");
                }
                !canonical
            })
            .map(|(a, t)| (a.clone(), t.clone()))
            .collect();
        keywords.extend(&pairs);
        keywords
    }

    /// The input formats as the `&str` slice the parser takes.
    pub fn format_strs(&self) -> Vec<&str> {
        self.input_date_formats.iter().map(AsRef::as_ref).collect()
    }
}

/// Parses a UTC offset such as `+02:00`, `-0530`, `+2` or `Z`.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Some(Utc.fix());
    }
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours < 0 || !(0..=59).contains(&minutes) {
        return None;
    }
    let seconds = hours.checked_mul(3600)?.checked_add(minutes * 60)?;
    FixedOffset::east_opt(sign * seconds)
}
