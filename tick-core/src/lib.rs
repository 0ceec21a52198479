pub mod config;
pub mod dates;
pub mod duration;
pub mod entry;
pub mod keywords;
pub mod meridiem;
pub mod military;
pub mod parse_input;
pub mod render;
pub mod rollover;
pub mod tick;
pub mod time_tokens;

pub use config::Config;
pub use duration::Duration;
pub use entry::{Entry, EntryError, EntryId, EntryRecord};
pub use parse_input::{ParseOptions, ParsedTime, parse_time};
pub use rollover::SameClockPolicy;
pub use tick::Tick;
