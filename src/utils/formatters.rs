use crate::plan::Freshness;
use chrono::{DateTime, Local};
use colored::Colorize;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Formats a count with an English plural of `noun`
#[must_use]
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else if let Some(stem) = noun.strip_suffix('y') {
        format!("{count} {stem}ies")
    } else {
        format!("{count} {noun}s")
    }
}

/// Returns the colored reason tag shown next to a planned conversion
#[must_use]
pub fn colored_reason(reason: Freshness) -> String {
    let name = reason.name();
    match reason {
        Freshness::Missing => name.green().to_string(),
        Freshness::Stale => name.yellow().to_string(),
        Freshness::Current => name.bright_black().to_string(),
    }
}

/// Formats a conversion as `source -> destination`
#[must_use]
pub fn format_conversion(source: &Path, destination: &Path) -> String {
    format!("{} -> {}", source.display(), destination.display())
}

/// Formats a modification time in local time
#[must_use]
pub fn format_timestamp(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats an elapsed duration, rounded to milliseconds
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}
