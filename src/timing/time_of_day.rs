use std::sync::OnceLock;

use chrono::NaiveTime;
use regex::Regex;
use serde::Serializer;

/// `HH:MM:SS`, the format opening hours are stored and exchanged in.
pub const TIME_FORMAT: &str = "%H:%M:%S";

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}:\d{2}:\d{2}$").expect("time pattern is valid"))
}

/// Parses a strict two-digit `HH:MM:SS` time of day.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    if !time_pattern().is_match(text) {
        return None;
    }
    NaiveTime::parse_from_str(text, TIME_FORMAT).ok()
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn serialize_optional<S: Serializer>(
    time: &Option<NaiveTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => serializer.serialize_str(&format_time_of_day(*time)),
        None => serializer.serialize_none(),
    }
}
