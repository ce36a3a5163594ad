//! Duration codec.
//!
//! Converts between minute counts, [`Duration`] values and the compact text
//! form used on the board (`"1w2d3h10m"`).

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Duration, MINUTES_PER_DAY, MINUTES_PER_HOUR, MINUTES_PER_WEEK};

// ASCII digits only, a Unicode `\d` would accept other scripts.
static WEEKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)w").unwrap());
static DAYS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)d").unwrap());
static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)h").unwrap());
static MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)m").unwrap());

/// Split a minute count into weeks, days, hours and minutes.
///
/// The result is always canonical: `days <= 4`, `hours <= 7`, `minutes <= 59`.
pub fn minutes_to_duration(total: u64) -> Duration {
    let within_week = total % MINUTES_PER_WEEK;
    Duration {
        weeks: total / MINUTES_PER_WEEK,
        days: within_week / MINUTES_PER_DAY,
        hours: within_week % MINUTES_PER_DAY / MINUTES_PER_HOUR,
        minutes: total % MINUTES_PER_HOUR,
    }
}

/// Render a duration as `<n>w<n>d<n>h<n>m`, leaving out zero units.
///
/// Fields are written as they are; nothing is renormalized. An all-zero
/// duration renders as an empty string.
pub fn duration_to_string(duration: &Duration) -> String {
    let mut out = String::new();
    for (value, unit) in [
        (duration.weeks, 'w'),
        (duration.days, 'd'),
        (duration.hours, 'h'),
        (duration.minutes, 'm'),
    ] {
        if value > 0 {
            out.push_str(&value.to_string());
            out.push(unit);
        }
    }
    out
}

/// Parse free-form duration text.
///
/// Each unit is looked up independently: the first `<digits><unit>` match
/// anywhere in the string wins, later repeats and any other characters are
/// ignored. Missing units are zero, so this never fails. Numbers too large
/// for `u64` saturate.
pub fn string_to_duration(s: &str) -> Duration {
    Duration {
        weeks: first_match(&WEEKS_RE, s),
        days: first_match(&DAYS_RE, s),
        hours: first_match(&HOURS_RE, s),
        minutes: first_match(&MINUTES_RE, s),
    }
}

/// Total minutes in a duration. Accepts non-canonical fields.
pub fn duration_to_minutes(duration: &Duration) -> u64 {
    duration
        .weeks
        .saturating_mul(MINUTES_PER_WEEK)
        .saturating_add(duration.days.saturating_mul(MINUTES_PER_DAY))
        .saturating_add(duration.hours.saturating_mul(MINUTES_PER_HOUR))
        .saturating_add(duration.minutes)
}

/// Format a minute count for display.
pub fn format_minutes(total: u64) -> String {
    duration_to_string(&minutes_to_duration(total))
}

/// Parse display text back into minutes.
pub fn parse_minutes(s: &str) -> u64 {
    duration_to_minutes(&string_to_duration(s))
}

fn first_match(re: &Regex, s: &str) -> u64 {
    re.captures(s)
        .and_then(|caps| caps.get(1))
        .map(|digits| digits.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}
