//! Display helpers for lead timestamps.

use chrono::{DateTime, Utc};

fn parse(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `2021-05-17 at 10:26` in UTC. Unparsable input is returned unchanged.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    parse(raw).map_or_else(
        || raw.to_owned(),
        |dt| format!("{} at {}", dt.format("%Y-%m-%d"), dt.format("%H:%M")),
    )
}

/// Coarse age of `raw` relative to `now`, e.g. `3 hours ago`.
///
/// Future timestamps read as "just now". Unparsable input is returned unchanged.
#[must_use]
pub fn format_relative(raw: &str, now: DateTime<Utc>) -> String {
    let Some(then) = parse(raw) else {
        return raw.to_owned();
    };

    let elapsed = now.signed_duration_since(then);
    let (amount, unit) = if elapsed.num_days() >= 1 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_hours() >= 1 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() >= 1 {
        (elapsed.num_minutes(), "minute")
    } else {
        return "just now".to_owned();
    };

    if amount == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{amount} {unit}s ago")
    }
}
