//! Text helpers for report rendering.

use chrono::{DateTime, Utc};

/// Human-readable age of `then` relative to `now` ("3 days ago").
///
/// Timestamps in the future (clock skew between us and the provider) read
/// as "just now".
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(then);

    let days = duration.num_days();
    if days > 0 {
        return plural(days, "day");
    }

    let hours = duration.num_hours();
    if hours > 0 {
        return plural(hours, "hour");
    }

    let minutes = duration.num_minutes();
    if minutes > 0 {
        return plural(minutes, "minute");
    }

    "just now".to_string()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Width in chars of the widest item, for column alignment
pub fn column_width<'a>(items: impl IntoIterator<Item = &'a str>) -> usize {
    items.into_iter().map(|s| s.chars().count()).max().unwrap_or(0)
}
