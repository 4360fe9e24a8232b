//! Human-readable time rendering for announcements.
//!
//! Standings boards say things like "this term ends in around 3 days time"
//! and activity reports say "42 minutes ago"; this module is the single
//! place those strings come from.

use chrono::{DateTime, Utc};

/// Render how long ago `then` was, relative to `now`.
///
/// Timestamps in the future are rendered with [`humanize_until`] so a caller
/// mixing the two up still gets something sensible.
#[must_use]
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - then;
    if delta < chrono::Duration::zero() {
        return humanize_until(then, now);
    }

    let seconds = delta.num_seconds();
    let days = delta.num_days();

    if days == 0 {
        return match seconds {
            0..=9 => "just now".to_string(),
            10..=59 => format!("{seconds} seconds ago"),
            60..=119 => "a minute ago".to_string(),
            120..=3599 => format!("{} minutes ago", seconds / 60),
            3600..=7199 => "an hour ago".to_string(),
            _ => format!("{} hours ago", seconds / 3600),
        };
    }
    match days {
        1 => "yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=30 => format!("{} weeks ago", days / 7),
        31..=364 => format!("{} months ago", days / 30),
        _ => format!("{} years ago", days / 365),
    }
}

/// Render how far in the future `then` is, relative to `now`.
#[must_use]
pub fn humanize_until(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = then - now;
    if delta <= chrono::Duration::zero() {
        return "now".to_string();
    }

    let seconds = delta.num_seconds();
    let days = delta.num_days();

    if days == 0 {
        return match seconds {
            0..=59 => "in under a minute".to_string(),
            60..=119 => "in a minute".to_string(),
            120..=3599 => format!("in {} minutes", seconds / 60),
            3600..=7199 => "in an hour".to_string(),
            _ => format!("in {} hours", seconds / 3600),
        };
    }
    match days {
        1 => "tomorrow".to_string(),
        _ => format!("in around {days} days time"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn since_buckets() {
        let t = now();
        assert_eq!(humanize_since(t, t), "just now");
        assert_eq!(humanize_since(t - Duration::seconds(42), t), "42 seconds ago");
        assert_eq!(humanize_since(t - Duration::seconds(90), t), "a minute ago");
        assert_eq!(humanize_since(t - Duration::minutes(10), t), "10 minutes ago");
        assert_eq!(humanize_since(t - Duration::minutes(90), t), "an hour ago");
        assert_eq!(humanize_since(t - Duration::hours(5), t), "5 hours ago");
        assert_eq!(humanize_since(t - Duration::days(1), t), "yesterday");
        assert_eq!(humanize_since(t - Duration::days(3), t), "3 days ago");
        assert_eq!(humanize_since(t - Duration::days(14), t), "2 weeks ago");
        assert_eq!(humanize_since(t - Duration::days(61), t), "2 months ago");
        assert_eq!(humanize_since(t - Duration::days(800), t), "2 years ago");
    }

    #[test]
    fn until_buckets() {
        let t = now();
        assert_eq!(humanize_until(t, t), "now");
        assert_eq!(humanize_until(t + Duration::seconds(30), t), "in under a minute");
        assert_eq!(humanize_until(t + Duration::minutes(45), t), "in 45 minutes");
        assert_eq!(humanize_until(t + Duration::hours(3), t), "in 3 hours");
        assert_eq!(humanize_until(t + Duration::days(1), t), "tomorrow");
        assert_eq!(humanize_until(t + Duration::days(6), t), "in around 6 days time");
    }

    #[test]
    fn swapped_arguments_fall_through() {
        let t = now();
        let future = t + Duration::days(2);
        assert_eq!(humanize_since(future, t), "in around 2 days time");
    }
}
