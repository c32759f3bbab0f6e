use chrono::{DateTime, Duration, Utc};

/// Rental timing rules, mirrored from the backend's access policy so the
/// portal can render accurate copy without an extra round trip.

/// Viewing window once a rental is started.
pub const VIEWING_WINDOW_HOURS: i64 = 48;
/// A purchased rental must be started within this many days.
pub const ACTIVATION_DEADLINE_DAYS: i64 = 30;

pub fn viewing_window() -> Duration {
    Duration::hours(VIEWING_WINDOW_HOURS)
}

pub fn activation_deadline() -> Duration {
    Duration::days(ACTIVATION_DEADLINE_DAYS)
}

/// format_countdown
///
/// Renders the time remaining until `expiry` as "{h}h {m}m {s}s", or
/// "Expired" at and after the deadline. Hours do not wrap into days; a
/// 3-day rental deadline reads "72h 0m 0s". This is the cosmetic string the
/// dashboard shows next to active rentals; access itself is always decided
/// by the backend, never by this clock.
pub fn format_countdown(now: DateTime<Utc>, expiry: DateTime<Utc>) -> String {
    let remaining = expiry - now;
    if remaining <= Duration::zero() {
        return "Expired".to_string();
    }
    let secs = remaining.num_seconds();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

/// Countdown against an optional expiry, for statuses that carry none
/// (lifetime purchases).
pub fn maybe_countdown(now: DateTime<Utc>, expiry: Option<DateTime<Utc>>) -> Option<String> {
    expiry.map(|e| format_countdown(now, e))
}
