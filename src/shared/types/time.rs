//! Timestamp helpers
//!
//! Record timestamps are kept at microsecond precision, the finest resolution
//! both SQLite (text) and PostgreSQL (`timestamptz`) round-trip exactly.

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Current time truncated to whole microseconds.
pub fn now_micros() -> DateTime<Utc> {
    truncate_micros(Utc::now())
}

pub fn truncate_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(Duration::microseconds(1)).unwrap_or(ts)
}

/// A timestamp strictly after `previous`.
///
/// Uses the wall clock when it has moved past `previous`; otherwise (same
/// microsecond, or the clock stepped backwards) bumps `previous` by 1µs.
pub fn next_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
