//! Timestamp parsing and calendar helpers.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts accepted after RFC 3339 fails. Naive values are read as UTC.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp.
///
/// Accepted forms:
/// - RFC 3339 with `Z` or a numeric offset (`2019-12-01T00:00:00Z`, `...+02:00`)
/// - naive date-time (`2019-12-01T00:00:00`, optional fraction), read as UTC
/// - bare date (`2019-12-01`), read as UTC midnight
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// First day of the month following `(year, month)`.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Last calendar day of `(year, month)`.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1).map(|d| d - Duration::days(1))
}

/// Month ends (at midnight UTC) falling inside `[start, end]`, in order.
///
/// This is the monthly period index used to size and label a forecast
/// horizon.
pub fn month_ends_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    if end < start {
        return out;
    }

    let (mut year, mut month) = (start.year(), start.month());
    loop {
        let Some(last_day) = month_end(year, month) else {
            break;
        };
        let Some(stamp) = last_day.and_hms_opt(0, 0, 0).map(|n| n.and_utc()) else {
            break;
        };
        if stamp > end {
            break;
        }
        if stamp >= start {
            out.push(last_day);
        }
        (year, month) = next_month(year, month);
    }
    out
}

/// English month name for 1..=12.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "?",
    }
}
