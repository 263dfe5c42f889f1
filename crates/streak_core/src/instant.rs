use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp as exports spell it: RFC 3339 strings, second/nanosecond
/// pairs, epoch milliseconds or bare dates. `normalize` resolves on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawInstant {
    Instant(DateTime<Utc>),
    Epoch {
        seconds: i64,
        #[serde(default, alias = "nanoseconds")]
        nanos: u32,
    },
    Millis(i64),
    Text(String),
}

impl RawInstant {
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            RawInstant::Instant(instant) => *instant,
            RawInstant::Epoch { seconds, nanos } => {
                Utc.timestamp_opt(*seconds, *nanos).single().unwrap_or(now)
            }
            RawInstant::Millis(millis) => {
                Utc.timestamp_millis_opt(*millis).single().unwrap_or(now)
            }
            RawInstant::Text(text) => parse_text(text).unwrap_or(now),
        }
    }
}

impl From<DateTime<Utc>> for RawInstant {
    fn from(instant: DateTime<Utc>) -> Self {
        RawInstant::Instant(instant)
    }
}

impl From<NaiveDate> for RawInstant {
    fn from(date: NaiveDate) -> Self {
        RawInstant::Instant(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }
}

/// Absent or uninterpretable values become `now`, never an error.
pub fn normalize(raw: Option<&RawInstant>, now: DateTime<Utc>) -> DateTime<Utc> {
    match raw {
        Some(raw) => raw.resolve(now),
        None => now,
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    None
}

/// Whole days plus leftover whole hours between two instants.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Span {
    pub days: i64,
    pub hours: i64,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d {}h", self.days, self.hours)
    }
}

/// Elapsed time from `start` to `end`, clamped to zero when reversed.
pub fn span_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Span {
    let elapsed = (end - start).max(Duration::zero());
    let days = elapsed.num_days();
    let hours = (elapsed - Duration::days(days)).num_hours();
    Span { days, hours }
}

pub fn day_key(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}
