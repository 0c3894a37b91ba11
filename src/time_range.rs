use std::ops::Range;

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc,
};

const DATE_FORMATS: [&'static str; 2] = ["%Y-%m-%d", "%Y%m%d"];
const CLOCK_FORMATS: [&'static str; 4] = ["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

/// Reporting window handed to the metrics backend. `start <= end` once validated.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeRange { start, end }
    }

    /// The last 24 hours ending at `now`.
    pub fn last_day(now: DateTime<Utc>) -> Self {
        TimeRange {
            start: now - Duration::days(1),
            end: now,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Parses an ISO-8601 datetime. Values without an offset are taken as UTC.
///
/// Accepts extended and basic forms, a `T`, `t` or space separator, times
/// down to hours only and offsets written as `Z`, `+HH`, `+HHMM` or `+HH:MM`.
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.with_timezone(&Utc));
    }

    let (date, time) = match value.find(|c: char| c == 'T' || c == 't' || c == ' ') {
        Some(index) => (&value[..index], Some(&value[index + 1..])),
        None => (value, None),
    };
    let date = parse_date(date)?;
    let time = match time {
        Some(time) => time,
        None => return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive)),
    };

    let (clock, offset) = split_offset(time)?;
    let naive = date.and_time(parse_clock(clock)?);
    match offset {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|date_time| date_time.with_timezone(&Utc)),
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
}

fn parse_clock(clock: &str) -> Option<NaiveTime> {
    if clock.len() == 2 && clock.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveTime::from_hms_opt(clock.parse().ok()?, 0, 0);
    }
    CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(clock, format).ok())
}

fn split_offset(time: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(clock) = time.strip_suffix('Z').or_else(|| time.strip_suffix('z')) {
        return Some((clock, Some(FixedOffset::east_opt(0)?)));
    }
    match time.rfind(|c: char| c == '+' || c == '-') {
        Some(index) => Some((&time[..index], Some(parse_offset(&time[index..])?))),
        None => Some((time, None)),
    }
}

/// `+HH`, `+HHMM`, `+HH:MM` and the same with seconds.
fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let digits: String = offset[1..].chars().filter(|c| *c != ':').collect();
    if !matches!(digits.len(), 2 | 4 | 6) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: Range<usize>| -> Option<i32> {
        digits.get(range).map_or(Some(0), |part| part.parse().ok())
    };
    let seconds = field(0..2)? * 3600 + field(2..4)? * 60 + field(4..6)?;
    FixedOffset::east_opt(sign * seconds)
}
