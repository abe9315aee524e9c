use crate::error::{DcmvolError, Result};
use chrono::{Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

/// How wall-clock DA/TM values are turned into absolute instants
///
/// DICOM dates and times carry no time zone. `Local` interprets them as
/// local civil time of the machine running the conversion, which is
/// ambiguous across DST transitions.
/// `Naive` interprets them as UTC, so two values on the same date always
/// differ by their wall-clock distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBasis {
    #[default]
    Local,
    Naive,
}

/// Parses a DICOM DA value (`YYYYMMDD`, legacy `YYYY.MM.DD` accepted)
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    let compact: String = value.trim().chars().filter(|c| *c != '.').collect();
    let invalid = || DcmvolError::InvalidDateTime {
        field,
        value: value.to_string(),
    };

    if compact.len() != 8 || !compact.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let year: i32 = compact[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = compact[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = compact[6..8].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parses a DICOM TM value (`HH[MM[SS[.FFFFFF]]]`, legacy colons accepted)
///
/// Missing minute/second components are zero. Fractional seconds are
/// truncated.
pub fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(r"^(\d{2})(\d{2})?(\d{2})?(?:\.\d{1,6})?$").expect("Failed to compile regex")
    });

    let compact: String = value.trim().chars().filter(|c| *c != ':').collect();
    let invalid = || DcmvolError::InvalidDateTime {
        field,
        value: value.to_string(),
    };

    let caps = re.captures(&compact).ok_or_else(invalid)?;
    let component = |i: usize| -> Result<u32> {
        caps.get(i)
            .map(|m| m.as_str().parse::<u32>().map_err(|_| invalid()))
            .unwrap_or(Ok(0))
    };

    // TM allows a leap second of 60; chrono does not accept it in from_hms
    let second = component(3)?.min(59);
    NaiveTime::from_hms_opt(component(1)?, component(2)?, second).ok_or_else(invalid)
}

/// Converts a date and a time of day into seconds since the Unix epoch
pub fn to_timestamp(date: NaiveDate, time: NaiveTime, basis: TimeBasis) -> i64 {
    let naive = NaiveDateTime::new(date, time);
    match basis {
        TimeBasis::Naive => naive.and_utc().timestamp(),
        TimeBasis::Local => local_timestamp(naive),
    }
}

/// Local-time interpretation with mktime-like resolution of DST gaps and folds
fn local_timestamp(naive: NaiveDateTime) -> i64 {
    match chrono::Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        // Wall-clock time skipped by a forward DST shift
        LocalResult::None => match chrono::Local.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.timestamp() - 3600,
            LocalResult::None => naive.and_utc().timestamp(),
        },
    }
}
