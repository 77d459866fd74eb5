use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;
use serde::Serialize;

use crate::error::VerifError;

/// `YYYYMMDDHH`, the timestamp layout of every generated document.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H";

static FREQUENCY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)\s*(min|[a-z])$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%d%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

/// Forecast cycles of an experiment: initialization times and the valid
/// times of their last lead time, index-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub inits: Vec<String>,
    pub fcsts: Vec<String>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.inits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inits.is_empty()
    }

    pub fn first_init(&self) -> Option<&str> {
        self.inits.first().map(String::as_str)
    }

    pub fn last_fcst(&self) -> Option<&str> {
        self.fcsts.last().map(String::as_str)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inits
            .iter()
            .map(String::as_str)
            .zip(self.fcsts.iter().map(String::as_str))
    }
}

pub fn compute_time_series(
    start: &str,
    end: &str,
    cycle_length: &str,
    forecast_range: &str,
) -> Result<TimeSeries, VerifError> {
    let date_ini = parse_datetime(start)?;
    let date_end = parse_datetime(end)?;
    let step = parse_frequency(cycle_length)?;
    let lead = TimeDelta::try_hours(parse_forecast_hours(forecast_range)?)
        .ok_or_else(|| VerifError::MalformedFrequency(forecast_range.to_string()))?;

    let mut inits = Vec::new();
    let mut fcsts = Vec::new();
    let mut current = date_ini;
    while current <= date_end {
        let valid = current
            .checked_add_signed(lead)
            .ok_or_else(|| VerifError::MalformedDate(format!("{current} + {lead}")))?;
        inits.push(current.format(TIMESTAMP_FORMAT).to_string());
        fcsts.push(valid.format(TIMESTAMP_FORMAT).to_string());
        current = match current.checked_add_signed(step) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(TimeSeries { inits, fcsts })
}

/// Parses the common spellings of a date-time found in experiment configs.
/// The clock time is kept as written, whatever the offset; a bare date
/// means midnight.
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime, VerifError> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_local());
    }

    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(parsed);
        }
    }

    // Hour-only forms: chrono requires minutes, so pad them in.
    for (format, separator) in [("%Y-%m-%dT%H:%M", 'T'), ("%Y-%m-%d %H:%M", ' ')] {
        if naive.len() == 13 && naive.chars().nth(10) == Some(separator) {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(&format!("{naive}:00"), format) {
                return Ok(parsed);
            }
        }
    }
    if naive.len() == 10 && naive.chars().all(|ch| ch.is_ascii_digit()) {
        return parse_timestamp(naive);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    Err(VerifError::MalformedDate(text.to_string()))
}

/// Parses a `YYYYMMDDHH` timestamp.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, VerifError> {
    let malformed = || VerifError::MalformedDate(text.to_string());
    let trimmed = text.trim();
    if trimmed.len() != 10 || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(malformed());
    }
    let date = NaiveDate::parse_from_str(&trimmed[..8], "%Y%m%d").map_err(|_| malformed())?;
    let hour: u32 = trimmed[8..].parse().map_err(|_| malformed())?;
    let time = NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(malformed)?;
    Ok(date.and_time(time))
}

/// Sampling step from a cycle length such as `PT6H`: the two leading
/// characters are dropped and the rest read as `<count><unit>`.
pub fn parse_frequency(cycle_length: &str) -> Result<TimeDelta, VerifError> {
    let malformed = || VerifError::MalformedFrequency(cycle_length.to_string());
    let token = cycle_length.get(2..).ok_or_else(malformed)?.trim().to_lowercase();
    let caps = FREQUENCY_TOKEN.captures(&token).ok_or_else(malformed)?;
    let count: i64 = match &caps[1] {
        "" => 1,
        digits => digits.parse().map_err(|_| malformed())?,
    };
    if count == 0 {
        return Err(malformed());
    }
    let step = match &caps[2] {
        "d" => TimeDelta::try_days(count),
        "h" => TimeDelta::try_hours(count),
        "m" | "min" => TimeDelta::try_minutes(count),
        "s" => TimeDelta::try_seconds(count),
        _ => None,
    };
    step.ok_or_else(malformed)
}

/// Forecast length in hours from a range such as `PT48H`.
pub fn parse_forecast_hours(forecast_range: &str) -> Result<i64, VerifError> {
    forecast_range
        .get(2..)
        .map(|rest| rest.replace('H', ""))
        .and_then(|hours| hours.trim().parse::<i64>().ok())
        .ok_or_else(|| VerifError::MalformedFrequency(forecast_range.to_string()))
}

pub fn hours_between(date_ini: NaiveDateTime, date_end: NaiveDateTime) -> i64 {
    (date_end - date_ini).num_hours()
}
