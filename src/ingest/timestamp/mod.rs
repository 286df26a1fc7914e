//! Resolution of the export's `DD/MM/YY` + `H:MM am|pm` pairs into instants.

use crate::config::TimestampConfig;
use crate::errors::KeepsakeError;
use crate::utils::regex::RegexPatterns;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Why a date/time pair could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampParseError {
    #[error("date is missing")]
    MissingDate,
    #[error("time is missing")]
    MissingTime,
    #[error("malformed date '{0}'")]
    MalformedDate(String),
    #[error("malformed time '{0}'")]
    MalformedTime(String),
    #[error("year {year} outside plausible range {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
    #[error("no such calendar date '{0}'")]
    InvalidDate(String),
    #[error("local time {0} does not exist in the configured zone")]
    NonexistentLocalTime(NaiveDateTime),
}

impl TimestampParseError {
    /// Stable key used when tallying fallbacks.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingDate => "missing_date",
            Self::MissingTime => "missing_time",
            Self::MalformedDate(_) => "malformed_date",
            Self::MalformedTime(_) => "malformed_time",
            Self::YearOutOfRange { .. } => "year_out_of_range",
            Self::InvalidDate(_) => "invalid_date",
            Self::NonexistentLocalTime(_) => "nonexistent_local_time",
        }
    }
}

/// Drop every character outside the 7-bit ASCII range.
///
/// Chat exports pad times with narrow no-break spaces and direction marks.
pub fn strip_non_ascii(s: &str) -> String {
    s.chars().filter(char::is_ascii).collect()
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    century: i32,
    pivot: Option<u8>,
    min_year: i32,
    max_year: i32,
    /// `None` means the system local zone.
    zone: Option<Tz>,
}

impl Default for Normalizer {
    fn default() -> Self {
        let defaults = TimestampConfig::default();
        Self {
            century: i32::from(defaults.century),
            pivot: defaults.pivot,
            min_year: defaults.min_year,
            max_year: defaults.max_year,
            zone: None,
        }
    }
}

impl Normalizer {
    pub fn from_config(config: &TimestampConfig) -> Result<Self, KeepsakeError> {
        let zone = config
            .timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>().map_err(|e| {
                    KeepsakeError::Config(format!("timestamps.timezone '{}': {}", name, e))
                })
            })
            .transpose()?;
        Ok(Self {
            century: i32::from(config.century),
            pivot: config.pivot,
            min_year: config.min_year,
            max_year: config.max_year,
            zone,
        })
    }

    /// Interpret wall-clock times in `zone` instead of the system zone.
    #[must_use]
    pub fn in_zone(mut self, zone: Tz) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Parse a date/time pair into a naive wall-clock value.
    pub fn parse_wall_clock(
        &self,
        date: &str,
        time: &str,
    ) -> Result<NaiveDateTime, TimestampParseError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(TimestampParseError::MissingDate);
        }
        if time.trim().is_empty() {
            return Err(TimestampParseError::MissingTime);
        }

        let (day, month, yy) = split_date(date)?;
        let year = self.resolve_year(yy)?;

        let cleaned = strip_non_ascii(time);
        let cleaned = cleaned.trim();
        let caps = RegexPatterns::meridiem_time()
            .captures(cleaned)
            .ok_or_else(|| TimestampParseError::MalformedTime(time.to_string()))?;
        let malformed = || TimestampParseError::MalformedTime(time.to_string());
        let hour: u32 = caps[1].parse().map_err(|_| malformed())?;
        let minute: u32 = caps[2].parse().map_err(|_| malformed())?;
        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(malformed());
        }
        let pm = caps[3].eq_ignore_ascii_case("pm");
        let hour = match (pm, hour) {
            (true, h) if h < 12 => h + 12,
            (false, 12) => 0,
            (_, h) => h,
        };

        let day_of = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| TimestampParseError::InvalidDate(date.to_string()))?;
        day_of
            .and_hms_opt(hour, minute, 0)
            .ok_or_else(malformed)
    }

    /// Parse a date/time pair as local wall-clock time and convert it to UTC.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant.
    pub fn normalize(&self, date: &str, time: &str) -> Result<DateTime<Utc>, TimestampParseError> {
        let naive = self.parse_wall_clock(date, time)?;
        self.localize(naive)
    }

    /// Read a `datetime` the export already carries.
    ///
    /// RFC 3339 values keep their offset. ISO values without an offset are wall-clock
    /// time in the configured zone.
    pub fn parse_existing(&self, value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .and_then(|naive| self.localize(naive).ok())
    }

    fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, TimestampParseError> {
        let resolved = match self.zone {
            Some(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            None => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        resolved.ok_or(TimestampParseError::NonexistentLocalTime(naive))
    }

    fn resolve_year(&self, yy: i32) -> Result<i32, TimestampParseError> {
        let mut century = self.century;
        if let Some(pivot) = self.pivot
            && yy > i32::from(pivot)
        {
            century -= 1;
        }
        let year = century * 100 + yy;
        if year < self.min_year || year > self.max_year {
            return Err(TimestampParseError::YearOutOfRange {
                year,
                min: self.min_year,
                max: self.max_year,
            });
        }
        Ok(year)
    }
}

/// Split `DD/MM/YY` into (day, month, two-digit year).
fn split_date(date: &str) -> Result<(u32, u32, i32), TimestampParseError> {
    let malformed = || TimestampParseError::MalformedDate(date.to_string());
    let parts: Vec<&str> = date.split('/').collect();
    let &[day, month, yy] = parts.as_slice() else {
        return Err(malformed());
    };
    let digits = |s: &str, max_len: usize| {
        !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(day, 2) || !digits(month, 2) || yy.len() != 2 || !digits(yy, 2) {
        return Err(malformed());
    }
    Ok((
        day.parse().map_err(|_| malformed())?,
        month.parse().map_err(|_| malformed())?,
        yy.parse().map_err(|_| malformed())?,
    ))
}
