//! Kind-tagged date-time storage form.
//!
//! A bare timestamp cannot tell a universal time from a local one, so
//! date-times are stored as `<timestamp>;<kind>`:
//!
//! ```text
//! 2024-03-31T01:30:00.000000000;Utc
//! 2024-03-31T01:30:00.000000000;Local
//! 2024-03-31T03:30:00.000000000;Unspecified
//! ```
//!
//! `Utc` and `Local` store the UTC instant; `Unspecified` stores the wall
//! clock as given. Nothing is normalized: a `Local` value reads back as
//! `Local`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};

use crate::ConversionError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Ticks per second in the legacy bare tick format (100 ns ticks).
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Which clock a stored date-time belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateTimeKind {
    /// A wall-clock time with no zone (`NaiveDateTime`).
    Unspecified,
    /// Coordinated universal time.
    Utc,
    /// The machine's local zone.
    Local,
}

impl DateTimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateTimeKind::Unspecified => "Unspecified",
            DateTimeKind::Utc => "Utc",
            DateTimeKind::Local => "Local",
        }
    }
}

impl FromStr for DateTimeKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unspecified" => Ok(DateTimeKind::Unspecified),
            "Utc" => Ok(DateTimeKind::Utc),
            "Local" => Ok(DateTimeKind::Local),
            other => Err(ConversionError::failed::<str, DateTimeKind>(format!(
                "unknown date-time kind '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DateTimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A date-time together with its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaggedDateTime {
    /// UTC instant for `Utc`/`Local`, wall clock for `Unspecified`.
    timestamp: NaiveDateTime,
    kind: DateTimeKind,
}

impl TaggedDateTime {
    pub fn from_utc(value: &DateTime<Utc>) -> Self {
        TaggedDateTime {
            timestamp: value.naive_utc(),
            kind: DateTimeKind::Utc,
        }
    }

    pub fn from_local(value: &DateTime<Local>) -> Self {
        TaggedDateTime {
            timestamp: value.naive_utc(),
            kind: DateTimeKind::Local,
        }
    }

    pub fn from_naive(value: &NaiveDateTime) -> Self {
        TaggedDateTime {
            timestamp: *value,
            kind: DateTimeKind::Unspecified,
        }
    }

    pub fn kind(&self) -> DateTimeKind {
        self.kind
    }

    /// The instant in UTC. An unspecified wall clock is taken as UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.timestamp)
    }

    /// The instant in the local zone.
    pub fn to_local(&self) -> DateTime<Local> {
        self.to_utc().with_timezone(&Local)
    }

    /// The wall clock: local time for `Local`, UTC for `Utc`, as stored
    /// for `Unspecified`.
    pub fn to_naive(&self) -> NaiveDateTime {
        match self.kind {
            DateTimeKind::Local => self.to_local().naive_local(),
            DateTimeKind::Utc | DateTimeKind::Unspecified => self.timestamp,
        }
    }

    /// Interpret a legacy bare tick count (100 ns since 0001-01-01).
    fn from_ticks(ticks: i64) -> Option<Self> {
        let epoch = NaiveDate::from_ymd_opt(1, 1, 1)?.and_hms_opt(0, 0, 0)?;
        let seconds = ticks.div_euclid(TICKS_PER_SECOND);
        let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * 100;
        let offset = TimeDelta::try_seconds(seconds)? + TimeDelta::nanoseconds(nanos);
        let timestamp = epoch.checked_add_signed(offset)?;
        Some(TaggedDateTime {
            timestamp,
            kind: DateTimeKind::Unspecified,
        })
    }
}

impl fmt::Display for TaggedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.timestamp.format(TIMESTAMP_FORMAT), self.kind)
    }
}

impl FromStr for TaggedDateTime {
    type Err = ConversionError;

    /// Parse the tagged form. Also accepts an RFC 3339 string (taken as
    /// `Utc`) and a legacy bare tick count (taken as `Unspecified`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some((timestamp, kind)) = s.split_once(';') {
            let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_PARSE_FORMAT)
                .map_err(|e| ConversionError::failed::<str, TaggedDateTime>(e.to_string()))?;
            let kind = kind.parse()?;
            return Ok(TaggedDateTime { timestamp, kind });
        }

        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            return s
                .parse::<i64>()
                .ok()
                .and_then(TaggedDateTime::from_ticks)
                .ok_or_else(|| {
                    ConversionError::failed::<str, TaggedDateTime>(format!(
                        "tick count '{}' out of range",
                        s
                    ))
                });
        }

        DateTime::parse_from_rfc3339(s)
            .map(|parsed| TaggedDateTime::from_utc(&parsed.with_timezone(&Utc)))
            .map_err(|e| ConversionError::failed::<str, TaggedDateTime>(e.to_string()))
    }
}
