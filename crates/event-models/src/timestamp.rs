use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// ISO-8601 timestamp, with or without an offset.
///
/// A value read without an offset stays naive and prints back without one, so
/// cached values re-encode exactly as they were stored. Naive values compare
/// as if they were UTC. Display output matches the producers' format:
/// `2024-05-01T19:30:00+00:00`, with microseconds only when they are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    datetime: DateTime<FixedOffset>,
    naive: bool,
}

impl Timestamp {
    pub fn new(datetime: DateTime<FixedOffset>) -> Self {
        Self {
            datetime,
            naive: false,
        }
    }

    /// Timestamp without an offset
    pub fn from_naive(naive: NaiveDateTime) -> Self {
        Self {
            datetime: naive.and_utc().into(),
            naive: true,
        }
    }

    /// The instant this timestamp names; naive values are taken as UTC
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.datetime
    }

    pub fn into_inner(self) -> DateTime<FixedOffset> {
        self.datetime
    }

    pub fn is_naive(&self) -> bool {
        self.naive
    }

    /// Same instant with an explicit offset; naive values become UTC
    pub fn assume_utc(self) -> Self {
        Self {
            naive: false,
            ..self
        }
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let offset_err = match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => return Ok(Self::new(dt)),
            Err(e) => e,
        };
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%:z") {
            return Ok(Self::new(dt));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self::from_naive(naive));
            }
        }

        // date-only values mean midnight
        if let Some(naive) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(Self::from_naive(naive));
        }

        Err(offset_err)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match (self.datetime.nanosecond() == 0, self.naive) {
            (true, true) => "%Y-%m-%dT%H:%M:%S",
            (true, false) => "%Y-%m-%dT%H:%M:%S%:z",
            (false, true) => "%Y-%m-%dT%H:%M:%S%.6f",
            (false, false) => "%Y-%m-%dT%H:%M:%S%.6f%:z",
        };
        write!(f, "{}", self.datetime.format(format))
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Self::new(datetime)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime.into())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timestamp::from_str(&s)
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", s, e)))
    }
}
