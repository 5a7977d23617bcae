//! A settable time leaf.
//!
//! [`TimeValue`] wraps an optional instant so that an unset time renders and
//! parses as the empty string, the same way every other zero leaf does.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoercionError;

/// A point in time with its UTC offset, or unset.
///
/// Text is RFC 3339 with up to nanosecond precision, plus the keywords
/// `now` (local time), `utc` and `local`.
///
/// ```
/// use asp::TimeValue;
///
/// let mut start = TimeValue::default();
/// start.set("2024-03-01T09:30:00.25+01:00")?;
/// assert_eq!(start.render(), "2024-03-01T09:30:00.25+01:00");
///
/// start.set("")?;
/// assert!(start.is_zero());
/// # Ok::<(), asp::CoercionError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TimeValue(Option<DateTime<FixedOffset>>);

impl TimeValue {
    /// Type tag shown in help output.
    pub const TYPE_TAG: &'static str = "time";

    /// Wraps an instant.
    #[must_use]
    pub const fn new(instant: DateTime<FixedOffset>) -> Self {
        Self(Some(instant))
    }

    /// The instant, if set.
    #[must_use]
    pub const fn instant(&self) -> Option<DateTime<FixedOffset>> {
        self.0
    }

    /// Whether no instant is set.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    /// Replaces the value by parsing `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::InvalidTime`] for text that is neither a
    /// keyword nor an RFC 3339 timestamp. The current value is kept.
    pub fn set(&mut self, raw: &str) -> Result<(), CoercionError> {
        *self = parse_time(raw)?;
        Ok(())
    }

    /// Formats the instant, or returns an empty string when unset.
    #[must_use]
    pub fn render(&self) -> String {
        self.0.map(|instant| format_time(&instant)).unwrap_or_default()
    }

    /// Type tag shown in help output.
    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimeValue {
    fn from(instant: DateTime<Tz>) -> Self {
        Self(Some(instant.fixed_offset()))
    }
}

impl FromStr for TimeValue {
    type Err = CoercionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_time(raw)
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for TimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

impl<'de> Deserialize<'de> for TimeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parses time text: empty for unset, `now`, `utc`, `local`, or RFC 3339.
///
/// # Errors
///
/// Returns [`CoercionError::InvalidTime`] for anything else.
pub fn parse_time(raw: &str) -> Result<TimeValue, CoercionError> {
    parse_time_at(raw, Utc::now())
}

/// [`parse_time`] with an explicit clock reading for the keywords.
pub(crate) fn parse_time_at(raw: &str, now: DateTime<Utc>) -> Result<TimeValue, CoercionError> {
    let instant = match raw {
        "" => return Ok(TimeValue::default()),
        "now" | "local" => now.with_timezone(&Local).fixed_offset(),
        "utc" => now.fixed_offset(),
        _ => DateTime::parse_from_rfc3339(raw).map_err(|err| CoercionError::InvalidTime {
            raw: raw.to_owned(),
            reason: err.to_string(),
        })?,
    };
    Ok(TimeValue::new(instant))
}

/// RFC 3339 with the fraction trimmed of trailing zeros and `Z` for UTC.
fn format_time(instant: &DateTime<FixedOffset>) -> String {
    let base = instant.format("%Y-%m-%dT%H:%M:%S");
    let nanos = instant.nanosecond();
    let fraction = if nanos == 0 {
        String::new()
    } else {
        let digits = format!("{nanos:09}");
        format!(".{}", digits.trim_end_matches('0'))
    };
    if instant.offset().local_minus_utc() == 0 {
        format!("{base}{fraction}Z")
    } else {
        format!("{base}{fraction}{}", instant.format("%:z"))
    }
}
