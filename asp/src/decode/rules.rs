//! The standard decode hooks.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::CoercionError;
use crate::duration::parse_duration;
use crate::leaf::{LeafKind, LeafValue};
use crate::time::parse_time;

use super::DecodeHook;

/// Splits list or map text on `separator`, first removing one enclosing
/// `[` `]` pair. Empty input yields no entries.
///
/// ```
/// use asp::decode::list_entries;
///
/// assert_eq!(list_entries("[a,b]", ","), vec!["a", "b"]);
/// assert!(list_entries("", ",").is_empty());
/// assert!(list_entries("[]", ",").is_empty());
/// ```
#[must_use]
pub fn list_entries<'a>(raw: &'a str, separator: &str) -> Vec<&'a str> {
    let inner = unbracketed(raw);
    if inner.is_empty() {
        Vec::new()
    } else {
        inner.split(separator).collect()
    }
}

/// `raw` without one enclosing `[` `]` pair, if it has one.
pub(crate) fn unbracketed(raw: &str) -> &str {
    raw.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(raw)
}

/// Parses `1 t T TRUE true True` and `0 f F FALSE false False`.
///
/// # Errors
///
/// Returns [`CoercionError::InvalidBool`] for any other spelling.
pub fn parse_bool(raw: &str) -> Result<bool, CoercionError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoercionError::InvalidBool {
            raw: raw.to_owned(),
        }),
    }
}

/// Splits an optional sign and a `0x`, `0o` or `0b` radix prefix.
fn radix_parts(raw: &str) -> (bool, u32, &str) {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    for (prefixes, radix) in [(["0x", "0X"], 16), (["0o", "0O"], 8), (["0b", "0B"], 2)] {
        for prefix in prefixes {
            if let Some(digits) = unsigned.strip_prefix(prefix) {
                return (negative, radix, digits);
            }
        }
    }
    (negative, 10, unsigned)
}

fn invalid_integer(raw: &str, reason: impl ToString) -> CoercionError {
    CoercionError::InvalidInteger {
        raw: raw.to_owned(),
        reason: reason.to_string(),
    }
}

/// Parses a signed integer in decimal or with a `0x`, `0o`, `0b` prefix.
///
/// # Errors
///
/// Returns [`CoercionError::InvalidInteger`] when the text is not a number or
/// overflows `i64`.
pub fn parse_int(raw: &str) -> Result<i64, CoercionError> {
    let (negative, radix, digits) = radix_parts(raw);
    if digits.starts_with(['+', '-']) {
        return Err(invalid_integer(raw, "misplaced sign"));
    }
    let text = if negative {
        format!("-{digits}")
    } else {
        digits.to_owned()
    };
    i64::from_str_radix(&text, radix).map_err(|err| invalid_integer(raw, err))
}

/// Parses an unsigned integer in decimal or with a `0x`, `0o`, `0b` prefix.
///
/// # Errors
///
/// Returns [`CoercionError::InvalidInteger`] for signs, non-digits and
/// overflow.
pub fn parse_uint(raw: &str) -> Result<u64, CoercionError> {
    let (negative, radix, digits) = radix_parts(raw);
    if negative || digits.starts_with(['+', '-']) {
        return Err(invalid_integer(raw, "unsigned value expected"));
    }
    u64::from_str_radix(digits, radix).map_err(|err| invalid_integer(raw, err))
}

/// Durations in the `1h2m3s` grammar. Empty text is zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringToDuration;

impl DecodeHook for StringToDuration {
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError> {
        if target != LeafKind::Duration {
            return Ok(None);
        }
        if raw.is_empty() {
            return Ok(Some(LeafValue::Duration(Duration::ZERO)));
        }
        parse_duration(raw).map(|d| Some(LeafValue::Duration(d)))
    }
}

/// Times: empty for unset, `now`, `utc`, `local`, or RFC 3339.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringToTime;

impl DecodeHook for StringToTime {
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError> {
        if target != LeafKind::Time {
            return Ok(None);
        }
        parse_time(raw).map(|t| Some(LeafValue::Time(t)))
    }
}

/// Byte sequences written as hex.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringToBytes;

impl DecodeHook for StringToBytes {
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError> {
        if target != LeafKind::Bytes {
            return Ok(None);
        }
        hex::decode(raw)
            .map(|bytes| Some(LeafValue::Bytes(bytes)))
            .map_err(|err| CoercionError::InvalidHex {
                raw: raw.to_owned(),
                reason: err.to_string(),
            })
    }
}

fn map_entries<'a>(
    raw: &'a str,
    separator: &str,
) -> impl Iterator<Item = Result<(&'a str, &'a str), CoercionError>> {
    list_entries(raw, separator).into_iter().map(|entry| {
        entry
            .split_once('=')
            .ok_or_else(|| CoercionError::MalformedMapEntry {
                entry: entry.to_owned(),
            })
    })
}

/// `key1=1,key2=2` text, optionally wrapped in `[` `]`.
#[derive(Clone, Debug)]
pub struct StringToIntMap {
    separator: String,
}

impl StringToIntMap {
    /// Entries split on `separator` instead of `,`.
    #[must_use]
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for StringToIntMap {
    fn default() -> Self {
        Self::with_separator(",")
    }
}

impl DecodeHook for StringToIntMap {
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError> {
        if target != LeafKind::IntMap {
            return Ok(None);
        }
        let mut map = BTreeMap::new();
        for entry in map_entries(raw, &self.separator) {
            let (key, value) = entry?;
            let parsed = value
                .parse::<i64>()
                .map_err(|_| CoercionError::MalformedMapEntry {
                    entry: format!("{key}={value}"),
                })?;
            map.insert(key.to_owned(), parsed);
        }
        Ok(Some(LeafValue::IntMap(map)))
    }
}

/// `key1=a,key2=b` text, optionally wrapped in `[` `]`.
#[derive(Clone, Debug)]
pub struct StringToStrMap {
    separator: String,
}

impl StringToStrMap {
    /// Entries split on `separator` instead of `,`.
    #[must_use]
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for StringToStrMap {
    fn default() -> Self {
        Self::with_separator(",")
    }
}

impl DecodeHook for StringToStrMap {
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError> {
        if target != LeafKind::StrMap {
            return Ok(None);
        }
        let map = map_entries(raw, &self.separator)
            .map(|entry| entry.map(|(k, v)| (k.to_owned(), v.to_owned())))
            .collect::<Result<_, _>>()?;
        Ok(Some(LeafValue::StrMap(map)))
    }
}

/// Delimited lists of strings, booleans, integers or durations.
#[derive(Clone, Debug)]
pub struct StringToList {
    separator: String,
}

impl StringToList {
    /// Items split on `separator` instead of `,`.
    #[must_use]
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    fn items<T>(
        &self,
        raw: &str,
        parse: impl Fn(&str) -> Result<T, CoercionError>,
    ) -> Result<Vec<T>, CoercionError> {
        list_entries(raw, &self.separator)
            .into_iter()
            .map(parse)
            .collect()
    }
}

impl Default for StringToList {
    fn default() -> Self {
        Self::with_separator(",")
    }
}

impl DecodeHook for StringToList {
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError> {
        let value = match target {
            LeafKind::Strings => LeafValue::Strings(self.items(raw, |s| Ok(s.to_owned()))?),
            LeafKind::Bools => LeafValue::Bools(self.items(raw, parse_bool)?),
            LeafKind::Ints => LeafValue::Ints(self.items(raw, parse_int)?),
            LeafKind::Uints => LeafValue::Uints(self.items(raw, parse_uint)?),
            LeafKind::Durations => LeafValue::Durations(self.items(raw, parse_duration)?),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

/// Booleans and integers. Empty text is the zero value.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringToScalar;

impl DecodeHook for StringToScalar {
    fn decode(&self, raw: &str, target: LeafKind) -> Result<Option<LeafValue>, CoercionError> {
        let value = match (target, raw) {
            (LeafKind::Bool, "") => LeafValue::Bool(false),
            (LeafKind::Int, "") => LeafValue::Int(0),
            (LeafKind::Uint, "") => LeafValue::Uint(0),
            (LeafKind::Bool, _) => LeafValue::Bool(parse_bool(raw)?),
            (LeafKind::Int, _) => LeafValue::Int(parse_int(raw)?),
            (LeafKind::Uint, _) => LeafValue::Uint(parse_uint(raw)?),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}
