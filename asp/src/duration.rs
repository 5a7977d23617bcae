//! Duration text in the `1h2m3.5s` grammar.

use std::iter::Peekable;
use std::str::Chars;
use std::time::Duration;

use crate::CoercionError;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// Fractional digits beyond this are read but ignored.
const MAX_FRACTION_DIGITS: u32 = 18;

/// Formats a duration as `72h3m0.5s`, `1.5ms`, `10ns` or `0s`.
///
/// ```
/// use std::time::Duration;
/// use asp::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(330)), "5m30s");
/// assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", fixed(nanos, NANOS_PER_MICRO, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", fixed(nanos, NANOS_PER_MILLI, 6));
    }
    let hours = nanos.div_euclid(NANOS_PER_HOUR);
    let minutes = nanos.rem_euclid(NANOS_PER_HOUR).div_euclid(NANOS_PER_MIN);
    let seconds = fixed(nanos.rem_euclid(NANOS_PER_MIN), NANOS_PER_SEC, 9);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// `value / scale` as a decimal with trailing fractional zeros removed.
fn fixed(value: u128, scale: u128, width: usize) -> String {
    let whole = value.div_euclid(scale);
    let fraction = value.rem_euclid(scale);
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Parses a duration such as `300ms`, `1.5h` or `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
/// is accepted. Negative values are rejected.
///
/// # Errors
///
/// Returns [`CoercionError::InvalidDuration`] when the text does not follow
/// the grammar or overflows.
pub fn parse_duration(raw: &str) -> Result<Duration, CoercionError> {
    let invalid = |reason| CoercionError::InvalidDuration {
        raw: raw.to_owned(),
        reason,
    };
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if body == "0" {
        return Ok(Duration::ZERO);
    }
    if body.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut chars = body.chars().peekable();
    let mut total: u128 = 0;
    while chars.peek().is_some() {
        let segment = segment(&mut chars).map_err(invalid)?;
        total = total
            .checked_add(segment)
            .ok_or_else(|| invalid("duration out of range"))?;
    }
    if negative && total > 0 {
        return Err(invalid("negative durations are not supported"));
    }
    let secs = u64::try_from(total.div_euclid(NANOS_PER_SEC))
        .map_err(|_| invalid("duration out of range"))?;
    let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SEC))
        .map_err(|_| invalid("duration out of range"))?;
    Ok(Duration::new(secs, nanos))
}

/// Reads one `<number><unit>` segment and returns it in nanoseconds.
fn segment(chars: &mut Peekable<Chars<'_>>) -> Result<u128, &'static str> {
    let out_of_range = "duration out of range";
    let mut whole: u128 = 0;
    let mut seen_digit = false;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        seen_digit = true;
        whole = whole
            .checked_mul(10)
            .and_then(|w| w.checked_add(u128::from(digit)))
            .ok_or(out_of_range)?;
    }

    let mut fraction: u128 = 0;
    let mut scale: u128 = 1;
    if chars.next_if_eq(&'.').is_some() {
        let mut read = 0;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            chars.next();
            seen_digit = true;
            if read < MAX_FRACTION_DIGITS {
                fraction = fraction * 10 + u128::from(digit);
                scale *= 10;
                read += 1;
            }
        }
    }
    if !seen_digit {
        return Err("expected a number");
    }

    let mut unit = String::new();
    while let Some(c) = chars.next_if(|c| !c.is_ascii_digit() && *c != '.') {
        unit.push(c);
    }
    let per_unit = match unit.as_str() {
        "ns" => 1,
        "us" | "µs" | "μs" => NANOS_PER_MICRO,
        "ms" => NANOS_PER_MILLI,
        "s" => NANOS_PER_SEC,
        "m" => NANOS_PER_MIN,
        "h" => NANOS_PER_HOUR,
        "" => return Err("missing unit"),
        _ => return Err("unknown unit"),
    };
    let whole_nanos = whole.checked_mul(per_unit).ok_or(out_of_range)?;
    let fraction_nanos = fraction
        .checked_mul(per_unit)
        .ok_or(out_of_range)?
        .div_euclid(scale);
    whole_nanos.checked_add(fraction_nanos).ok_or(out_of_range)
}
