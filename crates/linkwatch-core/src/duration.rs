//! Interval string parsing.
//!
//! Accepts compound duration strings such as `"300ms"`, `"1.5s"`,
//! `"1m30s"` or `"2h"`. Every component needs a unit; the recognised
//! units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
//!
//! Zero and negative durations are rejected: an interval of zero would
//! turn a probe cycle into a busy loop.

use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fractional digits beyond this are ignored (below nanosecond precision).
const MAX_FRACTION_DIGITS: usize = 18;

/// Parse a duration string like `"5s"`, `"500ms"` or `"1m30s"`.
pub fn parse_duration(input: &str) -> ConfigResult<Duration> {
    let invalid = |reason: &str| ConfigError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let s = input.trim();
    if s.is_empty() {
        return Err(invalid("empty duration"));
    }
    if s.starts_with('-') {
        return Err(invalid("duration must be positive"));
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let mut total: u128 = 0;
    let mut rest = s;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);

        let scale = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3600 * NANOS_PER_SEC,
            "" => return Err(invalid("missing unit")),
            other => return Err(invalid(&format!("unknown unit {other:?}"))),
        };

        let nanos = component_nanos(number, scale).ok_or_else(|| invalid("expected a number"))?;
        total = total
            .checked_add(nanos)
            .ok_or_else(|| invalid("duration overflows"))?;
        rest = next;
    }

    if total == 0 {
        return Err(invalid("duration must be greater than zero"));
    }

    let nanos = u64::try_from(total).map_err(|_| invalid("duration overflows"))?;
    Ok(Duration::from_nanos(nanos))
}

/// Convert `"1.25"` at `scale` nanoseconds per unit into nanoseconds.
fn component_nanos(number: &str, scale: u128) -> Option<u128> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(scale)?;

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if !fraction.is_empty() {
        let digits: u128 = fraction.parse().ok()?;
        let denominator = 10u128.pow(fraction.len() as u32);
        nanos = nanos.checked_add(digits * scale / denominator)?;
    }

    Some(nanos)
}
