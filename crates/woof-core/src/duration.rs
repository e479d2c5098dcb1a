//! Duration grammar shared by configuration and status files.
//!
//! Accepts the `<number><unit>` sequences familiar from Go and most
//! ops tooling (`30s`, `1h30m`, `1.5h`, `250ms`) and prints durations
//! back in the same style (`1h0m0s`, `1m30s`, `12.5ms`, `0s`), so status
//! files written by older monitors keep loading.

use std::time::Duration;

use crate::error::{CoreError, CoreResult};

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn invalid(input: &str, reason: &'static str) -> CoreError {
    CoreError::InvalidDuration {
        input: input.to_string(),
        reason,
    }
}

/// Parse a duration string like `"30s"`, `"1h30m"` or `"1.5m"`.
///
/// A bare `"0"` is zero. Negative durations are rejected.
pub fn parse_duration(input: &str) -> CoreResult<Duration> {
    let mut rest = input.trim();
    if let Some(unsigned) = rest.strip_prefix('+') {
        rest = unsigned;
    } else if rest.starts_with('-') {
        return Err(invalid(input, "negative durations are not allowed"));
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid(input, "empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (int_part, after) = rest.split_at(int_len);

        let (frac_part, after) = match after.strip_prefix('.') {
            Some(frac) => {
                let frac_len = frac
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(frac.len());
                frac.split_at(frac_len)
            }
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid(input, "expected a number"));
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        if unit.is_empty() {
            return Err(invalid(input, "missing unit"));
        }
        let scale = unit_scale(unit).ok_or_else(|| invalid(input, "unknown unit"))?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| invalid(input, "number out of range"))?
        };
        let mut nanos = whole
            .checked_mul(scale)
            .ok_or_else(|| invalid(input, "number out of range"))?;

        // Digits past 10^18 cannot change the nanosecond result.
        let mut numerator: u128 = 0;
        let mut denominator: u128 = 1;
        for digit in frac_part.bytes() {
            if denominator >= 1_000_000_000_000_000_000 {
                break;
            }
            numerator = numerator * 10 + u128::from(digit - b'0');
            denominator *= 10;
        }
        nanos = nanos
            .checked_add(numerator * scale / denominator)
            .ok_or_else(|| invalid(input, "number out of range"))?;

        total = total
            .checked_add(nanos)
            .ok_or_else(|| invalid(input, "number out of range"))?;
        rest = after;
    }

    if total > u128::from(u64::MAX) {
        return Err(invalid(input, "number out of range"));
    }
    Ok(Duration::from_nanos(total as u64))
}

/// Split `value` into its whole part and a trimmed `.fraction` suffix.
fn split_frac(value: u128, precision: u32) -> (u128, String) {
    let scale = 10u128.pow(precision);
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return (whole, String::new());
    }
    let digits = format!("{frac:0width$}", width = precision as usize);
    (whole, format!(".{}", digits.trim_end_matches('0')))
}

/// Format a duration the way `parse_duration` reads it back.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        let (whole, frac) = split_frac(nanos, 3);
        return format!("{whole}{frac}µs");
    }
    if nanos < NANOS_PER_SEC {
        let (whole, frac) = split_frac(nanos, 6);
        return format!("{whole}{frac}ms");
    }

    let (secs, frac) = split_frac(nanos, 9);
    let hours = secs / 3600;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}{frac}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}{frac}s")
    } else {
        format!("{seconds}{frac}s")
    }
}

/// Serde adapter storing a `Duration` as duration text.
///
/// An empty string deserializes to zero.
pub mod text {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(Duration::ZERO);
        }
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
