//! Duration strings for time-window filters.
//!
//! Two forms are accepted:
//!
//! - standard compound forms: `90s`, `15m`, `1h30m`, `1.5h`, `250ms`
//! - calendar-ish units: `<number>d`, `w`, `mo` (30 days), `y` (365 days), e.g. `7d`, `2.5w`
//!
//! Anything else, including the empty string, is an `InvalidFormat` error.

use crate::error::{PadError, Result};
use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

static STANDARD_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)?(?:ns|us|µs|ms|s|m|h))+$").expect("valid duration regex")
});

static STANDARD_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)(ns|us|µs|ms|s|m|h)").expect("valid duration regex")
});

static EXTENDED_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(d|w|mo|y)$").expect("valid duration regex"));

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

fn unit_seconds(unit: &str) -> Option<f64> {
    let seconds = match unit {
        "ns" => 1e-9,
        "us" | "µs" => 1e-6,
        "ms" => 1e-3,
        "s" => 1.0,
        "m" => 60.0,
        "h" => 3_600.0,
        "d" => 86_400.0,
        "w" => 7.0 * 86_400.0,
        "mo" => 30.0 * 86_400.0,
        "y" => 365.0 * 86_400.0,
        _ => return None,
    };
    Some(seconds)
}

fn part_nanos(number: &str, unit: &str, input: &str) -> Result<f64> {
    let value: f64 = number
        .parse()
        .map_err(|_| PadError::InvalidFormat(format!("invalid duration: {}", input)))?;
    let seconds = unit_seconds(unit)
        .ok_or_else(|| PadError::InvalidFormat(format!("unknown duration unit in: {}", input)))?;
    Ok(value * seconds * NANOS_PER_SECOND)
}

pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return Err(PadError::InvalidFormat("empty duration".to_string()));
    }
    if s == "0" {
        return Ok(Duration::zero());
    }

    let nanos = if STANDARD_FORM.is_match(s) {
        let mut total = 0.0;
        for caps in STANDARD_PART.captures_iter(s) {
            total += part_nanos(&caps[1], &caps[2], input)?;
        }
        total
    } else if let Some(caps) = EXTENDED_FORM.captures(s) {
        part_nanos(&caps[1], &caps[2], input)?
    } else {
        return Err(PadError::InvalidFormat(format!("invalid duration: {}", input)));
    };

    if !nanos.is_finite() || nanos > i64::MAX as f64 {
        return Err(PadError::InvalidFormat(format!("duration out of range: {}", input)));
    }
    Ok(Duration::nanoseconds(nanos.round() as i64))
}
