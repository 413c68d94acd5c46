//! Duration literal interpreter.
//!
//! The framework writes execution times as duration literals such as `0.7900ms`,
//! `12s` or `1m30.5s`: an optional sign followed by one or more
//! `<decimal><unit>` components. Accepted units are `ns`, `us` (also `µs`/`μs`),
//! `ms`, `s`, `m` and `h`. A bare `0` is accepted without a unit.
//!
//! Only the magnitude is returned; the sign is accepted and dropped.

use std::time::Duration;

use thiserror::Error;

/// Largest magnitude representable by a signed 64-bit nanosecond count.
const MAX_NANOS: u128 = i64::MAX as u128;
/// Magnitude of `i64::MIN`, allowed for negative literals.
const MAX_NEGATIVE_NANOS: u128 = MAX_NANOS + 1;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Why a duration literal could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("empty duration literal")]
    Empty,
    #[error("invalid duration '{0}'")]
    Invalid(String),
    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),
    #[error("unknown unit '{unit}' in duration '{literal}'")]
    UnknownUnit { unit: String, literal: String },
    #[error("duration '{0}' out of range")]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parses a duration literal, returning its absolute value.
pub fn parse_duration(literal: &str) -> Result<Duration, DurationParseError> {
    if literal.is_empty() {
        return Err(DurationParseError::Empty);
    }
    let invalid = || DurationParseError::Invalid(literal.to_string());

    let (negative, mut rest) = match literal.as_bytes()[0] {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let limit = if negative { MAX_NEGATIVE_NANOS } else { MAX_NANOS };
    let overflow = || DurationParseError::Overflow(literal.to_string());
    let mut total: u128 = 0;

    while !rest.is_empty() {
        // Integer part.
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after_int) = rest.split_at(int_len);
        rest = after_int;

        // Optional fraction.
        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            (frac_digits, rest) = after_dot.split_at(frac_len);
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid());
        }

        // Unit runs until the next digit or dot.
        let unit_len = rest
            .char_indices()
            .find(|&(_, c)| c == '.' || c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        if unit_len == 0 {
            return Err(DurationParseError::MissingUnit(literal.to_string()));
        }
        let (unit, after_unit) = rest.split_at(unit_len);
        rest = after_unit;
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            literal: literal.to_string(),
        })?;

        let whole = parse_digits(int_digits).ok_or_else(overflow)?;
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;
        if !frac_digits.is_empty() {
            nanos = nanos
                .checked_add(fraction_nanos(frac_digits, scale))
                .ok_or_else(overflow)?;
        }
        total = total.checked_add(nanos).ok_or_else(overflow)?;
        if total > limit {
            return Err(overflow());
        }
    }

    let nanos = u64::try_from(total).map_err(|_| overflow())?;
    Ok(Duration::from_nanos(nanos))
}

fn parse_digits(digits: &str) -> Option<u128> {
    if digits.is_empty() {
        return Some(0);
    }
    let value = digits.parse::<u128>().ok()?;
    (value <= MAX_NEGATIVE_NANOS).then_some(value)
}

/// Converts fractional digits of a component to nanoseconds, truncating
/// precision beyond what the unit can express.
fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for d in digits.bytes() {
        // Digits past nanosecond resolution cannot change the result.
        if denominator > NANOS_PER_SEC * 3600 {
            break;
        }
        numerator = numerator * 10 + u128::from(d - b'0');
        denominator *= 10;
    }
    numerator * scale / denominator
}
