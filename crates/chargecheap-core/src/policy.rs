// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of ChargeCheap.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Numeric clamping policies
//!
//! Every bound applied to hours and counts lives here and each rule is
//! defined and tested once:
//! - [`normalize_override`] for values arriving with an input record
//! - [`clamp_to_range`] for statically configured values
//! - [`clamp_count_for_interval`] after the sampling interval is known
//! - [`clamp_count`] inside the selector

use serde_json::Value;

/// Highest valid start/stop hour
pub const MAX_HOUR: u32 = 23;

/// Highest slot count accepted from input (96 quarter-hours minus one)
pub const MAX_COUNT: u32 = 95;

/// Intervals at or above this many minutes are treated as hourly data
pub const HOURLY_INTERVAL_THRESHOLD_MINUTES: u32 = 55;

/// Most slots that can be requested from hourly data
pub const MAX_HOURLY_COUNT: u32 = 23;

/// Clamp a signed value into `[min, max]`
pub fn clamp_to_range(value: i64, min: u32, max: u32) -> u32 {
    let clamped = value.clamp(i64::from(min), i64::from(max));
    u32::try_from(clamped).unwrap_or(min)
}

/// Normalize a loosely typed override (number, numeric string, or a string
/// containing digits) into `[0, max]`
///
/// Fractions are floored. Returns `None` for null, booleans, empty strings and
/// strings without any digits.
pub fn normalize_override(value: &Value, max: u32) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_loose_number(s)?,
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => return None,
    };

    if !number.is_finite() {
        return None;
    }

    #[expect(clippy::cast_possible_truncation)]
    let floored = number.floor() as i64;
    Some(clamp_to_range(floored, 0, max))
}

fn parse_loose_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return Some(n);
    }

    // "08:00", "6h", "count 4": take the first run of digits
    let digits: String = trimmed
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<f64>().ok()
}

/// Limit a requested count to the number of available points
pub fn clamp_count(requested: usize, available: usize) -> usize {
    requested.min(available)
}

/// Hourly data cannot yield more than 23 slots per window
pub fn clamp_count_for_interval(count: u32, interval_minutes: u32) -> u32 {
    if interval_minutes >= HOURLY_INTERVAL_THRESHOLD_MINUTES && count > MAX_HOURLY_COUNT {
        MAX_HOURLY_COUNT
    } else {
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_to_range() {
        assert_eq!(clamp_to_range(-5, 0, 23), 0);
        assert_eq!(clamp_to_range(7, 0, 23), 7);
        assert_eq!(clamp_to_range(99, 0, 23), 23);
    }

    #[test]
    fn test_normalize_numbers() {
        assert_eq!(normalize_override(&json!(6), MAX_HOUR), Some(6));
        assert_eq!(normalize_override(&json!(6.9), MAX_HOUR), Some(6));
        assert_eq!(normalize_override(&json!(-3), MAX_HOUR), Some(0));
        assert_eq!(normalize_override(&json!(40), MAX_HOUR), Some(23));
        assert_eq!(normalize_override(&json!(120), MAX_COUNT), Some(95));
    }

    #[test]
    fn test_normalize_strings() {
        assert_eq!(normalize_override(&json!(" 22 "), MAX_HOUR), Some(22));
        assert_eq!(normalize_override(&json!("08:00"), MAX_HOUR), Some(8));
        assert_eq!(normalize_override(&json!("count 4"), MAX_COUNT), Some(4));
        assert_eq!(normalize_override(&json!("none"), MAX_COUNT), None);
        assert_eq!(normalize_override(&json!(""), MAX_COUNT), None);
    }

    #[test]
    fn test_normalize_rejects_other_types() {
        assert_eq!(normalize_override(&Value::Null, MAX_HOUR), None);
        assert_eq!(normalize_override(&json!(true), MAX_HOUR), None);
        assert_eq!(normalize_override(&json!([1]), MAX_HOUR), None);
    }

    #[test]
    fn test_clamp_count_for_interval() {
        assert_eq!(clamp_count_for_interval(30, 60), 23);
        assert_eq!(clamp_count_for_interval(30, 55), 23);
        assert_eq!(clamp_count_for_interval(23, 60), 23);
        assert_eq!(clamp_count_for_interval(30, 15), 30);
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(5, 3), 3);
        assert_eq!(clamp_count(2, 3), 2);
    }
}
