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

//! Raw price record normalization
//!
//! Upstream price integrations disagree on field names and units. Every raw
//! record is resolved through a fixed, priority-ordered field table into one
//! canonical [`PricePoint`], with prices converted to the minor currency unit.

use chargecheap_types::{DayBuffer, PricePoint};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::timezone::TimezoneConfig;

/// Timestamp fields, first present non-empty string wins
pub const TIMESTAMP_FIELDS: [&str; 4] = ["start", "start_time", "startTime", "date"];

/// Price fields, first present non-null value wins
pub const VALUE_FIELDS: [&str; 2] = ["value", "price"];

/// Unit tokens meaning the price is already in the minor unit
const MINOR_UNIT_TOKENS: [&str; 4] = ["öre", "ore", "cent", "ct"];

/// Unit tokens of currencies quoted in major units
const MAJOR_UNIT_TOKENS: [&str; 4] = ["eur", "sek", "nok", "dkk"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ============= Unit Conversion =============

/// Conversion applied to every raw value of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitConversion {
    /// Value is already in the minor unit (or the unit is unknown)
    PassThrough,
    /// Value is in a major unit (EUR/kWh, SEK/kWh) and is multiplied by 100
    MajorToMinor,
}

impl UnitConversion {
    /// Resolve the conversion from the unit descriptor
    ///
    /// Minor-unit markers are checked first, so "EUR cent/kWh" passes through.
    pub fn detect(unit_of_measurement: Option<&str>, price_in_cents: bool) -> Self {
        let unit = unit_of_measurement.unwrap_or_default().to_lowercase();

        if price_in_cents || MINOR_UNIT_TOKENS.iter().any(|t| unit.contains(t)) {
            return Self::PassThrough;
        }
        if MAJOR_UNIT_TOKENS.iter().any(|t| unit.contains(t)) {
            return Self::MajorToMinor;
        }
        Self::PassThrough
    }

    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::PassThrough => value,
            Self::MajorToMinor => value * 100.0,
        }
    }
}

// ============= Field Resolution =============

fn resolve_timestamp_field(record: &serde_json::Map<String, Value>) -> Option<&str> {
    TIMESTAMP_FIELDS
        .iter()
        .filter_map(|field| record.get(*field).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}

fn resolve_value_field(record: &serde_json::Map<String, Value>) -> Option<f64> {
    let raw = VALUE_FIELDS
        .iter()
        .filter_map(|field| record.get(*field))
        .find(|v| !v.is_null())?;

    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse a timestamp string into an instant
///
/// Accepts RFC 3339 (with offset) and naive local date-times or dates, which
/// are interpreted in the configured time zone.
pub fn parse_timestamp(raw: &str, timezone: &TimezoneConfig) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return timezone.resolve_local(naive);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| timezone.resolve_local(naive))
}

// ============= Normalization =============

/// Normalize one raw record, `None` when it cannot be used
pub fn normalize_record(
    record: &Value,
    conversion: UnitConversion,
    timezone: &TimezoneConfig,
) -> Option<PricePoint> {
    let object = record.as_object()?;

    let timestamp = resolve_timestamp_field(object).and_then(|s| parse_timestamp(s, timezone))?;
    let price = conversion.apply(resolve_value_field(object)?);

    price.is_finite().then(|| PricePoint::new(timestamp, price))
}

/// Normalize raw records in input order, dropping unusable ones
pub fn normalize_records(
    records: &[Value],
    conversion: UnitConversion,
    timezone: &TimezoneConfig,
) -> Vec<PricePoint> {
    let points: Vec<PricePoint> = records
        .iter()
        .filter_map(|record| normalize_record(record, conversion, timezone))
        .collect();

    let dropped = records.len() - points.len();
    if dropped > 0 {
        debug!(
            "Dropped {} of {} raw price records (unparseable timestamp or price)",
            dropped,
            records.len()
        );
    }

    points
}

/// Build a day buffer from raw records
///
/// The buffer is dated by the local calendar day of its first usable point.
/// Returns `None` when no record survives normalization.
pub fn normalize_day(
    records: &[Value],
    conversion: UnitConversion,
    timezone: &TimezoneConfig,
) -> Option<DayBuffer> {
    let points = normalize_records(records, conversion, timezone);
    let first = points.first()?;
    let date = timezone.local_date(first.timestamp);
    Some(DayBuffer::new(date, points))
}
