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

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::error::{ChargeCheapError, Result};

/// Largest DST gap we step over when resolving a non-existent local time
const MAX_GAP_STEPS: i64 = 8;
const GAP_STEP_MINUTES: i64 = 15;

// ============= Timezone Configuration =============

/// Local time zone used for window hours, calendar days and labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    pub tz: Tz,
}

impl TimezoneConfig {
    #[must_use]
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parse an IANA name such as "Europe/Stockholm"
    pub fn parse(name: &str) -> Result<Self> {
        name.trim()
            .parse::<Tz>()
            .map(Self::new)
            .map_err(|_| ChargeCheapError::Timezone(name.to_owned()))
    }

    /// Local calendar day of an instant
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Local wall-clock hour (0-23) of an instant
    #[must_use]
    pub fn local_hour(&self, instant: DateTime<Utc>) -> u32 {
        instant.with_timezone(&self.tz).hour()
    }

    /// Resolve a local wall-clock time to an instant
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant. Times
    /// inside a DST gap resolve to the first valid local time after the gap.
    #[must_use]
    pub fn resolve_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        for step in 0..=MAX_GAP_STEPS {
            let candidate = naive + Duration::minutes(step * GAP_STEP_MINUTES);
            match self.tz.from_local_datetime(&candidate) {
                LocalResult::Single(dt) => return Some(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => return Some(earliest.with_timezone(&Utc)),
                LocalResult::None => {}
            }
        }
        None
    }

    /// Instant of `hour:00` local time on `date`
    pub fn at_hour(&self, date: NaiveDate, hour: u32) -> Result<DateTime<Utc>> {
        let time = NaiveTime::from_hms_opt(hour, 0, 0)
            .ok_or_else(|| ChargeCheapError::computation(format!("invalid hour {hour}")))?;
        self.resolve_local(date.and_time(time)).ok_or_else(|| {
            ChargeCheapError::computation(format!(
                "{date} {hour:02}:00 does not exist in {}",
                self.tz
            ))
        })
    }

    /// Human-readable local label, e.g. "2024-01-02 06:00"
    #[must_use]
    pub fn label(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Stockholm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stockholm() -> TimezoneConfig {
        TimezoneConfig::parse("Europe/Stockholm").unwrap()
    }

    #[test]
    fn test_parse_rejects_unknown_zone() {
        let err = TimezoneConfig::parse("Mars/Olympus").unwrap_err();
        assert!(matches!(err, ChargeCheapError::Timezone(_)));
    }

    #[test]
    fn test_local_date_and_hour_follow_zone() {
        let tz = stockholm();
        // 23:30 UTC in winter is 00:30 the next day in Stockholm
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();

        assert_eq!(tz.local_date(instant), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(tz.local_hour(instant), 0);
    }

    #[test]
    fn test_at_hour_skips_dst_gap() {
        let tz = stockholm();
        // 2024-03-31 02:00 does not exist in Stockholm; clocks jump to 03:00 CEST
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let resolved = tz.at_hour(date, 2).unwrap();

        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_at_hour_takes_earlier_ambiguous_instant() {
        let tz = stockholm();
        // 2024-10-27 02:00 occurs twice; the first is still CEST (UTC+2)
        let date = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();
        let resolved = tz.at_hour(date, 2).unwrap();

        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 10, 27, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_label_uses_local_time() {
        let tz = stockholm();
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 5, 0, 0).unwrap();
        assert_eq!(tz.label(instant), "2024-01-02 06:00");
    }

    #[test]
    fn test_invalid_hour_is_computation_error() {
        let tz = stockholm();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            tz.at_hour(date, 24),
            Err(ChargeCheapError::Computation(_))
        ));
    }
}
