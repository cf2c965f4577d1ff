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

//! Analysis window construction
//!
//! All windows are half-open `[start, end)` and computed in the configured
//! local time zone:
//! - Rolling (`start == stop`): 24 hours from the most recent start hour
//! - Fixed (`start != stop`): start hour to stop hour, next day when overnight
//! - WholeDay (`0 -> 0`): today 00:00 to tomorrow 00:00

use chargecheap_types::{Window, WindowMode};
use chrono::{DateTime, Days, Duration, Utc};
use tracing::debug;

use crate::error::{ChargeCheapError, Result};
use crate::timezone::TimezoneConfig;

/// Build the window for the given mode and current instant
pub fn build_window(
    mode: WindowMode,
    start_hour: u32,
    stop_hour: u32,
    now: DateTime<Utc>,
    timezone: &TimezoneConfig,
) -> Result<Window> {
    let window = match mode {
        WindowMode::Rolling => rolling_window(start_hour, now, timezone)?,
        WindowMode::Fixed { overnight } => {
            fixed_window(start_hour, stop_hour, overnight, now, timezone)?
        }
        WindowMode::WholeDay => whole_day_window(now, timezone)?,
    };

    debug!(
        "Window {:?}: {} -> {}",
        mode,
        timezone.label(window.start),
        timezone.label(window.end)
    );

    Ok(window)
}

fn rolling_window(
    start_hour: u32,
    now: DateTime<Utc>,
    timezone: &TimezoneConfig,
) -> Result<Window> {
    let today = timezone.local_date(now);
    let mut start = timezone.at_hour(today, start_hour)?;

    if now < start {
        let yesterday = shift_days(today, -1)?;
        start = timezone.at_hour(yesterday, start_hour)?;
    }

    Ok(Window {
        start,
        end: start + Duration::hours(24),
        mode: WindowMode::Rolling,
    })
}

fn fixed_window(
    start_hour: u32,
    stop_hour: u32,
    overnight: bool,
    now: DateTime<Utc>,
    timezone: &TimezoneConfig,
) -> Result<Window> {
    let now_hour = timezone.local_hour(now);
    let today = timezone.local_date(now);

    // Still in the tail of last night's window, or today's daytime window is over
    let base = if overnight && now_hour < stop_hour {
        shift_days(today, -1)?
    } else if !overnight && now_hour >= stop_hour {
        shift_days(today, 1)?
    } else {
        today
    };

    let end_date = if overnight { shift_days(base, 1)? } else { base };

    Ok(Window {
        start: timezone.at_hour(base, start_hour)?,
        end: timezone.at_hour(end_date, stop_hour)?,
        mode: WindowMode::Fixed { overnight },
    })
}

fn whole_day_window(now: DateTime<Utc>, timezone: &TimezoneConfig) -> Result<Window> {
    let today = timezone.local_date(now);

    Ok(Window {
        start: timezone.at_hour(today, 0)?,
        end: timezone.at_hour(shift_days(today, 1)?, 0)?,
        mode: WindowMode::WholeDay,
    })
}

fn shift_days(date: chrono::NaiveDate, days: i64) -> Result<chrono::NaiveDate> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| ChargeCheapError::computation(format!("date overflow from {date}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Tz;

    fn utc() -> TimezoneConfig {
        TimezoneConfig::new(Tz::UTC)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn build(start: u32, stop: u32, now: DateTime<Utc>) -> Window {
        build_window(WindowMode::from_hours(start, stop), start, stop, now, &utc()).unwrap()
    }

    #[test]
    fn test_overnight_window_evening() {
        let window = build(22, 6, at(10, 23));
        assert_eq!(window.start, at(10, 22));
        assert_eq!(window.end, at(11, 6));
    }

    #[test]
    fn test_overnight_window_tail_uses_previous_day() {
        let window = build(22, 6, at(10, 3));
        assert_eq!(window.start, at(9, 22));
        assert_eq!(window.end, at(10, 6));
    }

    #[test]
    fn test_overnight_window_daytime_looks_ahead() {
        let window = build(22, 6, at(10, 12));
        assert_eq!(window.start, at(10, 22));
        assert_eq!(window.end, at(11, 6));
    }

    #[test]
    fn test_daytime_window_before_and_after_stop() {
        let window = build(8, 20, at(10, 12));
        assert_eq!(window.start, at(10, 8));
        assert_eq!(window.end, at(10, 20));

        // today's window has ended, look at tomorrow's
        let window = build(8, 20, at(10, 20));
        assert_eq!(window.start, at(11, 8));
        assert_eq!(window.end, at(11, 20));
    }

    #[test]
    fn test_rolling_window_before_start_hour() {
        let window = build(6, 6, at(10, 3));
        assert_eq!(window.start, at(9, 6));
        assert_eq!(window.end, at(10, 6));
        assert_eq!(window.mode, WindowMode::Rolling);
    }

    #[test]
    fn test_rolling_window_after_start_hour() {
        let window = build(6, 6, at(10, 6));
        assert_eq!(window.start, at(10, 6));
        assert_eq!(window.end, at(11, 6));
    }

    #[test]
    fn test_whole_day_window() {
        let window = build(0, 0, at(10, 15));
        assert_eq!(window.start, at(10, 0));
        assert_eq!(window.end, at(11, 0));
        assert_eq!(window.mode, WindowMode::WholeDay);
    }

    #[test]
    fn test_window_in_local_zone() {
        let stockholm = TimezoneConfig::default();
        // 22:30 UTC = 23:30 Stockholm (winter)
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 22, 30, 0).unwrap();
        let window = build_window(WindowMode::from_hours(22, 6), 22, 6, now, &stockholm).unwrap();

        assert_eq!(window.start, at(10, 21));
        assert_eq!(window.end, at(11, 5));
    }

    #[test]
    fn test_rolling_window_spans_24_hours_across_dst() {
        let stockholm = TimezoneConfig::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap();
        let window = build_window(WindowMode::Rolling, 6, 6, now, &stockholm).unwrap();

        assert_eq!(window.span(), Duration::hours(24));
    }
}
