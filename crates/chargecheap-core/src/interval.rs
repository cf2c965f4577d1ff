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

use chargecheap_types::PricePoint;

/// Assumed interval when it cannot be inferred
pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;

/// Infer the sampling interval of a timestamp-sorted series
///
/// Smallest positive gap between neighbours, rounded to whole minutes. The
/// value is not snapped to 15/30/60.
pub fn detect_interval_minutes(points: &[PricePoint]) -> u32 {
    let smallest_gap_seconds = points
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds())
        .filter(|&seconds| seconds > 0)
        .min();

    match smallest_gap_seconds {
        // Sub-minute gaps still count as one minute
        Some(seconds) => u32::try_from((seconds + 30).div_euclid(60))
            .unwrap_or(DEFAULT_INTERVAL_MINUTES)
            .max(1),
        None => DEFAULT_INTERVAL_MINUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(offsets_minutes: &[i64]) -> Vec<PricePoint> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        offsets_minutes
            .iter()
            .map(|&m| PricePoint::new(base + Duration::minutes(m), 1.0))
            .collect()
    }

    #[test]
    fn test_five_minute_series_with_gap() {
        let points = series(&[0, 5, 10, 20, 25]);
        assert_eq!(detect_interval_minutes(&points), 5);
    }

    #[test]
    fn test_common_granularities() {
        assert_eq!(detect_interval_minutes(&series(&[0, 15, 30, 45])), 15);
        assert_eq!(detect_interval_minutes(&series(&[0, 60, 120])), 60);
    }

    #[test]
    fn test_defaults_without_enough_points() {
        assert_eq!(detect_interval_minutes(&[]), DEFAULT_INTERVAL_MINUTES);
        assert_eq!(detect_interval_minutes(&series(&[0])), DEFAULT_INTERVAL_MINUTES);
        assert_eq!(detect_interval_minutes(&series(&[0, 0])), DEFAULT_INTERVAL_MINUTES);
    }

    #[test]
    fn test_not_snapped_to_canonical_values() {
        assert_eq!(detect_interval_minutes(&series(&[0, 20, 40])), 20);
    }
}
