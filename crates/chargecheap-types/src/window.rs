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

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How the analysis window is anchored to the configured hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum WindowMode {
    /// `start == stop`: 24 hours beginning at the most recent start hour
    Rolling,
    /// `start != stop`: daily start/stop window, spanning midnight when overnight
    Fixed { overnight: bool },
    /// `start == 0 && stop == 0`: the current calendar day, today's data only
    WholeDay,
}

impl WindowMode {
    /// Resolve the mode from configured start/stop hours
    pub fn from_hours(start_hour: u32, stop_hour: u32) -> Self {
        if start_hour == 0 && stop_hour == 0 {
            Self::WholeDay
        } else if start_hour == stop_hour {
            Self::Rolling
        } else {
            Self::Fixed {
                overnight: start_hour > stop_hour,
            }
        }
    }

    /// True for modes covering a full 24 hours from one anchor hour
    pub fn is_rolling_24h(&self) -> bool {
        matches!(self, Self::Rolling | Self::WholeDay)
    }
}

/// Half-open analysis window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub mode: WindowMode,
}

impl Window {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// Window length in hours (fractional across DST changes)
    #[expect(clippy::cast_precision_loss)]
    pub fn span_hours(&self) -> f64 {
        self.span().num_seconds() as f64 / 3600.0
    }
}
