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

use chargecheap_types::{Selection, Window};
use chrono::{DateTime, Duration, Utc};

/// Where "now" falls relative to the window and the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    /// Now is inside `[slot, slot + interval)` of a selected slot
    pub active: bool,
    pub outside_window: bool,
}

pub fn evaluate(
    selection: &Selection,
    window: &Window,
    interval_minutes: u32,
    now: DateTime<Utc>,
) -> Activity {
    let interval = Duration::minutes(i64::from(interval_minutes));

    let active = selection
        .points
        .iter()
        .any(|p| p.timestamp <= now && now < p.timestamp + interval);

    Activity {
        active,
        outside_window: !window.contains(now),
    }
}
