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

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============= Price Series =============

/// A single spot price slot in canonical form
/// Price is expressed in the minor currency unit (öre, cent) after unit conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Start of this price slot
    pub timestamp: DateTime<Utc>,

    /// Price for this slot (minor currency unit per kWh)
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Cached price series for one calendar day (yesterday, today or tomorrow)
///
/// Buffers are persisted between invocations so that later runs do not need
/// the upstream source to re-supply the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBuffer {
    /// Local calendar day the series belongs to
    pub date: NaiveDate,

    /// Normalized points of that day
    pub points: Vec<PricePoint>,
}

impl DayBuffer {
    pub fn new(date: NaiveDate, points: Vec<PricePoint>) -> Self {
        Self { date, points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ============= Selection =============

/// Metadata of a contiguous block selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockMeta {
    /// Arithmetic mean price of the chosen run
    pub average: f64,

    /// Start of the first slot in the run
    pub start: DateTime<Utc>,

    /// Start of the last slot in the run (the block ends one interval later)
    pub last_start: DateTime<Utc>,
}

/// Slots chosen by the selector, ordered by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub points: Vec<PricePoint>,

    /// Present only for contiguous selections
    pub block: Option<BlockMeta>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_contiguous(&self) -> bool {
        self.block.is_some()
    }

    /// Highest-priced slot of the selection (first one wins ties)
    pub fn max_point(&self) -> Option<&PricePoint> {
        self.points
            .iter()
            .reduce(|best, p| if p.price > best.price { p } else { best })
    }

    /// Lowest-priced slot of the selection (first one wins ties)
    pub fn min_point(&self) -> Option<&PricePoint> {
        self.points
            .iter()
            .reduce(|best, p| if p.price < best.price { p } else { best })
    }
}
