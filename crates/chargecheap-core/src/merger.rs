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

//! Day buffer bookkeeping and series merging

use std::collections::HashSet;

use anyhow::Result;
use chargecheap_types::{DataSource, DayBuffer, PricePoint, WindowMode};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::store::{StateStore, StateStoreExt, StoreKey};

/// Remove duplicate timestamps, keeping the first occurrence
pub fn dedupe_by_timestamp(points: Vec<PricePoint>) -> Vec<PricePoint> {
    let mut seen: HashSet<DateTime<Utc>> = HashSet::with_capacity(points.len());
    points
        .into_iter()
        .filter(|p| seen.insert(p.timestamp))
        .collect()
}

/// Concatenate series in priority order, dedupe, then sort by timestamp
pub fn merge_series<'a>(parts: impl IntoIterator<Item = &'a [PricePoint]>) -> Vec<PricePoint> {
    let concatenated: Vec<PricePoint> = parts.into_iter().flatten().copied().collect();
    let mut merged = dedupe_by_timestamp(concatenated);
    merged.sort_by_key(|p| p.timestamp);
    merged
}

/// Decide which day buffers feed the window
///
/// An overnight window still running (before the stop hour) needs yesterday's
/// evening. Once it has ended it looks ahead to tonight, which needs tomorrow's
/// data; without it we keep reading yesterday + today like the still-running case.
pub fn plan_source(
    mode: WindowMode,
    stop_hour: u32,
    now_local_hour: u32,
    has_tomorrow: bool,
) -> DataSource {
    match mode {
        WindowMode::Rolling => DataSource::YesterdayTodayTomorrow,
        WindowMode::WholeDay => DataSource::TodayOnly,
        WindowMode::Fixed { overnight: true } if now_local_hour < stop_hour || !has_tomorrow => {
            DataSource::YesterdayToday
        }
        WindowMode::Fixed { .. } => DataSource::TodayTomorrow,
    }
}

// ============= Day Buffers =============

/// Persisted yesterday/today/tomorrow buffers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBuffers {
    pub yesterday: Option<DayBuffer>,
    pub today: Option<DayBuffer>,
    pub tomorrow: Option<DayBuffer>,
}

impl DayBuffers {
    /// Read all buffers from the store
    pub fn load<S: StateStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            yesterday: store.get_typed(StoreKey::YesterdayData)?,
            today: store.get_typed(StoreKey::TodayData)?,
            tomorrow: store.get_typed(StoreKey::TomorrowData)?,
        })
    }

    /// Write all buffers back, removing keys of absent buffers
    pub fn save<S: StateStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        for (key, buffer) in [
            (StoreKey::YesterdayData, &self.yesterday),
            (StoreKey::TodayData, &self.today),
            (StoreKey::TomorrowData, &self.tomorrow),
        ] {
            match buffer {
                Some(buffer) => store.set_typed(key, buffer)?,
                None => store.remove(key)?,
            }
        }
        Ok(())
    }

    /// Apply freshly received data
    ///
    /// A newer "today" pushes the stored one to "yesterday" and drops a cached
    /// "tomorrow" that is no longer ahead of it. Incoming data always replaces
    /// the stored buffer of the same slot.
    #[must_use]
    pub fn apply_incoming(
        mut self,
        incoming_today: Option<DayBuffer>,
        incoming_tomorrow: Option<DayBuffer>,
    ) -> Self {
        if let Some(incoming) = incoming_today {
            if let Some(current) = self.today.take()
                && current.date < incoming.date
            {
                info!(
                    "Rotating day buffers: today {} -> yesterday, new today {}",
                    current.date, incoming.date
                );
                self.yesterday = Some(current);

                if let Some(cached) = &self.tomorrow
                    && cached.date <= incoming.date
                {
                    debug!("Dropping stale tomorrow buffer dated {}", cached.date);
                    self.tomorrow = None;
                }
            }
            self.today = Some(incoming);
        }

        if let Some(incoming) = incoming_tomorrow.filter(|b| !b.is_empty()) {
            debug!("Caching tomorrow buffer dated {}", incoming.date);
            self.tomorrow = Some(incoming);
        }

        self
    }

    pub fn has_tomorrow(&self) -> bool {
        self.tomorrow.as_ref().is_some_and(|b| !b.is_empty())
    }

    fn points(buffer: Option<&DayBuffer>) -> &[PricePoint] {
        buffer.map(|b| b.points.as_slice()).unwrap_or_default()
    }

    /// Merged, deduplicated, time-sorted series for a data source
    pub fn merged(&self, source: DataSource) -> Vec<PricePoint> {
        let yesterday = Self::points(self.yesterday.as_ref());
        let today = Self::points(self.today.as_ref());
        let tomorrow = Self::points(self.tomorrow.as_ref());

        match source {
            DataSource::YesterdayTodayTomorrow => merge_series([yesterday, today, tomorrow]),
            DataSource::YesterdayToday => merge_series([yesterday, today]),
            DataSource::TodayTomorrow => merge_series([today, tomorrow]),
            DataSource::TodayOnly => merge_series([today]),
        }
    }
}
