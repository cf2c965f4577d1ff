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

//! Slot selection
//!
//! Picks the N cheapest (or most expensive) slots of a timestamp-sorted,
//! windowed series, either independently or as one unbroken block.

use chargecheap_types::{BlockMeta, PricePoint, Selection};
use chrono::Duration;
use tracing::debug;

use crate::policy::clamp_count;

/// What to select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest {
    pub count: usize,
    /// Most expensive instead of cheapest
    pub invert: bool,
    pub contiguous: bool,
}

/// Select slots from a timestamp-sorted series
pub fn select(
    points: &[PricePoint],
    request: SelectionRequest,
    interval_minutes: u32,
) -> Selection {
    let count = clamp_count(request.count, points.len());
    if count == 0 {
        return Selection::empty();
    }

    if request.contiguous {
        select_block(points, count, request.invert, interval_minutes)
    } else {
        select_best(points, count, request.invert)
    }
}

fn select_best(points: &[PricePoint], count: usize, invert: bool) -> Selection {
    let mut ranked = points.to_vec();
    // Stable sort: equal prices keep time order
    if invert {
        ranked.sort_by(|a, b| b.price.total_cmp(&a.price));
    } else {
        ranked.sort_by(|a, b| a.price.total_cmp(&b.price));
    }
    ranked.truncate(count);
    ranked.sort_by_key(|p| p.timestamp);

    Selection {
        points: ranked,
        block: None,
    }
}

fn average(run: &[PricePoint]) -> f64 {
    #[expect(clippy::cast_precision_loss)]
    let len = run.len() as f64;
    run.iter().map(|p| p.price).sum::<f64>() / len
}

fn is_regular(run: &[PricePoint], interval: Duration) -> bool {
    run.windows(2)
        .all(|pair| pair[1].timestamp - pair[0].timestamp == interval)
}

fn select_block(
    points: &[PricePoint],
    count: usize,
    invert: bool,
    interval_minutes: u32,
) -> Selection {
    let interval = Duration::minutes(i64::from(interval_minutes));

    let regular: Vec<&[PricePoint]> = points
        .windows(count)
        .filter(|run| is_regular(run, interval))
        .collect();

    // Holes in the data leave no gap-free run; fall back to neighbouring points
    let candidates: Vec<&[PricePoint]> = if regular.is_empty() {
        debug!(
            "No gap-free run of {} slots at {} min, using index-consecutive runs",
            count, interval_minutes
        );
        points.windows(count).collect()
    } else {
        regular
    };

    let mut best: Option<(&[PricePoint], f64)> = None;
    for run in candidates {
        let mean = average(run);
        let better = match best {
            None => true,
            Some((_, best_mean)) if invert => mean > best_mean,
            Some((_, best_mean)) => mean < best_mean,
        };
        if better {
            best = Some((run, mean));
        }
    }

    let Some((run, mean)) = best else {
        return Selection::empty();
    };

    Selection {
        points: run.to_vec(),
        block: Some(BlockMeta {
            average: mean,
            start: run[0].timestamp,
            last_start: run[run.len() - 1].timestamp,
        }),
    }
}
