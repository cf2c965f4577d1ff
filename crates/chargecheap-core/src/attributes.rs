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

//! Human-readable description of a selection

use chargecheap_types::{
    BlockAttributes, DataSource, PricePoint, ResultAttributes, Selection, SelectionMode, Window,
};
use chrono::Duration;

use crate::timezone::TimezoneConfig;

/// Inputs of [`build_attributes`] that do not come from the selection
#[derive(Debug, Clone, Copy)]
pub struct AttributeContext<'a> {
    pub window: &'a Window,
    pub data_source: DataSource,
    pub selection_mode: SelectionMode,
    pub interval_minutes: u32,
    pub contiguous_mode: bool,
    /// Points inside the window before selection
    pub actual_points: usize,
    pub timezone: &'a TimezoneConfig,
    pub unit_label: &'a str,
}

pub fn format_price(price: f64, unit_label: &str) -> String {
    format!("{price:.2}{unit_label}")
}

fn point_label(point: &PricePoint, ctx: &AttributeContext<'_>) -> String {
    format!(
        "{} :: {}",
        ctx.timezone.label(point.timestamp),
        format_price(point.price, ctx.unit_label)
    )
}

/// Boundary price of the selection
///
/// Cheap selections report their most expensive slot, expensive selections
/// their cheapest one.
pub fn reference_price(selection: &Selection, mode: SelectionMode) -> Option<f64> {
    let point = match mode {
        SelectionMode::Cheap => selection.max_point(),
        SelectionMode::Expensive => selection.min_point(),
    };
    point.map(|p| p.price)
}

/// Number of slots a complete window would hold
pub fn expected_points(window: &Window, interval_minutes: u32) -> usize {
    if interval_minutes == 0 {
        return 0;
    }
    #[expect(clippy::cast_precision_loss)]
    let slots = window.span().num_minutes() as f64 / f64::from(interval_minutes);
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = slots.round().max(0.0) as usize;
    rounded
}

/// Build the attributes and the numeric reference price
pub fn build_attributes(
    selection: &Selection,
    ctx: &AttributeContext<'_>,
) -> (ResultAttributes, Option<f64>) {
    let reference = reference_price(selection, ctx.selection_mode);
    let expected = expected_points(ctx.window, ctx.interval_minutes);
    let missing = expected.checked_sub(ctx.actual_points).filter(|&m| m > 0);

    let interval = Duration::minutes(i64::from(ctx.interval_minutes));
    let block = selection.block.map(|block| BlockAttributes {
        start: ctx.timezone.label(block.start),
        stop: ctx.timezone.label(block.last_start + interval),
        average: format_price(block.average, ctx.unit_label),
    });

    let attributes = ResultAttributes {
        times: selection
            .points
            .iter()
            .map(|p| point_label(p, ctx))
            .collect(),
        max_time: selection.max_point().map(|p| point_label(p, ctx)),
        min_time: selection.min_point().map(|p| point_label(p, ctx)),
        reference_price: reference.map(|price| format_price(price, ctx.unit_label)),
        reference_price_mode: ctx.selection_mode.reference_mode(),
        selection_mode: ctx.selection_mode,
        count: selection.len(),
        search_period: format!(
            "{} → {}",
            ctx.timezone.label(ctx.window.start),
            ctx.timezone.label(ctx.window.end)
        ),
        data_source: ctx.data_source,
        interval_minutes: ctx.interval_minutes,
        contiguous_mode: ctx.contiguous_mode,
        rolling_24h: ctx.window.mode.is_rolling_24h(),
        block,
        single_selection: selection.len() == 1,
        total_hours_span: (ctx.window.span_hours() * 100.0).round() / 100.0,
        expected_points: expected,
        actual_points: ctx.actual_points,
        missing_points: missing,
        partial_period: missing.is_some(),
    };

    (attributes, reference)
}
