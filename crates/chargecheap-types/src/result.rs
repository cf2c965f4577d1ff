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

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::window::Window;

// ============= Descriptive Attributes =============

/// Which end of the price distribution is being selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Cheap,
    Expensive,
}

impl SelectionMode {
    pub fn from_invert(invert_selection: bool) -> Self {
        if invert_selection {
            Self::Expensive
        } else {
            Self::Cheap
        }
    }

    pub fn reference_mode(self) -> ReferencePriceMode {
        match self {
            Self::Cheap => ReferencePriceMode::CheapSelectionMax,
            Self::Expensive => ReferencePriceMode::ExpensiveSelectionMin,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cheap => write!(f, "cheap"),
            Self::Expensive => write!(f, "expensive"),
        }
    }
}

/// How the reference price was derived from the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePriceMode {
    /// Highest price still accepted among the cheap slots
    CheapSelectionMax,
    /// Lowest price among the expensive slots
    ExpensiveSelectionMin,
}

/// Day buffers that were merged to build the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "yesterday + today + tomorrow")]
    YesterdayTodayTomorrow,
    #[serde(rename = "yesterday + today")]
    YesterdayToday,
    #[serde(rename = "today + tomorrow")]
    TodayTomorrow,
    #[serde(rename = "today")]
    TodayOnly,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::YesterdayTodayTomorrow => "yesterday + today + tomorrow",
            Self::YesterdayToday => "yesterday + today",
            Self::TodayTomorrow => "today + tomorrow",
            Self::TodayOnly => "today",
        };
        f.write_str(label)
    }
}

/// Labels of a contiguous block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockAttributes {
    pub start: String,
    /// End of the last slot (last start + interval)
    pub stop: String,
    pub average: String,
}

/// Read-only description of one invocation's selection, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultAttributes {
    /// `<local time> :: <price><unit>` for every selected slot, in time order
    pub times: Vec<String>,
    pub max_time: Option<String>,
    pub min_time: Option<String>,
    pub reference_price: Option<String>,
    pub reference_price_mode: ReferencePriceMode,
    pub selection_mode: SelectionMode,
    pub count: usize,
    pub search_period: String,
    pub data_source: DataSource,
    pub interval_minutes: u32,
    pub contiguous_mode: bool,
    pub rolling_24h: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockAttributes>,
    pub single_selection: bool,
    pub total_hours_span: f64,
    pub expected_points: usize,
    pub actual_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_points: Option<usize>,
    pub partial_period: bool,
}

// ============= Invocation Result =============

/// Why the output signal has its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalReason {
    /// Now falls inside a selected slot
    Active,
    /// Inside the window but not in a selected slot
    NotSelected,
    /// Now is outside the analysis window
    OutsideWindow,
    /// No reference price could be derived
    NoReference,
    /// No price points fall inside the window yet
    WaitingForData,
    /// Persisted state was cleared
    Reset,
    /// The invocation failed
    Error,
}

/// Everything handed to the output sink after one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeCheapResult {
    /// Boundary price of the selection, `None` while waiting or on error
    pub reference_price: Option<f64>,

    pub attributes: Option<ResultAttributes>,

    /// On/off decision; `None` when indeterminate (no data, reset, error)
    pub active_signal: Option<bool>,

    pub signal_reason: SignalReason,

    /// Value for the downstream set-point, `None` on reset or error
    pub setpoint: Option<f64>,

    /// Window the decision was made for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<Window>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,

    pub error_reason: Option<String>,
}

impl ChargeCheapResult {
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            reference_price: None,
            attributes: None,
            active_signal: None,
            signal_reason: SignalReason::Error,
            setpoint: None,
            window: None,
            info: None,
            error_reason: Some(reason.into()),
        }
    }

    pub fn waiting_for_data(window: Window, force_value: f64) -> Self {
        Self {
            reference_price: None,
            attributes: None,
            active_signal: None,
            signal_reason: SignalReason::WaitingForData,
            setpoint: Some(force_value),
            window: Some(window),
            info: Some("No valid times, waiting for data".to_owned()),
            error_reason: None,
        }
    }

    pub fn reset() -> Self {
        Self {
            reference_price: None,
            attributes: None,
            active_signal: None,
            signal_reason: SignalReason::Reset,
            setpoint: None,
            window: None,
            info: Some("context fully reset".to_owned()),
            error_reason: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_reason.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_labels_match_serialized_form() {
        for source in [
            DataSource::YesterdayTodayTomorrow,
            DataSource::YesterdayToday,
            DataSource::TodayTomorrow,
            DataSource::TodayOnly,
        ] {
            let json = serde_json::to_value(source).unwrap();
            assert_eq!(json, serde_json::Value::String(source.to_string()));
        }
    }

    #[test]
    fn test_reference_mode_follows_selection_mode() {
        assert_eq!(
            SelectionMode::from_invert(false).reference_mode(),
            ReferencePriceMode::CheapSelectionMax
        );
        assert_eq!(
            SelectionMode::from_invert(true).reference_mode(),
            ReferencePriceMode::ExpensiveSelectionMin
        );
    }

    #[test]
    fn test_error_result_is_indeterminate() {
        let result = ChargeCheapResult::error("start/stop/count missing");
        assert!(result.is_error());
        assert_eq!(result.active_signal, None);
        assert_eq!(result.reference_price, None);
        assert_eq!(result.signal_reason, SignalReason::Error);
    }
}
