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

// ============= Engine Configuration =============

/// Static configuration of the selection engine
///
/// `start_hour`, `stop_hour` and `count` may be left unset here and supplied
/// per invocation instead. Overrides received at runtime are persisted and take
/// precedence over these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Local hour (0-23) the search window opens
    #[serde(default)]
    pub start_hour: Option<u32>,

    /// Local hour (0-23) the search window closes (exclusive)
    #[serde(default)]
    pub stop_hour: Option<u32>,

    /// Number of slots to select
    #[serde(default)]
    pub count: Option<u32>,

    /// Select the most expensive slots instead of the cheapest
    #[serde(default)]
    pub invert_selection: bool,

    /// Require the selected slots to form one unbroken block
    #[serde(default)]
    pub contiguous_mode: bool,

    /// Set-point emitted when outside the window, disabled, or without data
    #[serde(default = "default_force_value")]
    pub force_value: f64,

    /// Unit suffix used in human-readable price labels
    #[serde(default = "default_price_unit_label")]
    pub price_unit_label: String,

    /// IANA time zone used for hours, calendar days and labels
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

pub fn default_force_value() -> f64 {
    -600.0
}

pub fn default_price_unit_label() -> String {
    "öre".to_owned()
}

pub fn default_timezone() -> String {
    "Europe/Stockholm".to_owned()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_hour: None,
            stop_hour: None,
            count: None,
            invert_selection: false,
            contiguous_mode: false,
            force_value: default_force_value(),
            price_unit_label: default_price_unit_label(),
            timezone: default_timezone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"start_hour": 22}"#).unwrap();

        assert_eq!(config.start_hour, Some(22));
        assert_eq!(config.stop_hour, None);
        assert!(!config.invert_selection);
        assert!((config.force_value - -600.0).abs() < f64::EPSILON);
        assert_eq!(config.timezone, "Europe/Stockholm");
    }
}
