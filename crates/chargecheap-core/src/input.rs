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

//! Input record received on each trigger
//!
//! Shapes are deliberately loose: price integrations deliver either a state
//! object with `attributes` or a state-change event with
//! `new_state.attributes`, and overrides arrive as numbers or strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One trigger of the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    #[serde(default)]
    pub data: Option<InputData>,

    /// Start hour override
    #[serde(default)]
    pub start: Option<Value>,

    /// Stop hour override
    #[serde(default)]
    pub stop: Option<Value>,

    /// Slot count override
    #[serde(default)]
    pub count: Option<Value>,

    /// `true`, `"true"` or `"on"` select the most expensive slots
    #[serde(default, deserialize_with = "loose_flag")]
    pub invert_selection: Option<bool>,

    #[serde(default, deserialize_with = "loose_flag")]
    pub contiguous_mode: Option<bool>,

    /// "on" enables the set-point output, anything else disables it
    #[serde(default, alias = "ha_enable")]
    pub enable: Option<Value>,

    /// Any non-null value clears the persisted context
    #[serde(default)]
    pub reset: Option<Value>,
}

impl InputRecord {
    /// Price attributes, preferring `data.attributes` over `data.new_state.attributes`
    pub fn price_attributes(&self) -> Option<&PriceAttributes> {
        let data = self.data.as_ref()?;
        data.attributes
            .as_ref()
            .or_else(|| data.new_state.as_ref()?.attributes.as_ref())
    }

    pub fn is_reset(&self) -> bool {
        self.reset.as_ref().is_some_and(|v| !v.is_null())
    }

    /// Enable flag carried by this record, `None` when absent
    pub fn enable_flag(&self) -> Option<bool> {
        match self.enable.as_ref()? {
            Value::Null => None,
            Value::Bool(enabled) => Some(*enabled),
            Value::String(s) => Some(s.trim().eq_ignore_ascii_case("on")),
            Value::Number(_) | Value::Array(_) | Value::Object(_) => Some(false),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputData {
    #[serde(default)]
    pub attributes: Option<PriceAttributes>,

    #[serde(default)]
    pub new_state: Option<NewState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewState {
    #[serde(default)]
    pub attributes: Option<PriceAttributes>,
}

/// Price payload of an upstream integration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceAttributes {
    #[serde(default, deserialize_with = "records_or_empty")]
    pub raw_today: Vec<Value>,

    #[serde(default, deserialize_with = "records_or_empty")]
    pub raw_tomorrow: Vec<Value>,

    #[serde(default, deserialize_with = "text_or_none")]
    pub unit_of_measurement: Option<String>,

    #[serde(default, deserialize_with = "flag_or_false")]
    pub price_in_cents: bool,
}

/// `null` or any non-array counts as no records
fn records_or_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    if let Value::Array(records) = Value::deserialize(deserializer)? {
        Ok(records)
    } else {
        Ok(Vec::new())
    }
}

/// Booleans, numbers and the usual on/off words; anything else is absent
fn loose_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        Value::Number(n) => Some(n.as_f64().is_some_and(|v| v.abs() > 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Some(true),
            "false" | "off" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

fn text_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    if let Value::String(text) = Value::deserialize(deserializer)? {
        Ok(Some(text))
    } else {
        Ok(None)
    }
}

fn flag_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}
