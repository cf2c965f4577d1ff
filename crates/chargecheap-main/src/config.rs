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

mod validation;

pub use validation::ValidationResult;

use anyhow::{Context, Result};
use chargecheap_core::policy::{MAX_COUNT, MAX_HOUR};
use chargecheap_core::{DEFAULT_STATE_PATH, EngineConfig, TimezoneConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub system: SystemConfig,
}

/// Window and slot selection
///
/// Start/stop/count may be omitted when they are always supplied with the
/// input records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Local hour the window opens (0-23)
    #[serde(default)]
    pub start_hour: Option<u32>,

    /// Local hour the window closes (0-23); equal to start for a rolling 24h window
    #[serde(default)]
    pub stop_hour: Option<u32>,

    /// Number of slots to select (0-95)
    #[serde(default)]
    pub count: Option<u32>,

    #[serde(default)]
    pub invert_selection: bool,

    #[serde(default)]
    pub contiguous_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Set-point when outside the window, disabled, or waiting for data
    #[serde(default = "default_force_value")]
    pub force_value: f64,

    #[serde(default = "default_price_unit_label")]
    pub price_unit_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// IANA time zone for hours and labels
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Context file
    #[serde(default = "default_state_path")]
    pub state_path: String,

    /// Log level (trace, debug, info, warn, error), `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_force_value() -> f64 {
    chargecheap_core::config::default_force_value()
}

fn default_price_unit_label() -> String {
    chargecheap_core::config::default_price_unit_label()
}

fn default_timezone() -> String {
    chargecheap_core::config::default_timezone()
}

fn default_state_path() -> String {
    DEFAULT_STATE_PATH.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            force_value: default_force_value(),
            price_unit_label: default_price_unit_label(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            state_path: default_state_path(),
            log_level: default_log_level(),
        }
    }
}

/// Where the configuration was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl ConfigSource {
    /// Report the source once logging is up
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Defaults => {
                warn!("No configuration file found, using defaults with environment overrides");
            }
        }
    }
}

impl AppConfig {
    /// Load without validating
    ///
    /// Order: explicit path, `config.toml`, `config.json`, then defaults with
    /// environment overrides. Nothing is logged here, the subscriber depends
    /// on the loaded `log_level`.
    pub fn read(explicit_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit_path {
            let config = Self::from_file(path)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        // Try config.toml for development
        if let Ok(config_str) = std::fs::read_to_string("config.toml") {
            let config: AppConfig =
                toml::from_str(&config_str).context("Failed to parse config.toml")?;
            return Ok((config, ConfigSource::File(PathBuf::from("config.toml"))));
        }

        if let Ok(config_str) = std::fs::read_to_string("config.json") {
            let config: AppConfig =
                serde_json::from_str(&config_str).context("Failed to parse config.json")?;
            return Ok((config, ConfigSource::File(PathBuf::from("config.json"))));
        }

        Ok((Self::from_env(), ConfigSource::Defaults))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
        }
    }

    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `CHARGECHEAP_*` variables
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u32>().ok());

        if let Some(hour) = number("CHARGECHEAP_START_HOUR") {
            config.selection.start_hour = Some(hour);
        }
        if let Some(hour) = number("CHARGECHEAP_STOP_HOUR") {
            config.selection.stop_hour = Some(hour);
        }
        if let Some(count) = number("CHARGECHEAP_COUNT") {
            config.selection.count = Some(count);
        }
        if let Some(timezone) = lookup("CHARGECHEAP_TIMEZONE") {
            config.system.timezone = timezone;
        }
        if let Some(path) = lookup("CHARGECHEAP_STATE_PATH") {
            config.system.state_path = path;
        }

        config
    }

    /// Validate configuration with detailed error reporting
    pub fn validate_detailed(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        let selection = &self.selection;

        for (field, value) in [
            ("selection.start_hour", selection.start_hour),
            ("selection.stop_hour", selection.stop_hour),
        ] {
            if let Some(hour) = value
                && hour > MAX_HOUR
            {
                result.add_error(field, format!("Hour {hour} is out of range (0-{MAX_HOUR})"));
            }
        }

        match selection.count {
            Some(count) if count > MAX_COUNT => {
                result.add_error(
                    "selection.count",
                    format!("Count {count} is out of range (0-{MAX_COUNT})"),
                );
            }
            Some(0) => {
                result.add_warning("selection.count", "Count 0 never selects any slot");
            }
            Some(_) => {}
            None => {
                result.add_warning(
                    "selection.count",
                    "Not set; every input record must then carry a count",
                );
            }
        }

        if selection.start_hour.is_none() || selection.stop_hour.is_none() {
            result.add_warning(
                "selection",
                "start_hour/stop_hour not set; input records must carry start/stop",
            );
        }

        if let Err(e) = TimezoneConfig::parse(&self.system.timezone) {
            result.add_error("system.timezone", e.to_string());
        }

        if self.system.state_path.trim().is_empty() {
            result.add_error("system.state_path", "State path cannot be empty");
        }

        if !LOG_LEVELS.contains(&self.system.log_level.to_lowercase().as_str()) {
            result.add_warning(
                "system.log_level",
                format!(
                    "Unknown log level '{}' (expected one of: {})",
                    self.system.log_level,
                    LOG_LEVELS.join(", ")
                ),
            );
        }

        if self.output.price_unit_label.trim().is_empty() {
            result.add_warning(
                "output.price_unit_label",
                "Empty unit label; prices will be shown without a unit",
            );
        }

        if !self.output.force_value.is_finite() {
            result.add_error("output.force_value", "Must be a finite number");
        }

        result
    }

    /// Validate configuration, failing on the first error
    pub fn validate(&self) -> Result<()> {
        let result = self.validate_detailed();
        for warning in &result.warnings {
            warn!("Config warning: {}", warning);
        }
        if let Some(error) = result.errors.first() {
            anyhow::bail!("Invalid configuration: {}", error);
        }
        Ok(())
    }
}

impl From<AppConfig> for EngineConfig {
    fn from(app_config: AppConfig) -> Self {
        EngineConfig {
            start_hour: app_config.selection.start_hour,
            stop_hour: app_config.selection.stop_hour,
            count: app_config.selection.count,
            invert_selection: app_config.selection.invert_selection,
            contiguous_mode: app_config.selection.contiguous_mode,
            force_value: app_config.output.force_value,
            price_unit_label: app_config.output.price_unit_label,
            timezone: app_config.system.timezone,
        }
    }
}
