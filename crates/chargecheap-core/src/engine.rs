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

//! Invocation pipeline
//!
//! One call to [`Engine::run`] handles one trigger:
//! 1. Apply enable/reset/override inputs to the store
//! 2. Normalize incoming day data and rotate the persisted day buffers
//! 3. Build the window and merge the day buffers it needs
//! 4. Detect the interval, select slots, describe the selection
//! 5. Decide the output signal and set-point
//!
//! Every failure is turned into an error result; nothing is propagated to
//! the host. Store writes made before a failure are kept.

use chargecheap_types::{
    ChargeCheapResult, EngineConfig, PricePoint, SelectionMode, SignalReason, WindowMode,
};
use tracing::{debug, info, warn};

use crate::activity::evaluate;
use crate::attributes::{AttributeContext, build_attributes};
use crate::error::{ChargeCheapError, Result};
use crate::input::InputRecord;
use crate::interval::detect_interval_minutes;
use crate::merger::{DayBuffers, plan_source};
use crate::normalizer::{UnitConversion, normalize_day};
use crate::policy::{
    MAX_COUNT, MAX_HOUR, clamp_count_for_interval, clamp_to_range, normalize_override,
};
use crate::selector::{SelectionRequest, select};
use crate::store::{StateStore, StateStoreExt, StoreKey};
use crate::timezone::TimezoneConfig;
use crate::traits::{Clock, SystemClock};
use crate::window::build_window;

/// Start/stop/count after overrides and static configuration are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub start_hour: u32,
    pub stop_hour: u32,
    pub count: u32,
    pub invert_selection: bool,
    pub contiguous_mode: bool,
}

/// Slot selection engine
#[derive(Debug, Clone)]
pub struct Engine<C: Clock = SystemClock> {
    config: EngineConfig,
    timezone: TimezoneConfig,
    clock: C,
}

impl Engine<SystemClock> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Engine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Result<Self> {
        let timezone = TimezoneConfig::parse(&config.timezone)?;
        Ok(Self {
            config,
            timezone,
            clock,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timezone(&self) -> &TimezoneConfig {
        &self.timezone
    }

    /// Handle one trigger
    pub fn run<S: StateStore + ?Sized>(
        &self,
        store: &mut S,
        input: &InputRecord,
    ) -> ChargeCheapResult {
        match self.try_run(store, input) {
            Ok(result) => result,
            Err(e) => {
                warn!("ChargeCheap invocation failed: {}", e);
                let reason = match &e {
                    ChargeCheapError::Configuration(msg) => msg.clone(),
                    ChargeCheapError::Timezone(_)
                    | ChargeCheapError::Computation(_)
                    | ChargeCheapError::Store(_) => e.to_string(),
                };
                ChargeCheapResult::error(reason)
            }
        }
    }

    /// Clear every persisted key
    pub fn reset<S: StateStore + ?Sized>(&self, store: &mut S) -> Result<ChargeCheapResult> {
        store.clear_all()?;
        info!("ChargeCheap context fully reset");
        Ok(ChargeCheapResult::reset())
    }

    fn try_run<S: StateStore + ?Sized>(
        &self,
        store: &mut S,
        input: &InputRecord,
    ) -> Result<ChargeCheapResult> {
        if let Some(enabled) = input.enable_flag() {
            debug!("Enable flag set to {}", enabled);
            store.set_typed(StoreKey::Enabled, &enabled)?;
        }
        let enabled = store.get_typed::<bool>(StoreKey::Enabled)?.unwrap_or(true);

        if input.is_reset() {
            return self.reset(store);
        }

        self.persist_overrides(store, input)?;
        let settings = self.resolve_settings(&*store, input)?;
        let now = self.clock.now();
        let mode = WindowMode::from_hours(settings.start_hour, settings.stop_hour);

        // Day data
        let (incoming_today, incoming_tomorrow) = match input.price_attributes() {
            Some(attrs) => {
                let conversion = UnitConversion::detect(
                    attrs.unit_of_measurement.as_deref(),
                    attrs.price_in_cents,
                );
                debug!("Unit conversion: {:?}", conversion);
                (
                    normalize_day(&attrs.raw_today, conversion, &self.timezone),
                    normalize_day(&attrs.raw_tomorrow, conversion, &self.timezone),
                )
            }
            None => (None, None),
        };

        let buffers =
            DayBuffers::load(&*store)?.apply_incoming(incoming_today, incoming_tomorrow);
        buffers.save(store)?;

        // Window and series
        let window = build_window(
            mode,
            settings.start_hour,
            settings.stop_hour,
            now,
            &self.timezone,
        )?;
        let data_source = plan_source(
            mode,
            settings.stop_hour,
            self.timezone.local_hour(now),
            buffers.has_tomorrow(),
        );
        let in_window: Vec<PricePoint> = buffers
            .merged(data_source)
            .into_iter()
            .filter(|p| window.contains(p.timestamp))
            .collect();

        if in_window.is_empty() {
            info!(
                "No prices inside {} → {} ({}), waiting for data",
                self.timezone.label(window.start),
                self.timezone.label(window.end),
                data_source
            );
            return Ok(ChargeCheapResult::waiting_for_data(
                window,
                self.config.force_value,
            ));
        }

        // Selection
        let interval_minutes = detect_interval_minutes(&in_window);
        let count = clamp_count_for_interval(settings.count, interval_minutes);
        if count != settings.count {
            debug!(
                "Count {} clamped to {} for {}-minute data",
                settings.count, count, interval_minutes
            );
        }

        let selection_mode = SelectionMode::from_invert(settings.invert_selection);
        let selection = select(
            &in_window,
            SelectionRequest {
                count: usize::try_from(count).unwrap_or(usize::MAX),
                invert: settings.invert_selection,
                contiguous: settings.contiguous_mode,
            },
            interval_minutes,
        );

        let (attributes, reference_price) = build_attributes(
            &selection,
            &AttributeContext {
                window: &window,
                data_source,
                selection_mode,
                interval_minutes,
                contiguous_mode: settings.contiguous_mode,
                actual_points: in_window.len(),
                timezone: &self.timezone,
                unit_label: &self.config.price_unit_label,
            },
        );

        // Output
        let activity = evaluate(&selection, &window, interval_minutes, now);
        let (active_signal, signal_reason) = if activity.outside_window {
            (false, SignalReason::OutsideWindow)
        } else if reference_price.is_none() {
            (false, SignalReason::NoReference)
        } else if activity.active {
            (true, SignalReason::Active)
        } else {
            (false, SignalReason::NotSelected)
        };

        let setpoint = match reference_price {
            Some(reference) if enabled && !activity.outside_window => reference,
            _ => self.config.force_value,
        };

        info!(
            "{:02}→{:02} ({}x {}{}): {} of {} slots, reference {:?}, signal {:?}",
            settings.start_hour,
            settings.stop_hour,
            count,
            selection_mode,
            if mode.is_rolling_24h() { " 24h" } else { "" },
            selection.len(),
            in_window.len(),
            reference_price,
            signal_reason
        );

        Ok(ChargeCheapResult {
            reference_price,
            attributes: Some(attributes),
            active_signal: Some(active_signal),
            signal_reason,
            setpoint: Some(setpoint),
            window: Some(window),
            info: (!enabled).then(|| "set-point disabled (manual override)".to_owned()),
            error_reason: None,
        })
    }

    /// Persist start/stop/count carried by the input record
    fn persist_overrides<S: StateStore + ?Sized>(
        &self,
        store: &mut S,
        input: &InputRecord,
    ) -> Result<()> {
        for (key, raw, max) in [
            (StoreKey::StartTime, &input.start, MAX_HOUR),
            (StoreKey::StopTime, &input.stop, MAX_HOUR),
            (StoreKey::CountHour, &input.count, MAX_COUNT),
        ] {
            if let Some(value) = raw.as_ref().and_then(|v| normalize_override(v, max)) {
                debug!("Override {} = {}", key, value);
                store.set_typed(key, &value)?;
            }
        }
        Ok(())
    }

    /// Stored overrides win over static configuration
    pub fn resolve_settings<S: StateStore + ?Sized>(
        &self,
        store: &S,
        input: &InputRecord,
    ) -> Result<ResolvedSettings> {
        let configured = |value: Option<u32>, max: u32| {
            value.map(|v| clamp_to_range(i64::from(v), 0, max))
        };

        let start = store
            .get_typed::<u32>(StoreKey::StartTime)?
            .or_else(|| configured(self.config.start_hour, MAX_HOUR));
        let stop = store
            .get_typed::<u32>(StoreKey::StopTime)?
            .or_else(|| configured(self.config.stop_hour, MAX_HOUR));
        let count = store
            .get_typed::<u32>(StoreKey::CountHour)?
            .or_else(|| configured(self.config.count, MAX_COUNT));

        let (Some(start_hour), Some(stop_hour), Some(count)) = (start, stop, count) else {
            return Err(ChargeCheapError::configuration("start/stop/count missing"));
        };

        Ok(ResolvedSettings {
            start_hour,
            stop_hour,
            count,
            invert_selection: input
                .invert_selection
                .unwrap_or(self.config.invert_selection),
            contiguous_mode: input
                .contiguous_mode
                .unwrap_or(self.config.contiguous_mode),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::traits::FixedClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn engine() -> Engine<FixedClock> {
        let config = EngineConfig {
            start_hour: Some(0),
            stop_hour: Some(0),
            count: Some(3),
            timezone: "UTC".to_owned(),
            ..EngineConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Engine::with_clock(config, FixedClock(now)).unwrap()
    }

    fn input(value: serde_json::Value) -> InputRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let config = EngineConfig {
            timezone: "Nowhere/City".to_owned(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(ChargeCheapError::Timezone(_))
        ));
    }

    #[test]
    fn test_overrides_win_over_config() {
        let engine = engine();
        let mut store = MemoryStore::new();

        let overrides = input(json!({"start": "22", "stop": 6.7, "count": 200}));
        engine.persist_overrides(&mut store, &overrides).unwrap();
        let settings = engine.resolve_settings(&store, &InputRecord::default()).unwrap();

        assert_eq!(settings.start_hour, 22);
        assert_eq!(settings.stop_hour, 6);
        assert_eq!(settings.count, MAX_COUNT);
    }

    #[test]
    fn test_invalid_override_keeps_previous_value() {
        let engine = engine();
        let mut store = MemoryStore::new();

        engine
            .persist_overrides(&mut store, &input(json!({"count": 5})))
            .unwrap();
        engine
            .persist_overrides(&mut store, &input(json!({"count": "lots"})))
            .unwrap();

        let settings = engine.resolve_settings(&store, &InputRecord::default()).unwrap();
        assert_eq!(settings.count, 5);
    }

    #[test]
    fn test_per_invocation_flags() {
        let engine = engine();
        let store = MemoryStore::new();

        let flags = input(json!({"invert_selection": true, "contiguous_mode": "on"}));
        let settings = engine.resolve_settings(&store, &flags).unwrap();
        assert!(settings.invert_selection);
        assert!(settings.contiguous_mode);

        let settings = engine.resolve_settings(&store, &InputRecord::default()).unwrap();
        assert!(!settings.invert_selection);
        assert!(!settings.contiguous_mode);
    }

    #[test]
    fn test_missing_settings_is_error_result() {
        let config = EngineConfig {
            timezone: "UTC".to_owned(),
            ..EngineConfig::default()
        };
        let engine = Engine::with_clock(config, FixedClock(Utc::now())).unwrap();
        let mut store = MemoryStore::new();

        let result = engine.run(&mut store, &InputRecord::default());
        assert!(result.is_error());
        assert_eq!(result.error_reason.as_deref(), Some("start/stop/count missing"));
        assert_eq!(result.signal_reason, SignalReason::Error);
    }
}
