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

//! Key-value context store
//!
//! The engine keeps day buffers and user overrides between invocations in a
//! small keyed store. Values are JSON so any backend can hold them.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys persisted between invocations
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StoreKey {
    TodayData,
    YesterdayData,
    TomorrowData,
    StartTime,
    StopTime,
    CountHour,
    Enabled,
}

impl StoreKey {
    pub const ALL: [Self; 7] = [
        Self::TodayData,
        Self::YesterdayData,
        Self::TomorrowData,
        Self::StartTime,
        Self::StopTime,
        Self::CountHour,
        Self::Enabled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TodayData => "today_data",
            Self::YesterdayData => "yesterday_data",
            Self::TomorrowData => "tomorrow_data",
            Self::StartTime => "start_time",
            Self::StopTime => "stop_time",
            Self::CountHour => "count_hour",
            Self::Enabled => "enabled",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============= Store Trait =============

/// Backend for the persisted context
pub trait StateStore {
    fn get(&self, key: StoreKey) -> Result<Option<Value>>;

    fn set(&mut self, key: StoreKey, value: Value) -> Result<()>;

    fn remove(&mut self, key: StoreKey) -> Result<()>;
}

/// Typed helpers on top of any [`StateStore`]
pub trait StateStoreExt: StateStore {
    /// Read and deserialize a value, `None` when absent or null
    fn get_typed<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>> {
        match self.get(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .with_context(|| format!("Failed to decode stored value for '{key}'")),
        }
    }

    fn set_typed<T: Serialize + ?Sized>(&mut self, key: StoreKey, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to encode value for '{key}'"))?;
        self.set(key, value)
    }

    /// Remove every known key
    fn clear_all(&mut self) -> Result<()> {
        for key in StoreKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}

impl<S: StateStore + ?Sized> StateStoreExt for S {}

// ============= In-memory Store =============

/// Non-persistent store, used by tests and one-shot runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<StoreKey, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<Value>> {
        Ok(self.values.get(&key).cloned())
    }

    fn set(&mut self, key: StoreKey, value: Value) -> Result<()> {
        self.values.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: StoreKey) -> Result<()> {
        self.values.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_names_match_serde() {
        for key in StoreKey::ALL {
            assert_eq!(serde_json::to_value(key).unwrap(), json!(key.as_str()));
        }
    }

    #[test]
    fn test_typed_access() {
        let mut store = MemoryStore::new();
        store.set_typed(StoreKey::CountHour, &4u32).unwrap();

        let count: Option<u32> = store.get_typed(StoreKey::CountHour).unwrap();
        assert_eq!(count, Some(4));

        let missing: Option<u32> = store.get_typed(StoreKey::StartTime).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_null_reads_as_absent() {
        let mut store = MemoryStore::new();
        store.set(StoreKey::StopTime, Value::Null).unwrap();

        let stop: Option<u32> = store.get_typed(StoreKey::StopTime).unwrap();
        assert_eq!(stop, None);
    }

    #[test]
    fn test_decode_error_is_reported() {
        let mut store = MemoryStore::new();
        store.set(StoreKey::CountHour, json!("many")).unwrap();

        let err = store.get_typed::<u32>(StoreKey::CountHour).unwrap_err();
        assert!(err.to_string().contains("count_hour"));
    }

    #[test]
    fn test_clear_all() {
        let mut store = MemoryStore::new();
        store.set(StoreKey::Enabled, json!("on")).unwrap();
        store.set(StoreKey::TodayData, json!({})).unwrap();
        assert_eq!(store.len(), 2);

        store.clear_all().unwrap();
        assert!(store.is_empty());
    }
}
