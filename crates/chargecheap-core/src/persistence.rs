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

//! File-backed context store.
//!
//! Keeps the whole context in one JSON document and writes it through on
//! every change.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::store::{StateStore, StoreKey};

/// Default path for the context file.
pub const DEFAULT_STATE_PATH: &str = "./data/chargecheap_state.json";

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    /// Path to the context file.
    state_path: PathBuf,
    values: BTreeMap<StoreKey, Value>,
}

impl JsonFileStore {
    /// Open the store at `state_path`.
    ///
    /// A missing file yields an empty store; the file is created on first write.
    pub fn open(state_path: impl Into<PathBuf>) -> Result<Self> {
        let state_path = state_path.into();

        if !state_path.exists() {
            info!(
                "Context file not found at {}, starting empty",
                state_path.display()
            );
            return Ok(Self {
                state_path,
                values: BTreeMap::new(),
            });
        }

        let contents = fs::read_to_string(&state_path)
            .with_context(|| format!("Failed to read context from {}", state_path.display()))?;

        let values: BTreeMap<StoreKey, Value> = if contents.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse context from {}", state_path.display())
            })?
        };

        debug!(
            "Loaded {} context keys from {}",
            values.len(),
            state_path.display()
        );

        Ok(Self { state_path, values })
    }

    /// Get the path being used for persistence.
    pub fn path(&self) -> &Path {
        &self.state_path
    }

    /// Write the current context to disk.
    ///
    /// Uses atomic write (temp file + rename).
    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.state_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let json =
            serde_json::to_string_pretty(&self.values).context("Failed to serialize context")?;

        let temp_path = self.state_path.with_extension("tmp");
        fs::write(&temp_path, &json)
            .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.state_path).with_context(|| {
            format!(
                "Failed to rename temp file to {}",
                self.state_path.display()
            )
        })?;

        debug!(
            "Saved {} context keys to {}",
            self.values.len(),
            self.state_path.display()
        );

        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: StoreKey) -> Result<Option<Value>> {
        Ok(self.values.get(&key).cloned())
    }

    fn set(&mut self, key: StoreKey, value: Value) -> Result<()> {
        self.values.insert(key, value);
        self.flush()
    }

    fn remove(&mut self, key: StoreKey) -> Result<()> {
        if self.values.remove(&key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StateStoreExt;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_open_nonexistent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.json");
        let store = JsonFileStore::open(&path).unwrap();

        assert!(store.get(StoreKey::TodayData).unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_set_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_typed(StoreKey::StartTime, &22u32).unwrap();
        store.set(StoreKey::Enabled, json!("on")).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_typed::<u32>(StoreKey::StartTime).unwrap(), Some(22));
        assert_eq!(reopened.get(StoreKey::Enabled).unwrap(), Some(json!("on")));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_typed(StoreKey::CountHour, &3u32).unwrap();
        store.set_typed(StoreKey::StopTime, &6u32).unwrap();
        store.remove(StoreKey::CountHour).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get(StoreKey::CountHour).unwrap().is_none());

        store.clear_all().unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get(StoreKey::StopTime).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(JsonFileStore::open(&path).is_err());
    }
}
