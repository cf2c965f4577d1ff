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

//! # ChargeCheap Core
//!
//! Selects the cheapest (or most expensive) spot price slots inside a daily or
//! rolling window and derives a reference price from the selection.
//!
//! The engine is synchronous and host-agnostic: persisted context goes
//! through a [`StateStore`], the current instant through a [`Clock`].

pub mod activity;
pub mod attributes;
pub mod engine;
pub mod error;
pub mod input;
pub mod interval;
pub mod merger;
pub mod normalizer;
pub mod persistence;
pub mod policy;
pub mod selector;
pub mod store;
pub mod timezone;
pub mod traits;
pub mod window;

pub use engine::{Engine, ResolvedSettings};
pub use error::{ChargeCheapError, Result};
pub use input::{InputData, InputRecord, PriceAttributes};
pub use merger::DayBuffers;
pub use persistence::{DEFAULT_STATE_PATH, JsonFileStore};
pub use store::{MemoryStore, StateStore, StateStoreExt, StoreKey};
pub use timezone::TimezoneConfig;
pub use traits::{Clock, FixedClock, SystemClock};

pub use chargecheap_types::config;
pub use chargecheap_types::{
    BlockAttributes, BlockMeta, ChargeCheapResult, DataSource, DayBuffer, EngineConfig,
    PricePoint, ReferencePriceMode, ResultAttributes, Selection, SelectionMode, SignalReason,
    Window, WindowMode,
};
