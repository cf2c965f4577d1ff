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

//! Error types for the selection engine

use thiserror::Error;

/// Failures that abort a single invocation
///
/// Missing data and partial data are not errors; they are reported through
/// the result object instead.
#[derive(Debug, Error)]
pub enum ChargeCheapError {
    /// start/stop/count could not be resolved from input, store or config
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown time zone: '{0}'")]
    Timezone(String),

    /// Unexpected failure while computing the window or selection
    #[error("computation failed: {0}")]
    Computation(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ChargeCheapError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ChargeCheapError>;
