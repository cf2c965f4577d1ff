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

mod cli;
mod config;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

use chargecheap_core::{
    ChargeCheapResult, Clock, Engine, EngineConfig, FixedClock, InputRecord, JsonFileStore,
    SystemClock,
};
use cli::{Cli, Commands, RunArgs, StateArgs};
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::ValidateConfig) {
        return validate_command(cli.config.as_deref());
    }

    let (config, source) = AppConfig::read(cli.config.as_deref())?;
    init_tracing(&config.system.log_level)?;
    source.log();
    config.validate()?;

    match cli.command {
        Commands::Run(args) => run_command(config, args),
        Commands::Reset(args) => reset_command(config, &args),
        Commands::ValidateConfig => Ok(()),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    // Respects RUST_LOG; stdout is reserved for the result JSON
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Setting default tracing subscriber failed")
}

fn state_path(config: &AppConfig, args: &StateArgs) -> PathBuf {
    args.state
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.system.state_path))
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read input from stdin")
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read input {source}"))
    }
}

fn parse_input(raw: &str) -> Result<InputRecord> {
    if raw.trim().is_empty() {
        debug!("Empty input, running on stored context only");
        return Ok(InputRecord::default());
    }

    serde_json::from_str(raw).context("Failed to parse input record")
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| {
            format!("Invalid --now '{raw}'\n\nExpected RFC 3339 (e.g., 2024-01-01T03:00:00Z)")
        })
}

fn run_command(config: AppConfig, args: RunArgs) -> Result<()> {
    let input = match parse_input(&read_input(&args.input)?) {
        Ok(input) => input,
        Err(e) => {
            // The host still gets a result object for a malformed record
            warn!("Rejected input record: {:#}", e);
            return print_result(&ChargeCheapResult::error(format!("{e:#}")));
        }
    };
    let path = state_path(&config, &args.state);
    let engine_config = EngineConfig::from(config);

    let result = match args.now.as_deref() {
        Some(raw) => {
            let clock = FixedClock(parse_now(raw)?);
            execute(Engine::with_clock(engine_config, clock)?, &path, &input)?
        }
        None => execute(Engine::with_clock(engine_config, SystemClock)?, &path, &input)?,
    };

    print_result(&result)
}

fn execute<C: Clock>(
    engine: Engine<C>,
    state_path: &Path,
    input: &InputRecord,
) -> Result<ChargeCheapResult> {
    let mut store = JsonFileStore::open(state_path)?;
    info!(
        "Running with context {} ({})",
        store.path().display(),
        engine.timezone().tz
    );
    Ok(engine.run(&mut store, input))
}

fn reset_command(config: AppConfig, args: &StateArgs) -> Result<()> {
    let path = state_path(&config, args);
    let engine = Engine::new(EngineConfig::from(config))?;
    let mut store = JsonFileStore::open(&path)?;

    let result = engine.reset(&mut store)?;
    print_result(&result)
}

fn print_result(result: &ChargeCheapResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

fn validate_command(explicit_path: Option<&Path>) -> Result<()> {
    let (config, _) = AppConfig::read(explicit_path)?;
    let result = config.validate_detailed();

    for error in &result.errors {
        println!("error   {error}");
    }
    for warning in &result.warnings {
        println!("warning {warning}");
    }

    if result.has_errors() {
        anyhow::bail!("Configuration has {} error(s)", result.errors.len());
    }
    println!("Configuration is valid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chargecheap_core::{JsonFileStore, SignalReason, StateStore, StoreKey};
    use tempfile::tempdir;

    #[test]
    fn test_parse_now() {
        let now = parse_now("2024-01-01T04:00:00+01:00").unwrap();
        assert_eq!(now.to_rfc3339(), "2024-01-01T03:00:00+00:00");
        assert!(parse_now("yesterday").is_err());
    }

    #[test]
    fn test_read_and_parse_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.json");
        assert!(read_input(path.to_str().unwrap()).is_err());

        std::fs::write(&path, r#"{"count": "4"}"#).unwrap();
        let input = parse_input(&read_input(path.to_str().unwrap()).unwrap()).unwrap();
        assert_eq!(input.count, Some(serde_json::json!("4")));

        assert_eq!(parse_input("  \n").unwrap(), InputRecord::default());
        assert!(parse_input("[1, 2").is_err());
    }

    #[test]
    fn test_loosely_typed_record_is_accepted() {
        let input = parse_input(
            r#"{"invert_selection": "true", "contiguous_mode": "off",
                "data": {"attributes": {"unit_of_measurement": 5, "raw_today": []}}}"#,
        )
        .unwrap();

        assert_eq!(input.invert_selection, Some(true));
        assert_eq!(input.contiguous_mode, Some(false));
        assert_eq!(input.price_attributes().unwrap().unit_of_measurement, None);
    }

    #[test]
    fn test_malformed_record_prints_error_result() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("input.json");
        std::fs::write(&input_path, "[1, 2").unwrap();

        let args = RunArgs {
            input: input_path.to_str().unwrap().to_owned(),
            state: StateArgs {
                state: Some(dir.path().join("state.json")),
            },
            now: None,
        };
        assert!(run_command(AppConfig::default(), args).is_ok());
        assert!(!dir.path().join("state.json").exists());
    }

    #[test]
    fn test_execute_persists_to_state_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut config = AppConfig::default();
        config.system.timezone = "UTC".to_owned();

        let input: InputRecord =
            serde_json::from_str(r#"{"start": 0, "stop": 0, "count": 1}"#).unwrap();
        let clock = FixedClock(parse_now("2024-01-01T12:00:00Z").unwrap());
        let engine = Engine::with_clock(EngineConfig::from(config), clock).unwrap();

        let result = execute(engine, &path, &input).unwrap();
        assert_eq!(result.signal_reason, SignalReason::WaitingForData);

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get(StoreKey::CountHour).unwrap().is_some());
    }

    #[test]
    fn test_state_path_override() {
        let config = AppConfig::default();
        let args = StateArgs {
            state: Some(PathBuf::from("/tmp/other.json")),
        };
        assert_eq!(state_path(&config, &args), PathBuf::from("/tmp/other.json"));

        let args = StateArgs { state: None };
        assert_eq!(
            state_path(&config, &args),
            PathBuf::from(chargecheap_core::DEFAULT_STATE_PATH)
        );
    }
}
