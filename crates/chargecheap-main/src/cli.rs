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

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "chargecheap")]
#[command(author, version, about = "Cheapest / most expensive spot price slot selection")]
#[command(
    long_about = "Selects the N cheapest (or most expensive) spot price slots inside a daily or\n\
    rolling window and prints the decision as JSON.\n\
    \nContext (day buffers, overrides, enable flag) is kept in a JSON state file between runs.\n\
    \nExamples:\n  \
    chargecheap run --input prices.json\n  \
    cat event.json | chargecheap run --input - --now 2024-01-01T03:00:00Z\n  \
    chargecheap reset\n  \
    chargecheap validate-config --config chargecheap.toml"
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON by extension)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process one input record and print the result
    Run(RunArgs),

    /// Clear the persisted context
    Reset(StateArgs),

    /// Check the configuration and print errors and warnings
    ValidateConfig,
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Input record as JSON, `-` for stdin
    #[arg(long, default_value = "-")]
    pub input: String,

    #[command(flatten)]
    pub state: StateArgs,

    /// Evaluate at this instant instead of the wall clock (RFC 3339)
    #[arg(long)]
    pub now: Option<String>,
}

#[derive(Debug, Parser)]
pub struct StateArgs {
    /// Context file, overrides `system.state_path`
    #[arg(long)]
    pub state: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "chargecheap",
            "run",
            "--input",
            "prices.json",
            "--now",
            "2024-01-01T03:00:00Z",
            "--config",
            "cc.toml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("cc.toml")));
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.input, "prices.json");
        assert_eq!(args.now.as_deref(), Some("2024-01-01T03:00:00Z"));
        assert_eq!(args.state.state, None);
    }

    #[test]
    fn test_parse_reset_and_validate() {
        let cli = Cli::parse_from(["chargecheap", "reset", "--state", "/tmp/s.json"]);
        assert!(matches!(cli.command, Commands::Reset(StateArgs { state: Some(_) })));

        let cli = Cli::parse_from(["chargecheap", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig));
    }
}
