use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::excitement::{AlgorithmConfig, AlgorithmVersion};

/// Score completed games for watchability from their win-probability feed
#[derive(Parser, Debug, Clone)]
#[command(name = "game-excitement", version, about)]
pub struct Config {
    /// Algorithm variant (ignored when --config-file names its own version)
    #[arg(long, env = "EXCITEMENT_ALGORITHM", value_enum, default_value_t = AlgorithmVersion::V2)]
    pub algorithm: AlgorithmVersion,

    /// JSON algorithm configuration: {"version": "v2", "params": {...}}
    #[arg(long, env = "EXCITEMENT_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Maximum number of games scored at once
    #[arg(long, env = "EXCITEMENT_MAX_CONCURRENCY", default_value = "8")]
    pub max_concurrency: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Score game files and print one JSON line per game
    Score {
        /// Game JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Evaluate a labeled game set and print the report as JSON
    Benchmark {
        /// JSON array of games carrying `expectedTier` (and optionally `expectedScore`)
        labeled: PathBuf,

        /// Evaluate every built-in variant instead of only the configured one
        #[arg(long)]
        all_versions: bool,
    },
    /// Print the resolved algorithm configuration
    ShowConfig,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_concurrency == 0 {
            anyhow::bail!("max_concurrency must be at least 1");
        }
        if let Some(path) = &self.config_file {
            if !path.is_file() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
        }
        Ok(())
    }

    /// Resolve the immutable algorithm configuration for this run.
    pub fn algorithm_config(&self) -> anyhow::Result<AlgorithmConfig> {
        match &self.config_file {
            Some(path) => AlgorithmConfig::from_json_file(path)
                .with_context(|| format!("failed to load algorithm config {}", path.display())),
            None => Ok(AlgorithmConfig::for_version(self.algorithm)),
        }
    }
}
