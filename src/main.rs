use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use game_excitement::batch::score_files;
use game_excitement::benchmark::{compare, evaluate, LabeledGame};
use game_excitement::config::{Command, Config};
use game_excitement::excitement::{AlgorithmConfig, AlgorithmVersion};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let algorithm = config.algorithm_config()?;
    info!(
        "Algorithm {} loaded{}",
        algorithm.version(),
        config
            .config_file
            .as_ref()
            .map(|p| format!(" from {}", p.display()))
            .unwrap_or_default()
    );

    match &config.command {
        Command::Score { files } => {
            let outcomes =
                score_files(files.clone(), Arc::new(algorithm), config.max_concurrency).await;
            let mut failed = 0usize;
            for outcome in outcomes {
                match outcome.result {
                    Ok(scored) => println!("{}", serde_json::to_string(&scored)?),
                    Err(_) => failed += 1,
                }
            }
            if failed > 0 {
                error!("{} game file(s) could not be scored", failed);
            }
        }
        Command::Benchmark {
            labeled,
            all_versions,
        } => {
            let raw = std::fs::read_to_string(labeled)
                .with_context(|| format!("failed to read labeled set {}", labeled.display()))?;
            let games: Vec<LabeledGame> = serde_json::from_str(&raw)
                .with_context(|| format!("invalid labeled set {}", labeled.display()))?;
            info!("Loaded {} labeled game(s)", games.len());

            if *all_versions {
                let configs: Vec<AlgorithmConfig> = AlgorithmVersion::ALL
                    .iter()
                    .map(|v| AlgorithmConfig::for_version(*v))
                    .collect();
                let reports = compare(&games, &configs);
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                let report = evaluate(&games, &algorithm);
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&algorithm)?);
        }
    }

    Ok(())
}
