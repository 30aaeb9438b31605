//! Concurrent scoring of game files.
//!
//! Each file is parsed and scored on the blocking pool; a semaphore caps how
//! many run at once. A bad file is reported in its own slot and never stops
//! the rest of the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::excitement::{score_game, AlgorithmConfig};
use crate::models::{GameExcitement, GameRecord};

/// One output line: `{ id, excitement, breakdown, tier, method }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredGame {
    pub id: String,
    #[serde(flatten)]
    pub output: GameExcitement,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<ScoredGame>,
}

pub fn load_game(path: &Path) -> Result<GameRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid game JSON in {}", path.display()))
}

/// Score a parsed record. Records without an id take `fallback_id`.
pub fn score_record(
    record: &GameRecord,
    fallback_id: &str,
    config: &AlgorithmConfig,
) -> ScoredGame {
    let result = score_game(&record.samples, &record.context(), config);
    ScoredGame {
        id: record.id.clone().unwrap_or_else(|| fallback_id.to_string()),
        output: result.to_output(),
    }
}

pub fn score_file(path: &Path, config: &AlgorithmConfig) -> Result<ScoredGame> {
    let record = load_game(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(score_record(&record, &stem, config))
}

/// Score every file, at most `max_concurrency` at a time. Outcomes come back
/// in input order.
pub async fn score_files(
    paths: Vec<PathBuf>,
    config: Arc<AlgorithmConfig>,
    max_concurrency: usize,
) -> Vec<FileOutcome> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let total = paths.len();

    let futures: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let semaphore = Arc::clone(&semaphore);
            let config = Arc::clone(&config);
            async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        let task_path = path.clone();
                        tokio::task::spawn_blocking(move || score_file(&task_path, &config))
                            .await
                            .unwrap_or_else(|e| Err(anyhow!("scoring task failed: {}", e)))
                    }
                    Err(e) => Err(anyhow!("concurrency limiter closed: {}", e)),
                };
                if let Err(e) = &result {
                    warn!("Skipping {}: {:#}", path.display(), e);
                }
                FileOutcome { path, result }
            }
        })
        .collect();

    let outcomes = futures_util::future::join_all(futures).await;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        "Scored {}/{} game file(s) ({} failed)",
        total - failed,
        total,
        failed
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScoringMethod, Tier};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("game-excitement-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn thriller_json(id: Option<&str>) -> String {
        let mut probs: Vec<f64> = (0..199).map(|i| if i % 2 == 0 { 0.4 } else { 0.6 }).collect();
        probs.push(0.02);
        let samples: Vec<String> = probs
            .iter()
            .map(|p| format!("{{\"winProbability\": {}}}", p))
            .collect();
        let id = id.map(|i| format!("\"id\": \"{}\",", i)).unwrap_or_default();
        format!(
            "{{{} \"sport\": \"nfl\", \"homeScore\": 21, \"awayScore\": 24, \"samples\": [{}]}}",
            id,
            samples.join(",")
        )
    }

    #[tokio::test]
    async fn scores_files_and_isolates_failures() {
        let good = temp_file("batch-good.json", &thriller_json(Some("401")));
        let short = temp_file(
            "batch-short.json",
            r#"{"sport": "cfb", "homeScore": 31, "awayScore": 30, "overtime": true,
                "samples": [{"winProbability": 0.5}]}"#,
        );
        let broken = temp_file("batch-broken.json", "{ not json");
        let missing = std::env::temp_dir().join("game-excitement-does-not-exist.json");

        let paths = vec![good.clone(), broken.clone(), short.clone(), missing.clone()];
        let outcomes = score_files(paths.clone(), Arc::new(AlgorithmConfig::default()), 2).await;

        assert_eq!(outcomes.len(), 4);
        let order: Vec<&PathBuf> = outcomes.iter().map(|o| &o.path).collect();
        assert_eq!(order, paths.iter().collect::<Vec<_>>());

        let scored = outcomes[0].result.as_ref().unwrap();
        assert_eq!(scored.id, "401");
        assert_eq!(scored.output.tier, Tier::MustWatch);
        assert_eq!(scored.output.method, ScoringMethod::Model);

        assert!(outcomes[1].result.is_err());

        // No id in the file: the file stem stands in. Margin 1 + overtime → 9.0.
        let fallback = outcomes[2].result.as_ref().unwrap();
        assert_eq!(fallback.id, "batch-short");
        assert_eq!(fallback.output.method, ScoringMethod::Fallback);
        assert_eq!(fallback.output.excitement, 9.0);

        assert!(outcomes[3].result.is_err());
    }

    #[tokio::test]
    async fn single_permit_still_scores_everything() {
        let paths: Vec<PathBuf> = (0..5)
            .map(|i| temp_file(&format!("batch-serial-{}.json", i), &thriller_json(None)))
            .collect();
        let outcomes = score_files(paths, Arc::new(AlgorithmConfig::default()), 1).await;
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        assert_eq!(outcomes[3].result.as_ref().unwrap().id, "batch-serial-3");
    }

    #[test]
    fn output_line_shape() {
        let record: GameRecord = serde_json::from_str(&thriller_json(Some("g7"))).unwrap();
        let line = score_record(&record, "unused", &AlgorithmConfig::default());
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "g7");
        assert_eq!(json["tier"], "must-watch");
        assert_eq!(json["method"], "model");
        assert!(json["excitement"].is_number());
        assert!(json["breakdown"]["finish"].is_number());
    }
}
