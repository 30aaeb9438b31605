//! Labeled benchmark evaluation for offline tuning.
//!
//! Runs a labeled game set through the same scoring path production uses and
//! reports how well the configured variant agrees with the human labels.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::excitement::{score_game, AlgorithmConfig, AlgorithmVersion};
use crate::models::{round_to, GameRecord, ScoringMethod, Tier};

/// A game plus the tier (and optionally the score) a reviewer assigned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledGame {
    #[serde(flatten)]
    pub game: GameRecord,
    pub expected_tier: Tier,
    #[serde(default)]
    pub expected_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRow {
    pub id: String,
    pub expected: Tier,
    pub actual: Tier,
    pub score: f64,
    pub expected_score: Option<f64>,
    /// `score - expected_score`, when a score label exists
    pub diff: Option<f64>,
    pub method: ScoringMethod,
}

/// `confusion[expected][actual]` counts.
pub type ConfusionMatrix = BTreeMap<Tier, BTreeMap<Tier, usize>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    pub version: AlgorithmVersion,
    pub games: usize,
    pub tier_accuracy: f64,
    pub mean_absolute_error: Option<f64>,
    pub rmse: Option<f64>,
    pub fallback_count: usize,
    pub confusion: ConfusionMatrix,
    pub rows: Vec<BenchmarkRow>,
    pub generated_at: DateTime<Utc>,
}

fn game_id(game: &GameRecord, position: usize) -> String {
    game.id.clone().unwrap_or_else(|| format!("game-{}", position))
}

pub fn evaluate(labeled: &[LabeledGame], config: &AlgorithmConfig) -> BenchmarkReport {
    let rows: Vec<BenchmarkRow> = labeled
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let result = score_game(&item.game.samples, &item.game.context(), config);
            let score = result.to_output().excitement;
            BenchmarkRow {
                id: game_id(&item.game, i),
                expected: item.expected_tier,
                actual: result.tier,
                score,
                expected_score: item.expected_score,
                diff: item.expected_score.map(|e| round_to(score - e, 2)),
                method: result.method,
            }
        })
        .collect();

    let games = rows.len();
    let correct = rows.iter().filter(|r| r.expected == r.actual).count();
    let tier_accuracy = if games == 0 {
        0.0
    } else {
        correct as f64 / games as f64
    };

    let errors: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.expected_score.map(|e| r.score - e))
        .collect();
    let (mean_absolute_error, rmse) = if errors.is_empty() {
        (None, None)
    } else {
        let n = errors.len() as f64;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        (Some(mae), Some(mse.sqrt()))
    };

    let mut confusion = ConfusionMatrix::new();
    for row in &rows {
        *confusion
            .entry(row.expected)
            .or_default()
            .entry(row.actual)
            .or_default() += 1;
    }

    let fallback_count = rows
        .iter()
        .filter(|r| r.method == ScoringMethod::Fallback)
        .count();

    info!(
        "Benchmark {}: {} games, tier accuracy {:.1}%, MAE {}, {} fallback",
        config.version(),
        games,
        tier_accuracy * 100.0,
        mean_absolute_error.map_or_else(|| "n/a".to_string(), |m| format!("{:.2}", m)),
        fallback_count
    );

    BenchmarkReport {
        version: config.version(),
        games,
        tier_accuracy,
        mean_absolute_error,
        rmse,
        fallback_count,
        confusion,
        rows,
        generated_at: Utc::now(),
    }
}

/// Evaluate several variants over the same labeled set.
pub fn compare(labeled: &[LabeledGame], configs: &[AlgorithmConfig]) -> Vec<BenchmarkReport> {
    configs.iter().map(|c| evaluate(labeled, c)).collect()
}
