//! Excitement scoring pipeline.
//!
//! ```text
//! samples ─► normalizer ─► tension ┐
//!                       ├► drama   ├► weighted sum + bonuses ─► decision-point
//!                       └► finish  ┘     adjustment ─► 1–10 curve ─► tier
//! ```
//!
//! Every stage is a pure function of the retained samples, the game context
//! and an immutable [`AlgorithmConfig`], so scoring is deterministic and safe
//! to run from many threads at once.

pub mod algorithm;
pub mod bonuses;
pub mod combiner;
pub mod decision_point;
pub mod drama;
pub mod error;
pub mod finish;
pub mod normalizer;
pub mod tension;

pub use algorithm::{AlgorithmConfig, AlgorithmParams, AlgorithmVersion};
pub use error::{ConfigError, ScoreError};

use tracing::debug;

use crate::models::{
    BonusBreakdown, ComponentScore, ExcitementResult, GameContext, ProbabilitySample,
    ScoringMethod,
};

/// Run the full model. Fails only when the sequence is empty or too short
/// after trailing-noise filtering.
pub fn try_score_game(
    samples: &[ProbabilitySample],
    ctx: &GameContext,
    config: &AlgorithmConfig,
) -> Result<ExcitementResult, ScoreError> {
    let params = config.params();
    let probs = normalizer::normalize(samples, &params.thresholds, ctx.home_won)?;

    let breakdown = ComponentScore {
        tension: tension::tension_score(&probs, ctx.home_won, &params.tension),
        drama: drama::drama_score(&probs, &params.drama),
        finish: finish::finish_score(&probs, &params.finish, &params.drama),
    };
    let bonuses = bonuses::evaluate_bonuses(&probs, ctx, breakdown.tension, &params.bonuses);
    let raw_score = combiner::weighted_raw_score(&breakdown, &params.weights) + bonuses.total();

    let decision = decision_point::detect_decision_point(&probs, &params.decision_point.band);
    let adjusted_raw_score = decision_point::adjust_raw_score(
        raw_score,
        decision.lateness,
        &params.decision_point.adjustment,
    );

    let normalized_score = combiner::normalize_score(adjusted_raw_score, &params.normalization);
    let tier = combiner::classify_tier(normalized_score, ctx.sport, &params.tiers);

    debug!(
        "Scored {} samples with {}: T={:.2} D={:.2} F={:.2} bonus={:.2} raw={:.2} → {:.1} ({:?})",
        probs.len(),
        config.version(),
        breakdown.tension,
        breakdown.drama,
        breakdown.finish,
        bonuses.total(),
        raw_score,
        normalized_score,
        tier
    );

    Ok(ExcitementResult {
        raw_score,
        adjusted_raw_score,
        normalized_score,
        breakdown,
        tier,
        bonuses,
        decision_point: Some(decision),
        method: ScoringMethod::Model,
        retained_samples: probs.len(),
    })
}

/// Score a game, falling back to the margin heuristic when the sample stream
/// is missing or too short. Always returns a well-formed result.
pub fn score_game(
    samples: &[ProbabilitySample],
    ctx: &GameContext,
    config: &AlgorithmConfig,
) -> ExcitementResult {
    match try_score_game(samples, ctx, config) {
        Ok(result) => result,
        Err(e) => {
            debug!("Falling back to margin heuristic: {}", e);
            let retained = match e {
                ScoreError::NoData => 0,
                ScoreError::InsufficientData { got, .. } => got,
            };
            fallback_result(ctx, config, retained)
        }
    }
}

fn fallback_result(
    ctx: &GameContext,
    config: &AlgorithmConfig,
    retained_samples: usize,
) -> ExcitementResult {
    let params = config.params();
    let score = combiner::fallback_score(ctx, &params.fallback);
    ExcitementResult {
        raw_score: score,
        adjusted_raw_score: score,
        normalized_score: score,
        breakdown: ComponentScore::default(),
        tier: combiner::classify_tier(score, ctx.sport, &params.tiers),
        bonuses: BonusBreakdown::default(),
        decision_point: None,
        method: ScoringMethod::Fallback,
        retained_samples,
    }
}
