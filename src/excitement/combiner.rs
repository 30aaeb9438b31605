//! Weighted sum → normalization curve → tier lookup, plus the margin-only
//! fallback used when the model has nothing to work with.

use super::algorithm::{FallbackParams, Normalization, TierConfig, Weights};
use crate::models::{round_to, ComponentScore, GameContext, Sport, Tier};

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 10.0;

pub fn weighted_raw_score(breakdown: &ComponentScore, weights: &Weights) -> f64 {
    breakdown.tension * weights.tension
        + breakdown.drama * weights.drama
        + breakdown.finish * weights.finish
}

/// Map a raw score onto 1.0–10.0, rounded to one decimal.
pub fn normalize_score(raw: f64, normalization: &Normalization) -> f64 {
    let scaled = match normalization {
        Normalization::Sigmoid { center, scale } => {
            let sig = 1.0 / (1.0 + (-(raw - center) / scale).exp());
            MIN_SCORE + (MAX_SCORE - MIN_SCORE) * sig
        }
        Normalization::PiecewiseLinear { points } => points.eval(raw),
    };
    if scaled.is_nan() {
        return MIN_SCORE;
    }
    round_to(scaled, 1).clamp(MIN_SCORE, MAX_SCORE)
}

pub fn classify_tier(normalized: f64, sport: Sport, tiers: &TierConfig) -> Tier {
    tiers.cutoffs_for(sport).classify(normalized)
}

/// Margin/overtime heuristic for games without a usable probability feed.
pub fn fallback_score(ctx: &GameContext, params: &FallbackParams) -> f64 {
    let base = params
        .margin_tiers
        .iter()
        .find(|t| ctx.final_margin_abs <= t.max_margin)
        .map(|t| t.score)
        .unwrap_or(params.default_score);
    let overtime = if ctx.overtime {
        params.overtime_bonus
    } else {
        0.0
    };
    round_to(base + overtime, 1).clamp(MIN_SCORE, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excitement::algorithm::{AlgorithmVersion, Curve};
    use approx::assert_relative_eq;

    fn sigmoid() -> Normalization {
        Normalization::default()
    }

    #[test]
    fn weighted_sum() {
        let breakdown = ComponentScore {
            tension: 8.0,
            drama: 6.0,
            finish: 4.0,
        };
        let raw = weighted_raw_score(&breakdown, &Weights::default());
        assert_relative_eq!(raw, 0.30 * 8.0 + 0.35 * 6.0 + 0.35 * 4.0, epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_center_maps_to_midpoint() {
        assert_relative_eq!(normalize_score(5.0, &sigmoid()), 5.5);
    }

    #[test]
    fn sigmoid_hand_computed() {
        // raw 10 → 1 + 9 / (1 + e^-2) = 8.918…
        assert_relative_eq!(normalize_score(10.0, &sigmoid()), 8.9);
        // raw 0 → 1 + 9 / (1 + e^2) = 2.081…
        assert_relative_eq!(normalize_score(0.0, &sigmoid()), 2.1);
    }

    #[test]
    fn normalized_always_in_range() {
        for raw in [-100.0, -1.0, 0.0, 3.3, 7.7, 25.0, 1e6, f64::NAN] {
            for norm in [sigmoid(), AlgorithmVersion::V1.params().normalization] {
                let n = normalize_score(raw, &norm);
                assert!((1.0..=10.0).contains(&n), "raw {} → {}", raw, n);
            }
        }
    }

    #[test]
    fn piecewise_linear_strategy() {
        let norm = Normalization::PiecewiseLinear {
            points: Curve::new(vec![(0.0, 1.0), (4.0, 5.0), (8.0, 10.0)]),
        };
        assert_relative_eq!(normalize_score(2.0, &norm), 3.0);
        assert_relative_eq!(normalize_score(6.0, &norm), 7.5);
        assert_relative_eq!(normalize_score(12.0, &norm), 10.0);
    }

    #[test]
    fn tier_is_monotonic_in_score() {
        let tiers = TierConfig::default();
        for sport in [Sport::Nfl, Sport::Cfb, Sport::Nba] {
            let mut previous = Tier::Skip;
            for step in 10..=100 {
                let tier = classify_tier(step as f64 / 10.0, sport, &tiers);
                assert!(tier >= previous, "{:?}: tier dropped at {}", sport, step);
                previous = tier;
            }
        }
    }

    #[test]
    fn fallback_margins() {
        let params = FallbackParams::default();
        let score = |margin: i32, ot: bool| {
            fallback_score(&GameContext::from_scores(Sport::Nfl, margin, 0, ot), &params)
        };
        assert_relative_eq!(score(3, false), 8.0);
        assert_relative_eq!(score(7, false), 7.0);
        assert_relative_eq!(score(14, false), 6.0);
        assert_relative_eq!(score(21, false), 5.0);
        assert_relative_eq!(score(35, false), 4.0);
        assert_relative_eq!(score(3, true), 9.0);
        assert_relative_eq!(score(40, true), 5.0);
    }
}
