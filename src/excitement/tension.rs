//! Tension: was there sustained reason to keep watching?
//!
//! Two parts:
//! - **Sustained closeness**: recency-weighted average of how near each sample
//!   sits to 50%, bent through a concave transform so a game that is close
//!   most of the way scores well without needing to be a coin flip throughout.
//! - **Comeback boost**: the largest deficit the eventual winner climbed out
//!   of, scaled up when the trough came late.

use super::algorithm::TensionParams;

/// 1.0 at p = 0.5, 0.0 at a certain outcome.
pub(crate) fn closeness(p: f64) -> f64 {
    1.0 - 2.0 * (p - 0.5).abs()
}

/// Final tension score in [0, 10].
pub fn tension_score(probs: &[f64], home_won: Option<bool>, params: &TensionParams) -> f64 {
    let boost = comeback_boost(probs, home_won, params);
    (sustained_closeness(probs, params) + boost).clamp(0.0, 10.0)
}

/// Weighted closeness after the concave transform, scaled to [0, 10].
pub fn sustained_closeness(probs: &[f64], params: &TensionParams) -> f64 {
    if probs.is_empty() {
        return 0.0;
    }
    let n = probs.len() as f64;
    let weighted: f64 = probs
        .iter()
        .enumerate()
        .map(|(i, &p)| closeness(p) * (1.0 + params.recency_weight * (i as f64 / n)))
        .sum();
    let avg = (weighted / n / params.mean_recency_weight).clamp(0.0, 1.0);
    let transformed = 1.0 - (1.0 - avg).powf(params.concave_exponent);
    transformed * 10.0
}

/// Boost for the eventual winner having overcome a deficit.
///
/// The winner comes from the final score when known, otherwise from whoever
/// the final sample favors; a final 0.5 then has no winner and earns nothing.
/// The deficit is measured from 50% at the winner's lowest point, and the
/// latest such trough sets the lateness multiplier.
pub fn comeback_boost(probs: &[f64], home_won: Option<bool>, params: &TensionParams) -> f64 {
    let Some(&last) = probs.last() else {
        return 0.0;
    };
    let home_won = match home_won {
        Some(home_won) => home_won,
        None if last == 0.5 => return 0.0,
        None => last > 0.5,
    };

    let mut trough = f64::INFINITY;
    let mut trough_idx = 0usize;
    for (i, &p) in probs.iter().enumerate() {
        let winner_p = if home_won { p } else { 1.0 - p };
        if winner_p <= trough {
            trough = winner_p;
            trough_idx = i;
        }
    }

    let deficit = 0.5 - trough;
    if deficit <= 0.0 {
        return 0.0;
    }
    let base = params.comeback_lateness_base;
    let lateness = base + (1.0 - base) * (trough_idx as f64 / probs.len() as f64);
    params.comeback_curve.eval(deficit) * lateness
}
