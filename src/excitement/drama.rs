//! Drama: did big swings happen?
//!
//! Each swing is weighted by leverage (swings near 50% matter more) and by
//! recency, summed, then log-compressed so long, dense basketball feeds don't
//! run away from football feeds. Frequent lead changes add a small boost.

use super::algorithm::{DramaParams, LeadChangeTier};

/// Σ |Δp| · leverage · recency · multiplier over adjacent pairs.
///
/// Leverage is `p(1 − p)` of the earlier sample, floored so a swing inside a
/// blowout still registers.
pub fn weighted_swing_sum(probs: &[f64], params: &DramaParams) -> f64 {
    if probs.len() < 2 {
        return 0.0;
    }
    let n = probs.len() as f64;
    probs
        .windows(2)
        .enumerate()
        .map(|(k, pair)| {
            let i = (k + 1) as f64;
            let prev = pair[0];
            let swing = (pair[1] - prev).abs();
            let leverage = (prev * (1.0 - prev)).max(params.leverage_floor);
            let recency = 1.0 + (i / n).powi(2) * params.recency_weight;
            swing * leverage * recency * params.swing_multiplier
        })
        .sum()
}

/// `log(1 + x) / log(1 + base) · 10`, capped at 10.
pub fn log_compress(total: f64, base: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    ((1.0 + total).ln() / (1.0 + base).ln() * 10.0).min(10.0)
}

/// Number of times the favorite flipped. Samples exactly at 0.5 belong to
/// neither side and are skipped.
pub fn count_lead_changes(probs: &[f64]) -> usize {
    let mut changes = 0;
    let mut leader: Option<bool> = None;
    for &p in probs {
        if p == 0.5 {
            continue;
        }
        let home_leads = p > 0.5;
        if let Some(prev) = leader {
            if prev != home_leads {
                changes += 1;
            }
        }
        leader = Some(home_leads);
    }
    changes
}

pub fn lead_change_boost(changes: usize, tiers: &[LeadChangeTier]) -> f64 {
    tiers
        .iter()
        .rev()
        .find(|t| changes >= t.min_changes)
        .map(|t| t.boost)
        .unwrap_or(0.0)
}

/// Final drama score in [0, 10].
pub fn drama_score(probs: &[f64], params: &DramaParams) -> f64 {
    let swings = log_compress(weighted_swing_sum(probs, params), params.log_base);
    let boost = lead_change_boost(count_lead_changes(probs), &params.lead_change_tiers);
    (swings + boost).clamp(0.0, 10.0)
}
