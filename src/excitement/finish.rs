//! Finish: how did it end?
//!
//! Four sub-scores summed and log-compressed:
//!
//! | Sub-score   | Max | Looks at                                           |
//! |-------------|-----|----------------------------------------------------|
//! | closeness   | 4   | closest approach to 50% in the final window        |
//! | volatility  | 4   | drama swing formula over the final quarter          |
//! | walk-off    | 3   | biggest competitive swing in the final window      |
//! | late drama  | 2   | biggest swing in the last few samples              |
//!
//! The walk-off check only credits swings that cross 0.5 or start inside the
//! competitive band, so a leader pulling further away late is not mistaken
//! for a walk-off.

use super::algorithm::{DramaParams, FinishParams};
use super::drama::{log_compress, weighted_swing_sum};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinishBreakdown {
    pub closeness: f64,
    pub volatility: f64,
    pub walkoff: f64,
    pub late_drama: f64,
}

impl FinishBreakdown {
    pub fn total(&self) -> f64 {
        self.closeness + self.volatility + self.walkoff + self.late_drama
    }
}

fn tail(probs: &[f64], len: usize) -> &[f64] {
    &probs[probs.len().saturating_sub(len)..]
}

fn largest_swing(window: &[f64]) -> f64 {
    window
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max)
}

pub fn closeness_points(probs: &[f64], params: &FinishParams) -> f64 {
    let window = tail(probs, params.final_window);
    // Everything but the final sample, which is usually the decided result.
    let pre_final = if window.len() > 1 {
        &window[..window.len() - 1]
    } else {
        window
    };
    let min_distance = pre_final
        .iter()
        .map(|p| (p - 0.5).abs())
        .fold(f64::INFINITY, f64::min);
    if !min_distance.is_finite() {
        return 0.0;
    }
    let closeness = (1.0 - 2.0 * min_distance).clamp(0.0, 1.0);
    closeness.powf(params.closeness_exponent) * params.closeness_max
}

pub fn volatility_points(probs: &[f64], params: &FinishParams, drama: &DramaParams) -> f64 {
    let len = ((probs.len() as f64 * params.volatility_fraction).round() as usize)
        .max(params.min_volatility_window);
    let window = tail(probs, len);
    let compressed = log_compress(weighted_swing_sum(window, drama), drama.log_base);
    compressed / 10.0 * params.volatility_max
}

pub fn walkoff_points(probs: &[f64], params: &FinishParams) -> f64 {
    let window = tail(probs, params.final_window);
    let best = window
        .windows(2)
        .filter(|w| {
            let crosses = (w[0] - 0.5) * (w[1] - 0.5) < 0.0;
            crosses || params.competitive_band.contains(w[0])
        })
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max);
    if best >= params.walkoff_min_swing {
        params.walkoff_curve.eval(best)
    } else {
        0.0
    }
}

pub fn late_drama_points(probs: &[f64], params: &FinishParams) -> f64 {
    let swing = largest_swing(tail(probs, params.late_window));
    if swing >= params.late_min_swing {
        params.late_curve.eval(swing)
    } else {
        0.0
    }
}

pub fn finish_breakdown(
    probs: &[f64],
    params: &FinishParams,
    drama: &DramaParams,
) -> FinishBreakdown {
    FinishBreakdown {
        closeness: closeness_points(probs, params),
        volatility: volatility_points(probs, params, drama),
        walkoff: walkoff_points(probs, params),
        late_drama: late_drama_points(probs, params),
    }
}

/// Final finish score in [0, 10].
pub fn finish_score(probs: &[f64], params: &FinishParams, drama: &DramaParams) -> f64 {
    let parts = finish_breakdown(probs, params, drama);
    log_compress(parts.total(), params.log_base).clamp(0.0, 10.0)
}
