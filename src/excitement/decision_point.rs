//! Decision point: the last moment the game was still competitive.
//!
//! Diagnostic by default. Versions that opt in use the lateness to
//! post-process the raw score; the base formula never depends on it.

use super::algorithm::{Band, DecisionAdjustment};
use crate::models::DecisionPoint;

pub fn detect_decision_point(probs: &[f64], band: &Band) -> DecisionPoint {
    let index = probs.iter().rposition(|&p| band.contains(p));
    let lateness = match index {
        None => 0.0,
        Some(_) if probs.len() < 2 => 1.0,
        Some(i) => i as f64 / (probs.len() - 1) as f64,
    };
    DecisionPoint { index, lateness }
}

/// Apply the configured strategy to a raw score.
pub fn adjust_raw_score(raw: f64, lateness: f64, adjustment: &DecisionAdjustment) -> f64 {
    let lateness = lateness.clamp(0.0, 1.0);
    match *adjustment {
        DecisionAdjustment::None => raw,
        DecisionAdjustment::Multiplicative { exponent } => raw * lateness.powf(exponent),
        DecisionAdjustment::Blend { weight } => (1.0 - weight) * raw + weight * lateness * 10.0,
    }
}
