//! Input sanitation: clamping, trailing-noise removal and the sufficiency gate.

use tracing::debug;

use super::algorithm::Thresholds;
use super::error::ScoreError;
use crate::models::ProbabilitySample;

/// Probability used for missing or non-numeric samples.
const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Clamp one raw value into [0, 1]. Missing and NaN values become 0.5.
pub fn clamp_probability(raw: Option<f64>) -> f64 {
    match raw {
        Some(p) if !p.is_nan() => p.clamp(0.0, 1.0),
        _ => NEUTRAL_PROBABILITY,
    }
}

pub fn clamp_samples(samples: &[ProbabilitySample]) -> Vec<f64> {
    samples
        .iter()
        .map(|s| clamp_probability(s.win_probability))
        .collect()
}

/// Drop post-game artifacts that swing probability back from a decided value.
///
/// Finds the last sample within `decisive_epsilon` of 0 or 1. If any later
/// sample strays more than `bounce_threshold` from that decided value, the
/// sequence is cut right after the decisive sample. Sequences that never reach
/// a decisive value are returned unchanged.
///
/// When the winner is known only samples decided in the winner's favor count,
/// so a comeback from a near-zero trough is not mistaken for noise.
pub fn filter_trailing_noise(
    probs: &[f64],
    thresholds: &Thresholds,
    home_won: Option<bool>,
) -> Vec<f64> {
    let eps = thresholds.decisive_epsilon;
    let home_side = home_won != Some(false);
    let away_side = home_won != Some(true);
    let decisive = probs
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, &p)| {
            if away_side && p <= eps {
                Some((i, 0.0))
            } else if home_side && p >= 1.0 - eps {
                Some((i, 1.0))
            } else {
                None
            }
        });

    let Some((idx, decided_value)) = decisive else {
        return probs.to_vec();
    };

    let bounced = probs[idx + 1..]
        .iter()
        .any(|p| (p - decided_value).abs() > thresholds.bounce_threshold);
    if bounced {
        debug!(
            "Trailing noise: truncating {} sample(s) after decisive index {}",
            probs.len() - idx - 1,
            idx
        );
        probs[..=idx].to_vec()
    } else {
        probs.to_vec()
    }
}

/// Refuse sequences too short for the model.
pub fn check_sufficient(probs: &[f64], thresholds: &Thresholds) -> Result<(), ScoreError> {
    if probs.is_empty() {
        return Err(ScoreError::NoData);
    }
    if probs.len() < thresholds.min_data_points {
        return Err(ScoreError::InsufficientData {
            got: probs.len(),
            required: thresholds.min_data_points,
        });
    }
    Ok(())
}

/// Clamp, filter and gate in one pass. The returned sequence is what every
/// component calculator sees.
pub fn normalize(
    samples: &[ProbabilitySample],
    thresholds: &Thresholds,
    home_won: Option<bool>,
) -> Result<Vec<f64>, ScoreError> {
    let clamped = clamp_samples(samples);
    let filtered = filter_trailing_noise(&clamped, thresholds, home_won);
    check_sufficient(&filtered, thresholds)?;
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn thresholds() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn clamps_out_of_range_and_malformed_values() {
        assert_relative_eq!(clamp_probability(Some(1.7)), 1.0);
        assert_relative_eq!(clamp_probability(Some(-0.2)), 0.0);
        assert_relative_eq!(clamp_probability(Some(f64::NAN)), 0.5);
        assert_relative_eq!(clamp_probability(Some(f64::INFINITY)), 1.0);
        assert_relative_eq!(clamp_probability(None), 0.5);
        assert_relative_eq!(clamp_probability(Some(0.42)), 0.42);
    }

    #[test]
    fn undecided_sequence_is_untouched() {
        let probs = vec![0.5, 0.6, 0.55, 0.3];
        assert_eq!(filter_trailing_noise(&probs, &thresholds(), None), probs);
    }

    #[test]
    fn undecided_game_ending_at_055_keeps_late_dip() {
        // No sample ever reaches a decisive value, so nothing is noise.
        let mut probs: Vec<f64> = (0..20).map(|i| 0.45 + 0.005 * i as f64).collect();
        probs.push(0.55);
        probs.extend([0.42, 0.30]);
        let filtered = filter_trailing_noise(&probs, &thresholds(), None);
        assert_eq!(filtered.len(), probs.len());
    }

    #[test]
    fn bounce_after_decision_is_truncated() {
        // Home team closes the game out at 0.97, then the feed appends a
        // bogus swing back through 0.55 down to 0.30.
        let mut probs: Vec<f64> = (0..30).map(|i| 0.50 + 0.015 * i as f64).collect();
        probs.push(0.97);
        let decisive_len = probs.len();
        probs.extend([0.55, 0.30]);

        let filtered = filter_trailing_noise(&probs, &thresholds(), None);
        assert_eq!(filtered.len(), decisive_len);
        assert_relative_eq!(*filtered.last().unwrap(), 0.97);
    }

    #[test]
    fn small_wobble_after_decision_is_kept() {
        let probs = vec![0.5, 0.7, 0.99, 0.97, 0.92];
        assert_eq!(filter_trailing_noise(&probs, &thresholds(), None), probs);
    }

    #[test]
    fn away_win_decision_near_zero() {
        let probs = vec![0.5, 0.3, 0.02, 0.01, 0.4];
        let filtered = filter_trailing_noise(&probs, &thresholds(), None);
        assert_eq!(filtered, vec![0.5, 0.3, 0.02, 0.01]);
    }

    #[test]
    fn comeback_from_near_zero_is_not_noise() {
        // Home sits at 0.03 for a long stretch, then rallies and wins.
        let mut probs = vec![0.03; 30];
        probs.extend([0.2, 0.45, 0.7, 0.85]);
        assert_eq!(filter_trailing_noise(&probs, &thresholds(), Some(true)), probs);
        // Without the result the trough looks like a decision.
        assert_eq!(filter_trailing_noise(&probs, &thresholds(), None).len(), 30);
    }

    #[test]
    fn known_winner_still_truncates_bounce() {
        let probs = vec![0.5, 0.7, 0.97, 0.55, 0.30];
        assert_eq!(filter_trailing_noise(&probs, &thresholds(), Some(true)), vec![0.5, 0.7, 0.97]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let cases = vec![
            vec![0.5, 0.8, 0.99, 0.55, 0.30],
            vec![0.5, 0.3, 0.04, 0.5, 0.6, 0.03, 0.4],
            vec![0.5, 0.45, 0.55],
            vec![0.0, 1.0, 0.0, 1.0],
        ];
        for probs in cases {
            for home_won in [None, Some(true), Some(false)] {
                let once = filter_trailing_noise(&probs, &thresholds(), home_won);
                let twice = filter_trailing_noise(&once, &thresholds(), home_won);
                assert_eq!(once, twice, "re-filtering changed {:?}", probs);
            }
        }
    }

    #[test]
    fn sufficiency_gate_boundary() {
        let t = thresholds();
        let short = vec![0.5; t.min_data_points - 1];
        let exact = vec![0.5; t.min_data_points];
        assert_eq!(
            check_sufficient(&short, &t),
            Err(ScoreError::InsufficientData {
                got: t.min_data_points - 1,
                required: t.min_data_points
            })
        );
        assert_eq!(check_sufficient(&exact, &t), Ok(()));
        assert_eq!(check_sufficient(&[], &t), Err(ScoreError::NoData));
    }

    #[test]
    fn gate_applies_after_filtering() {
        // 12 raw samples, but noise removal leaves only 9.
        let mut probs = vec![0.5, 0.6, 0.7, 0.8, 0.85, 0.9, 0.93, 0.95, 0.99];
        probs.extend([0.6, 0.4, 0.3]);
        let samples = ProbabilitySample::from_probabilities(&probs);
        assert!(matches!(
            normalize(&samples, &thresholds(), Some(true)),
            Err(ScoreError::InsufficientData { got: 9, .. })
        ));
    }
}
