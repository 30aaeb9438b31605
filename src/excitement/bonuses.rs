//! Bonus evaluators, added on top of the weighted component score.
//!
//! | Bonus      | Trigger                                         | Max  |
//! |------------|-------------------------------------------------|------|
//! | Upset      | early favorite loses                            | 0.8  |
//! | Comeback   | a side at ≥85% later falls behind               | 2.0  |
//! | Volatility | many large swings, a massive swing, or a swing  | 1.5  |
//! |            | out of an extreme                               |      |
//! | Overtime   | game went to overtime                           | open |
//! | Close game | small final margin, discounted by low tension   | 1.5  |

use super::algorithm::{
    BonusParams, CloseGameBonus, ComebackBonus, OvertimeBonus, UpsetBonus, VolatilityBonus,
};
use crate::models::{BonusBreakdown, GameContext};

pub fn upset_bonus(probs: &[f64], params: &UpsetBonus) -> f64 {
    let Some(&last) = probs.last() else {
        return 0.0;
    };
    let early_len = ((probs.len() as f64 * params.early_fraction).ceil() as usize)
        .clamp(1, probs.len());
    let early_mean = probs[..early_len].iter().sum::<f64>() / early_len as f64;

    let home_favored = early_mean >= params.favorite_threshold;
    let away_favored = 1.0 - early_mean >= params.favorite_threshold;
    let favorite_prob = if home_favored && last < 0.5 {
        early_mean
    } else if away_favored && last > 0.5 {
        1.0 - early_mean
    } else {
        return 0.0;
    };
    params.magnitude.eval(favorite_prob)
}

/// Largest lead (distance from 0.5) held at or beyond `extreme` that the
/// other side later overturned.
pub fn blown_lead(probs: &[f64], extreme: f64) -> f64 {
    let mut min_after = f64::INFINITY;
    let mut max_after = f64::NEG_INFINITY;
    let mut deficit = 0.0f64;
    for &p in probs.iter().rev() {
        if p >= extreme && min_after < 0.5 {
            deficit = deficit.max(p - 0.5);
        }
        if p <= 1.0 - extreme && max_after > 0.5 {
            deficit = deficit.max(0.5 - p);
        }
        min_after = min_after.min(p);
        max_after = max_after.max(p);
    }
    deficit
}

pub fn comeback_bonus(probs: &[f64], params: &ComebackBonus) -> f64 {
    params.magnitude.eval(blown_lead(probs, params.extreme))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwingCounts {
    pub large: usize,
    pub massive: usize,
    pub from_extreme: usize,
}

pub fn count_swings(probs: &[f64], params: &VolatilityBonus) -> SwingCounts {
    let mut counts = SwingCounts::default();
    for w in probs.windows(2) {
        let swing = (w[1] - w[0]).abs();
        if swing >= params.large_swing {
            counts.large += 1;
            if w[0] <= params.extreme_low || w[0] >= params.extreme_high {
                counts.from_extreme += 1;
            }
        }
        if swing >= params.massive_swing {
            counts.massive += 1;
        }
    }
    counts
}

pub fn volatility_bonus(probs: &[f64], params: &VolatilityBonus) -> f64 {
    let counts = count_swings(probs, params);
    let mut bonus = 0.0f64;
    if counts.large >= params.large_swing_count {
        bonus = bonus.max(params.large_bonus);
    }
    if counts.massive > 0 {
        bonus = bonus.max(params.massive_bonus);
    }
    if counts.from_extreme > 0 {
        bonus = bonus.max(params.extreme_bonus);
    }
    bonus
}

pub fn overtime_bonus(ctx: &GameContext, params: &OvertimeBonus) -> f64 {
    if !ctx.overtime {
        return 0.0;
    }
    let periods = ctx.overtime_periods.max(1);
    params.base + params.per_extra_period * f64::from(periods - 1)
}

/// Share of the close-game bonus kept at a given tension. A tight final
/// margin after a game that was never in doubt earns little.
pub fn close_game_credit(tension: f64, params: &CloseGameBonus) -> f64 {
    if tension < params.low_tension {
        params.low_tension_factor
    } else if tension >= params.full_tension || params.full_tension <= params.low_tension {
        1.0
    } else {
        let frac = (tension - params.low_tension) / (params.full_tension - params.low_tension);
        params.low_tension_factor + (1.0 - params.low_tension_factor) * frac
    }
}

pub fn close_game_bonus(ctx: &GameContext, tension: f64, params: &CloseGameBonus) -> f64 {
    let multiplier = if ctx.sport.is_basketball() {
        params.basketball_margin_multiplier
    } else {
        1
    };
    let base = params
        .tiers
        .iter()
        .find(|t| ctx.final_margin_abs <= t.max_margin.saturating_mul(multiplier))
        .map(|t| t.bonus)
        .unwrap_or(0.0);
    base * close_game_credit(tension, params)
}

pub fn evaluate_bonuses(
    probs: &[f64],
    ctx: &GameContext,
    tension: f64,
    params: &BonusParams,
) -> BonusBreakdown {
    BonusBreakdown {
        upset: upset_bonus(probs, &params.upset),
        comeback: comeback_bonus(probs, &params.comeback),
        volatility: volatility_bonus(probs, &params.volatility),
        overtime: overtime_bonus(ctx, &params.overtime),
        close_game: close_game_bonus(ctx, tension, &params.close_game),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sport;
    use approx::assert_relative_eq;

    fn params() -> BonusParams {
        BonusParams::default()
    }

    fn ctx(sport: Sport, margin: u32) -> GameContext {
        GameContext {
            sport,
            final_margin_abs: margin,
            overtime: false,
            overtime_periods: 0,
            home_won: Some(true),
        }
    }

    // ── Upset ────────────────────────────────────────────────────────────────

    #[test]
    fn heavy_favorite_losing_earns_full_upset() {
        let mut probs = vec![0.80; 10];
        probs.extend(vec![0.3; 90]);
        assert_relative_eq!(upset_bonus(&probs, &params().upset), 0.8);
    }

    #[test]
    fn upset_scales_with_favorite_strength() {
        let mut probs = vec![0.65; 10];
        probs.extend(vec![0.3; 90]);
        assert_relative_eq!(upset_bonus(&probs, &params().upset), 0.4, epsilon = 1e-9);
    }

    #[test]
    fn favorite_winning_is_no_upset() {
        let mut probs = vec![0.80; 10];
        probs.extend(vec![0.9; 90]);
        assert_relative_eq!(upset_bonus(&probs, &params().upset), 0.0);
    }

    #[test]
    fn away_favorite_losing_is_an_upset() {
        let mut probs = vec![0.25; 10];
        probs.extend(vec![0.7; 90]);
        assert_relative_eq!(upset_bonus(&probs, &params().upset), 0.8);
    }

    #[test]
    fn pick_em_start_has_no_favorite() {
        let mut probs = vec![0.52; 10];
        probs.extend(vec![0.1; 90]);
        assert_relative_eq!(upset_bonus(&probs, &params().upset), 0.0);
    }

    // ── Comeback ─────────────────────────────────────────────────────────────

    #[test]
    fn blown_lead_requires_crossing() {
        assert_relative_eq!(blown_lead(&[0.5, 0.9, 0.6, 0.55], 0.85), 0.0);
        assert_relative_eq!(blown_lead(&[0.5, 0.9, 0.6, 0.45], 0.85), 0.4, epsilon = 1e-12);
        assert_relative_eq!(blown_lead(&[0.5, 0.04, 0.3, 0.51], 0.85), 0.46, epsilon = 1e-12);
    }

    #[test]
    fn crossing_before_the_extreme_does_not_count() {
        // Home falls behind first, then goes up big and holds on.
        assert_relative_eq!(blown_lead(&[0.5, 0.3, 0.95, 0.99], 0.85), 0.0);
    }

    #[test]
    fn comeback_bonus_tiers() {
        let b = &params().comeback;
        assert_relative_eq!(comeback_bonus(&[0.85, 0.4], b), 0.0);
        assert_relative_eq!(comeback_bonus(&[0.90, 0.4], b), 0.5, epsilon = 1e-9);
        assert_relative_eq!(comeback_bonus(&[0.95, 0.4], b), 1.2, epsilon = 1e-9);
        assert_relative_eq!(comeback_bonus(&[1.0, 0.4], b), 2.0, epsilon = 1e-9);
    }

    // ── Volatility ───────────────────────────────────────────────────────────

    #[test]
    fn many_large_swings() {
        let probs = vec![0.4, 0.6, 0.4, 0.6, 0.4, 0.6, 0.4];
        let counts = count_swings(&probs, &params().volatility);
        assert_eq!(counts.large, 6);
        assert_eq!(counts.massive, 0);
        assert_relative_eq!(volatility_bonus(&probs, &params().volatility), 1.0);
    }

    #[test]
    fn massive_swing_dominates() {
        let probs = vec![0.2, 0.75, 0.5];
        assert_relative_eq!(volatility_bonus(&probs, &params().volatility), 1.5);
    }

    #[test]
    fn swing_out_of_extreme() {
        let probs = vec![0.95, 0.7, 0.7];
        let counts = count_swings(&probs, &params().volatility);
        assert_eq!(counts.from_extreme, 1);
        assert_relative_eq!(volatility_bonus(&probs, &params().volatility), 0.75);
    }

    #[test]
    fn calm_game_has_no_volatility_bonus() {
        let probs: Vec<f64> = (0..50).map(|i| 0.5 + 0.005 * i as f64).collect();
        assert_relative_eq!(volatility_bonus(&probs, &params().volatility), 0.0);
    }

    // ── Overtime ─────────────────────────────────────────────────────────────

    #[test]
    fn overtime_periods() {
        let p = params().overtime;
        let regulation = ctx(Sport::Nfl, 3);
        assert_relative_eq!(overtime_bonus(&regulation, &p), 0.0);
        let one = regulation.with_overtime_periods(1);
        assert_relative_eq!(overtime_bonus(&one, &p), 0.8);
        let triple = regulation.with_overtime_periods(3);
        assert_relative_eq!(overtime_bonus(&triple, &p), 1.4, epsilon = 1e-12);
    }

    // ── Close game ───────────────────────────────────────────────────────────

    #[test]
    fn close_game_tiers_football() {
        let p = &params().close_game;
        assert_relative_eq!(close_game_bonus(&ctx(Sport::Nfl, 3), 6.0, p), 1.5);
        assert_relative_eq!(close_game_bonus(&ctx(Sport::Nfl, 7), 6.0, p), 0.5);
        assert_relative_eq!(close_game_bonus(&ctx(Sport::Cfb, 10), 6.0, p), 0.2);
        assert_relative_eq!(close_game_bonus(&ctx(Sport::Nfl, 11), 6.0, p), 0.0);
    }

    #[test]
    fn close_game_tiers_double_for_basketball() {
        let p = &params().close_game;
        assert_relative_eq!(close_game_bonus(&ctx(Sport::Nba, 6), 6.0, p), 1.5);
        assert_relative_eq!(close_game_bonus(&ctx(Sport::Nba, 14), 6.0, p), 0.5);
        assert_relative_eq!(close_game_bonus(&ctx(Sport::Nba, 20), 6.0, p), 0.2);
        assert_relative_eq!(close_game_bonus(&ctx(Sport::Nba, 21), 6.0, p), 0.0);
    }

    #[test]
    fn deceptive_margin_is_discounted_by_tension() {
        let p = &params().close_game;
        let g = ctx(Sport::Nfl, 3);
        assert_relative_eq!(close_game_bonus(&g, 2.0, p), 1.5 * 0.25, epsilon = 1e-12);
        assert_relative_eq!(close_game_bonus(&g, 4.0, p), 1.5 * 0.625, epsilon = 1e-12);
        assert_relative_eq!(close_game_bonus(&g, 5.0, p), 1.5);
    }
}
