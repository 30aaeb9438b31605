use serde::{Deserialize, Serialize};

/// Leagues the excitement model is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nfl,
    Cfb,
    Nba,
}

impl Sport {
    /// Basketball margins run roughly twice as wide as football margins for
    /// the same "closeness" of game.
    pub fn is_basketball(self) -> bool {
        matches!(self, Sport::Nba)
    }
}

/// One win-probability sample as captured by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilitySample {
    /// Home-team win probability (0.0–1.0). Missing values are scored as 0.5.
    #[serde(default)]
    pub win_probability: Option<f64>,
    #[serde(default)]
    pub sequence_index: Option<u32>,
    /// e.g. "Q4", "OT"
    #[serde(default)]
    pub period_label: Option<String>,
    /// e.g. "2:13"
    #[serde(default)]
    pub clock_label: Option<String>,
}

impl ProbabilitySample {
    pub fn new(win_probability: f64) -> Self {
        ProbabilitySample {
            win_probability: Some(win_probability),
            sequence_index: None,
            period_label: None,
            clock_label: None,
        }
    }

    /// Build an ordered sample list from raw probabilities.
    pub fn from_probabilities(probs: &[f64]) -> Vec<Self> {
        probs
            .iter()
            .enumerate()
            .map(|(i, p)| ProbabilitySample {
                sequence_index: Some(i as u32),
                ..ProbabilitySample::new(*p)
            })
            .collect()
    }
}

/// Final-state metadata needed by the bonus evaluators and the fallback path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameContext {
    pub sport: Sport,
    pub final_margin_abs: u32,
    pub overtime: bool,
    /// Number of overtime periods played (0 when `overtime` is false)
    pub overtime_periods: u32,
    /// `Some(true)` when the home side won, `None` for ties or unknown results
    pub home_won: Option<bool>,
}

impl GameContext {
    pub fn from_scores(sport: Sport, home_score: i32, away_score: i32, overtime: bool) -> Self {
        GameContext {
            sport,
            final_margin_abs: home_score.abs_diff(away_score),
            overtime,
            overtime_periods: u32::from(overtime),
            home_won: match home_score.cmp(&away_score) {
                std::cmp::Ordering::Greater => Some(true),
                std::cmp::Ordering::Less => Some(false),
                std::cmp::Ordering::Equal => None,
            },
        }
    }

    pub fn with_overtime_periods(mut self, periods: u32) -> Self {
        self.overtime = periods > 0;
        self.overtime_periods = periods;
        self
    }
}

/// The three-factor breakdown, each component in [0, 10].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub tension: f64,
    pub drama: f64,
    pub finish: f64,
}

impl ComponentScore {
    pub fn rounded(&self) -> Self {
        ComponentScore {
            tension: round_to(self.tension, 2),
            drama: round_to(self.drama, 2),
            finish: round_to(self.finish, 2),
        }
    }
}

/// Discrete recommendation bucket. Ordered by rank: `Skip < Recommended < MustWatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Skip,
    Recommended,
    MustWatch,
}

/// Per-bonus deltas added to the weighted raw score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusBreakdown {
    pub upset: f64,
    pub comeback: f64,
    pub volatility: f64,
    pub overtime: f64,
    pub close_game: f64,
}

impl BonusBreakdown {
    pub fn total(&self) -> f64 {
        self.upset + self.comeback + self.volatility + self.overtime + self.close_game
    }
}

/// Last moment the game was still statistically competitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPoint {
    /// Index of the last sample inside the competitive band, if any
    pub index: Option<usize>,
    /// `index / (N - 1)`: 1.0 when competitive to the end, 0.0 when never competitive
    pub lateness: f64,
}

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMethod {
    /// Full win-probability model
    Model,
    /// Margin/overtime heuristic used when the sample stream is missing or too short
    Fallback,
}

/// Complete scoring result for one game. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcitementResult {
    /// Weighted component sum plus bonuses
    pub raw_score: f64,
    /// Raw score after the decision-point strategy (equal to `raw_score` when disabled)
    pub adjusted_raw_score: f64,
    /// Normalized 1.0–10.0 score, one decimal
    pub normalized_score: f64,
    pub breakdown: ComponentScore,
    pub tier: Tier,
    pub bonuses: BonusBreakdown,
    pub decision_point: Option<DecisionPoint>,
    pub method: ScoringMethod,
    /// Samples left after trailing-noise filtering
    pub retained_samples: usize,
}

impl ExcitementResult {
    pub fn to_output(&self) -> GameExcitement {
        GameExcitement {
            excitement: round_to(self.normalized_score, 1),
            breakdown: self.breakdown.rounded(),
            tier: self.tier,
            method: self.method,
        }
    }
}

/// Wire shape handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameExcitement {
    pub excitement: f64,
    pub breakdown: ComponentScore,
    pub tier: Tier,
    pub method: ScoringMethod,
}

/// A completed game as produced by the fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub sport: Sport,
    pub home_score: i32,
    pub away_score: i32,
    #[serde(default)]
    pub overtime: bool,
    #[serde(default)]
    pub overtime_periods: Option<u32>,
    #[serde(default)]
    pub samples: Vec<ProbabilitySample>,
}

impl GameRecord {
    pub fn context(&self) -> GameContext {
        let ctx =
            GameContext::from_scores(self.sport, self.home_score, self.away_score, self.overtime);
        match self.overtime_periods {
            Some(periods) if self.overtime => ctx.with_overtime_periods(periods.max(1)),
            _ => ctx,
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
