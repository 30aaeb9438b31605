//! Versioned algorithm configuration.
//!
//! Every empirical constant the scorer uses lives here. The numbers were
//! hand-tuned against a small labeled benchmark and changed between versions,
//! so they are data rather than code: each [`AlgorithmVersion`] carries its
//! own immutable [`AlgorithmParams`] bundle, and a JSON file can override any
//! table for tuning experiments.
//!
//! | Version | Normalization    | Decision-point adjustment | Weights (T/D/F)  |
//! |---------|------------------|---------------------------|------------------|
//! | v1      | piecewise-linear | none                      | 0.35/0.30/0.35   |
//! | v2      | sigmoid          | none                      | 0.30/0.35/0.35   |
//! | v3      | sigmoid          | multiplicative (√)        | 0.30/0.35/0.35   |
//! | v4      | sigmoid          | blend (20%)               | 0.30/0.35/0.35   |
//!
//! An [`AlgorithmConfig`] can only be obtained through a validating
//! constructor and exposes no mutators, so a loaded config is safe to share
//! across any number of concurrent scoring calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use super::error::ConfigError;
use crate::models::{Sport, Tier};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// ── Versions ─────────────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmVersion {
    /// Piecewise-linear normalization, earlier component weights
    V1,
    /// Sigmoid normalization (production)
    #[default]
    V2,
    /// v2 scaled by √(decision lateness)
    V3,
    /// v2 blended with decision lateness
    V4,
}

impl AlgorithmVersion {
    pub const ALL: [AlgorithmVersion; 4] = [
        AlgorithmVersion::V1,
        AlgorithmVersion::V2,
        AlgorithmVersion::V3,
        AlgorithmVersion::V4,
    ];

    /// Built-in parameter bundle for this version.
    pub fn params(self) -> AlgorithmParams {
        match self {
            AlgorithmVersion::V1 => AlgorithmParams {
                weights: Weights {
                    tension: 0.35,
                    drama: 0.30,
                    finish: 0.35,
                },
                finish: FinishParams {
                    closeness_exponent: 0.7,
                    ..FinishParams::default()
                },
                normalization: Normalization::PiecewiseLinear {
                    points: Curve::new(vec![
                        (0.0, 1.0),
                        (2.0, 2.5),
                        (4.0, 4.5),
                        (6.0, 6.5),
                        (8.0, 8.0),
                        (10.0, 9.2),
                        (12.0, 10.0),
                    ]),
                },
                ..AlgorithmParams::default()
            },
            AlgorithmVersion::V2 => AlgorithmParams::default(),
            AlgorithmVersion::V3 => AlgorithmParams {
                decision_point: DecisionPointParams {
                    adjustment: DecisionAdjustment::Multiplicative { exponent: 0.5 },
                    ..DecisionPointParams::default()
                },
                ..AlgorithmParams::default()
            },
            AlgorithmVersion::V4 => AlgorithmParams {
                decision_point: DecisionPointParams {
                    adjustment: DecisionAdjustment::Blend { weight: 0.2 },
                    ..DecisionPointParams::default()
                },
                ..AlgorithmParams::default()
            },
        }
    }
}

impl fmt::Display for AlgorithmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlgorithmVersion::V1 => "v1",
            AlgorithmVersion::V2 => "v2",
            AlgorithmVersion::V3 => "v3",
            AlgorithmVersion::V4 => "v4",
        };
        f.write_str(s)
    }
}

// ── Lookup tables ────────────────────────────────────────────────────────────

/// Piecewise-linear lookup table.
///
/// Returns 0.0 below the first point, interpolates between points and stays
/// flat beyond the last one. Serialized as `[[x, y], ...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Curve(Vec<(f64, f64)>);

impl Curve {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Curve(points)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.0
    }

    pub fn eval(&self, x: f64) -> f64 {
        let Some(&(first_x, _)) = self.0.first() else {
            return 0.0;
        };
        if x < first_x {
            return 0.0;
        }
        for pair in self.0.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if x <= x1 {
                let frac = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
                return y0 + (y1 - y0) * frac;
            }
        }
        self.0.last().map(|&(_, y)| y).unwrap_or(0.0)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::invalid(name, "curve needs at least one point"));
        }
        if self.0.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(ConfigError::invalid(name, "curve points must be finite"));
        }
        if self.0.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(ConfigError::invalid(name, "curve x values must be strictly increasing"));
        }
        Ok(())
    }
}

/// Closed probability interval, e.g. the "still competitive" band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn contains(&self, p: f64) -> bool {
        (self.low..=self.high).contains(&p)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.low) || !(0.0..=1.0).contains(&self.high) {
            return Err(ConfigError::invalid(name, "band bounds must be within [0, 1]"));
        }
        if self.low >= self.high {
            return Err(ConfigError::invalid(name, "band low must be below band high"));
        }
        Ok(())
    }
}

// ── Parameter bundle ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlgorithmParams {
    pub weights: Weights,
    pub thresholds: Thresholds,
    pub tension: TensionParams,
    pub drama: DramaParams,
    pub finish: FinishParams,
    pub bonuses: BonusParams,
    pub normalization: Normalization,
    pub decision_point: DecisionPointParams,
    pub tiers: TierConfig,
    pub fallback: FallbackParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub tension: f64,
    pub drama: f64,
    pub finish: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            tension: 0.30,
            drama: 0.35,
            finish: 0.35,
        }
    }
}

/// Input gating and trailing-noise filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Fewer samples than this routes the game to the margin fallback
    pub min_data_points: usize,
    /// Distance from 0 or 1 at which a sample counts as decided
    pub decisive_epsilon: f64,
    /// Post-decision deviation that marks trailing samples as feed noise
    pub bounce_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            min_data_points: 10,
            decisive_epsilon: 0.05,
            bounce_threshold: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensionParams {
    /// Extra weight given to the final sample relative to the first
    pub recency_weight: f64,
    /// Mean of the recency weights over a full game
    pub mean_recency_weight: f64,
    pub concave_exponent: f64,
    /// Winner's overcome deficit → boost points
    pub comeback_curve: Curve,
    /// Multiplier for a trough at the very start; rises linearly to 1.0 at the end
    pub comeback_lateness_base: f64,
}

impl Default for TensionParams {
    fn default() -> Self {
        TensionParams {
            recency_weight: 0.3,
            mean_recency_weight: 1.15,
            concave_exponent: 1.3,
            comeback_curve: Curve::new(vec![(0.15, 0.0), (0.30, 1.0), (0.40, 2.5), (0.50, 4.0)]),
            comeback_lateness_base: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeadChangeTier {
    pub min_changes: usize,
    pub boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DramaParams {
    pub leverage_floor: f64,
    pub swing_multiplier: f64,
    pub recency_weight: f64,
    /// Swing sum that maps to a full 10.0 before clipping
    pub log_base: f64,
    /// Ascending by `min_changes`; the highest tier reached applies
    pub lead_change_tiers: Vec<LeadChangeTier>,
}

impl Default for DramaParams {
    fn default() -> Self {
        DramaParams {
            leverage_floor: 0.05,
            swing_multiplier: 4.0,
            recency_weight: 0.5,
            log_base: 18.0,
            lead_change_tiers: vec![
                LeadChangeTier {
                    min_changes: 5,
                    boost: 0.3,
                },
                LeadChangeTier {
                    min_changes: 8,
                    boost: 0.6,
                },
                LeadChangeTier {
                    min_changes: 11,
                    boost: 1.0,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishParams {
    pub final_window: usize,
    pub closeness_exponent: f64,
    pub closeness_max: f64,
    /// Share of the game (from the end) fed to the volatility sub-score
    pub volatility_fraction: f64,
    pub min_volatility_window: usize,
    pub volatility_max: f64,
    /// Walk-off swings must cross 0.5 or start inside this band
    pub competitive_band: Band,
    pub walkoff_min_swing: f64,
    pub walkoff_curve: Curve,
    pub late_window: usize,
    pub late_min_swing: f64,
    pub late_curve: Curve,
    pub log_base: f64,
}

impl Default for FinishParams {
    fn default() -> Self {
        FinishParams {
            final_window: 10,
            closeness_exponent: 0.65,
            closeness_max: 4.0,
            volatility_fraction: 0.25,
            min_volatility_window: 2,
            volatility_max: 4.0,
            competitive_band: Band {
                low: 0.35,
                high: 0.65,
            },
            walkoff_min_swing: 0.15,
            walkoff_curve: Curve::new(vec![(0.15, 1.0), (0.50, 3.0)]),
            late_window: 5,
            late_min_swing: 0.20,
            late_curve: Curve::new(vec![(0.20, 1.0), (0.50, 2.0)]),
            log_base: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BonusParams {
    pub upset: UpsetBonus,
    pub comeback: ComebackBonus,
    pub volatility: VolatilityBonus,
    pub overtime: OvertimeBonus,
    pub close_game: CloseGameBonus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpsetBonus {
    /// Leading share of the samples that defines the early favorite
    pub early_fraction: f64,
    pub favorite_threshold: f64,
    /// Early favorite's probability → bonus
    pub magnitude: Curve,
}

impl Default for UpsetBonus {
    fn default() -> Self {
        UpsetBonus {
            early_fraction: 0.10,
            favorite_threshold: 0.55,
            magnitude: Curve::new(vec![(0.55, 0.0), (0.75, 0.8)]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComebackBonus {
    /// A side at or beyond this probability that later falls behind counts as blown
    pub extreme: f64,
    /// Distance of the blown lead from 0.5 → bonus
    pub magnitude: Curve,
}

impl Default for ComebackBonus {
    fn default() -> Self {
        ComebackBonus {
            extreme: 0.85,
            magnitude: Curve::new(vec![(0.35, 0.0), (0.40, 0.5), (0.45, 1.2), (0.50, 2.0)]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityBonus {
    pub large_swing: f64,
    pub massive_swing: f64,
    pub extreme_low: f64,
    pub extreme_high: f64,
    pub large_swing_count: usize,
    pub large_bonus: f64,
    pub massive_bonus: f64,
    pub extreme_bonus: f64,
}

impl Default for VolatilityBonus {
    fn default() -> Self {
        VolatilityBonus {
            large_swing: 0.18,
            massive_swing: 0.50,
            extreme_low: 0.10,
            extreme_high: 0.90,
            large_swing_count: 6,
            large_bonus: 1.0,
            massive_bonus: 1.5,
            extreme_bonus: 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvertimeBonus {
    pub base: f64,
    pub per_extra_period: f64,
}

impl Default for OvertimeBonus {
    fn default() -> Self {
        OvertimeBonus {
            base: 0.8,
            per_extra_period: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloseGameTier {
    pub max_margin: u32,
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseGameBonus {
    /// Ascending by `max_margin`; the first tier containing the margin applies
    pub tiers: Vec<CloseGameTier>,
    pub basketball_margin_multiplier: u32,
    /// Below this tension only `low_tension_factor` of the bonus is kept
    pub low_tension: f64,
    /// Full credit at or above this tension
    pub full_tension: f64,
    pub low_tension_factor: f64,
}

impl Default for CloseGameBonus {
    fn default() -> Self {
        CloseGameBonus {
            tiers: vec![
                CloseGameTier {
                    max_margin: 3,
                    bonus: 1.5,
                },
                CloseGameTier {
                    max_margin: 7,
                    bonus: 0.5,
                },
                CloseGameTier {
                    max_margin: 10,
                    bonus: 0.2,
                },
            ],
            basketball_margin_multiplier: 2,
            low_tension: 3.0,
            full_tension: 5.0,
            low_tension_factor: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginScore {
    pub max_margin: u32,
    pub score: f64,
}

/// Margin-only heuristic for games without a usable sample stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackParams {
    /// Ascending by `max_margin`; the first tier containing the margin applies
    pub margin_tiers: Vec<MarginScore>,
    /// Score for margins beyond every tier
    pub default_score: f64,
    pub overtime_bonus: f64,
}

impl Default for FallbackParams {
    fn default() -> Self {
        FallbackParams {
            margin_tiers: vec![
                MarginScore {
                    max_margin: 3,
                    score: 8.0,
                },
                MarginScore {
                    max_margin: 7,
                    score: 7.0,
                },
                MarginScore {
                    max_margin: 14,
                    score: 6.0,
                },
                MarginScore {
                    max_margin: 21,
                    score: 5.0,
                },
            ],
            default_score: 4.0,
            overtime_bonus: 1.0,
        }
    }
}

/// Raw score → 1–10 mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum Normalization {
    /// `1 + 9 / (1 + e^{-(raw - center) / scale})`
    Sigmoid { center: f64, scale: f64 },
    PiecewiseLinear { points: Curve },
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization::Sigmoid {
            center: 5.0,
            scale: 2.5,
        }
    }
}

/// Optional post-processing of the raw score by decision lateness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum DecisionAdjustment {
    #[default]
    None,
    /// `raw · lateness^exponent`
    Multiplicative { exponent: f64 },
    /// `(1 − weight) · raw + weight · 10 · lateness`
    Blend { weight: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPointParams {
    pub band: Band,
    pub adjustment: DecisionAdjustment,
}

impl Default for DecisionPointParams {
    fn default() -> Self {
        DecisionPointParams {
            band: Band {
                low: 0.25,
                high: 0.75,
            },
            adjustment: DecisionAdjustment::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierCutoffs {
    pub must_watch: f64,
    pub recommended: f64,
}

impl TierCutoffs {
    /// Highest band first.
    pub fn classify(&self, normalized: f64) -> Tier {
        if normalized >= self.must_watch {
            Tier::MustWatch
        } else if normalized >= self.recommended {
            Tier::Recommended
        } else {
            Tier::Skip
        }
    }

    fn validate(&self, scope: &str) -> Result<(), ConfigError> {
        let ordered = self.must_watch <= 10.0
            && self.must_watch > self.recommended
            && self.recommended > 0.0;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::InvalidTiers {
                scope: scope.to_string(),
                must_watch: self.must_watch,
                recommended: self.recommended,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub default: TierCutoffs,
    pub per_sport: BTreeMap<Sport, TierCutoffs>,
}

impl Default for TierConfig {
    fn default() -> Self {
        let mut per_sport = BTreeMap::new();
        // Dense basketball feeds saturate drama earlier, so its bands sit lower.
        per_sport.insert(
            Sport::Nba,
            TierCutoffs {
                must_watch: 7.5,
                recommended: 5.5,
            },
        );
        TierConfig {
            default: TierCutoffs {
                must_watch: 8.0,
                recommended: 6.0,
            },
            per_sport,
        }
    }
}

impl TierConfig {
    pub fn cutoffs_for(&self, sport: Sport) -> &TierCutoffs {
        self.per_sport.get(&sport).unwrap_or(&self.default)
    }
}

// ── Validated config ─────────────────────────────────────────────────────────

/// Immutable, validated algorithm configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmConfig {
    version: AlgorithmVersion,
    params: AlgorithmParams,
}

#[derive(Deserialize)]
struct ConfigFile {
    version: AlgorithmVersion,
    #[serde(default)]
    params: Option<serde_json::Value>,
}

impl AlgorithmConfig {
    /// Built-in preset. Presets are covered by `all_presets_validate`.
    pub fn for_version(version: AlgorithmVersion) -> Self {
        AlgorithmConfig {
            version,
            params: version.params(),
        }
    }

    pub fn new(version: AlgorithmVersion, params: AlgorithmParams) -> Result<Self, ConfigError> {
        validate_params(&params)?;
        Ok(AlgorithmConfig { version, params })
    }

    /// Parse `{"version": "v3", "params": {...}}`. `params` is laid over the
    /// version preset, so anything it leaves out keeps the preset's value and
    /// the version's strategies stay selected unless overridden explicitly.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(raw)?;
        let params = match file.params {
            None => file.version.params(),
            Some(overrides) => {
                let mut merged = serde_json::to_value(file.version.params())?;
                merge_json(&mut merged, overrides);
                serde_json::from_value(merged)?
            }
        };
        Self::new(file.version, params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn version(&self) -> AlgorithmVersion {
        self.version
    }

    pub fn params(&self) -> &AlgorithmParams {
        &self.params
    }
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self::for_version(AlgorithmVersion::default())
    }
}

/// Tag fields of the strategy enums (`Normalization`, `DecisionAdjustment`).
const STRATEGY_TAGS: [&str; 2] = ["strategy", "method"];

/// Recursively overlay `overrides` onto `base`. Objects merge key by key;
/// anything else (numbers, arrays such as curves) replaces the base value.
/// An object naming a different strategy replaces the preset's one whole.
fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides))
            if !switches_strategy(&*base, &overrides) =>
        {
            for (key, value) in overrides {
                match base.entry(key) {
                    serde_json::map::Entry::Occupied(mut slot) => merge_json(slot.get_mut(), value),
                    serde_json::map::Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn switches_strategy(
    base: &serde_json::Map<String, serde_json::Value>,
    overrides: &serde_json::Map<String, serde_json::Value>,
) -> bool {
    STRATEGY_TAGS
        .iter()
        .any(|tag| matches!(overrides.get(*tag), Some(v) if base.get(*tag) != Some(v)))
}

fn check_range(name: &str, value: f64, lo: f64, hi: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("{} is outside [{}, {}]", value, lo, hi)))
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("{} must be positive", value)))
    }
}

fn validate_params(p: &AlgorithmParams) -> Result<(), ConfigError> {
    let w = &p.weights;
    let sum = w.tension + w.drama + w.finish;
    if w.tension < 0.0
        || w.drama < 0.0
        || w.finish < 0.0
        || !sum.is_finite()
        || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE
    {
        return Err(ConfigError::InvalidWeights { sum });
    }

    let t = &p.thresholds;
    if t.min_data_points < 2 {
        return Err(ConfigError::invalid("thresholds.min_data_points", "must be at least 2"));
    }
    check_range("thresholds.decisive_epsilon", t.decisive_epsilon, 0.0, 0.5)?;
    check_positive("thresholds.bounce_threshold", t.bounce_threshold)?;

    let tn = &p.tension;
    check_range("tension.recency_weight", tn.recency_weight, 0.0, 10.0)?;
    check_positive("tension.mean_recency_weight", tn.mean_recency_weight)?;
    check_positive("tension.concave_exponent", tn.concave_exponent)?;
    check_range("tension.comeback_lateness_base", tn.comeback_lateness_base, 0.0, 1.0)?;
    tn.comeback_curve.validate("tension.comeback_curve")?;

    let d = &p.drama;
    check_range("drama.leverage_floor", d.leverage_floor, 0.0, 0.25)?;
    check_positive("drama.swing_multiplier", d.swing_multiplier)?;
    check_range("drama.recency_weight", d.recency_weight, 0.0, 10.0)?;
    check_positive("drama.log_base", d.log_base)?;
    if d.lead_change_tiers.windows(2).any(|w| w[1].min_changes <= w[0].min_changes) {
        return Err(ConfigError::invalid(
            "drama.lead_change_tiers",
            "min_changes must be strictly increasing",
        ));
    }

    let f = &p.finish;
    if f.final_window < 2 || f.late_window < 2 || f.min_volatility_window < 2 {
        return Err(ConfigError::invalid("finish", "windows must hold at least 2 samples"));
    }
    check_positive("finish.closeness_exponent", f.closeness_exponent)?;
    check_range("finish.volatility_fraction", f.volatility_fraction, 0.0, 1.0)?;
    check_positive("finish.log_base", f.log_base)?;
    f.competitive_band.validate("finish.competitive_band")?;
    f.walkoff_curve.validate("finish.walkoff_curve")?;
    f.late_curve.validate("finish.late_curve")?;

    let b = &p.bonuses;
    check_range("bonuses.upset.early_fraction", b.upset.early_fraction, 0.0, 1.0)?;
    check_range("bonuses.upset.favorite_threshold", b.upset.favorite_threshold, 0.5, 1.0)?;
    b.upset.magnitude.validate("bonuses.upset.magnitude")?;
    check_range("bonuses.comeback.extreme", b.comeback.extreme, 0.5, 1.0)?;
    b.comeback.magnitude.validate("bonuses.comeback.magnitude")?;
    check_range("bonuses.volatility.extreme_low", b.volatility.extreme_low, 0.0, 0.5)?;
    check_range("bonuses.volatility.extreme_high", b.volatility.extreme_high, 0.5, 1.0)?;
    let cg = &b.close_game;
    if cg.tiers.windows(2).any(|w| w[1].max_margin <= w[0].max_margin) {
        return Err(ConfigError::invalid(
            "bonuses.close_game.tiers",
            "max_margin must be strictly increasing",
        ));
    }
    if cg.full_tension < cg.low_tension {
        return Err(ConfigError::invalid(
            "bonuses.close_game",
            "full_tension must not be below low_tension",
        ));
    }
    check_range("bonuses.close_game.low_tension_factor", cg.low_tension_factor, 0.0, 1.0)?;

    match &p.normalization {
        Normalization::Sigmoid { center, scale } => {
            check_range("normalization.center", *center, f64::MIN, f64::MAX)?;
            check_positive("normalization.scale", *scale)?;
        }
        Normalization::PiecewiseLinear { points } => {
            points.validate("normalization.points")?;
            if points.points().windows(2).any(|w| w[1].1 < w[0].1) {
                return Err(ConfigError::invalid(
                    "normalization.points",
                    "normalized values must not decrease",
                ));
            }
        }
    }

    p.decision_point.band.validate("decision_point.band")?;
    match p.decision_point.adjustment {
        DecisionAdjustment::None => {}
        DecisionAdjustment::Multiplicative { exponent } => {
            check_positive("decision_point.adjustment.exponent", exponent)?;
        }
        DecisionAdjustment::Blend { weight } => {
            check_range("decision_point.adjustment.weight", weight, 0.0, 1.0)?;
        }
    }

    let fb = &p.fallback;
    if fb.margin_tiers.windows(2).any(|w| w[1].max_margin <= w[0].max_margin) {
        return Err(ConfigError::invalid(
            "fallback.margin_tiers",
            "max_margin must be strictly increasing",
        ));
    }
    check_range("fallback.default_score", fb.default_score, 1.0, 10.0)?;
    check_range("fallback.overtime_bonus", fb.overtime_bonus, 0.0, 9.0)?;

    p.tiers.default.validate("default")?;
    for (sport, cutoffs) in &p.tiers.per_sport {
        cutoffs.validate(&format!("{:?}", sport))?;
    }
    Ok(())
}
