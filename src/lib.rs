//! Watchability scoring for completed NFL, college football and NBA games.
//!
//! The library is a pure function of a game's win-probability samples, its
//! final-state context and an immutable [`AlgorithmConfig`]. The binary wraps
//! it for batch scoring and labeled benchmark runs.

pub mod batch;
pub mod benchmark;
pub mod config;
pub mod excitement;
pub mod models;

pub use excitement::{score_game, try_score_game, AlgorithmConfig, AlgorithmVersion, ScoreError};
pub use models::{ExcitementResult, GameContext, GameExcitement, ProbabilitySample, Sport, Tier};
