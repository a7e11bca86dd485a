//! Configuration errors and per-unit diagnostics. Nothing in this crate fails a whole batch; problems
//! scoped to one fixture, model or paper are reported as a [Diagnostic] alongside the results.

use serde::Serialize;
use thiserror::Error;

use crate::model::ModelId;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ConfigError {
    #[error("{name} ({value}) outside of allowable range {range}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: String,
    },

    #[error("simulation count {0} is below the minimum of {1}")]
    TooFewSimulations(u32, u32),

    #[error("efficiency weights must be finite, non-negative and not all zero, got ({probability}, {edge}, {value})")]
    InvalidWeights { probability: f64, edge: f64, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositiveOddsBound { name: &'static str, value: f64 },

    #[error("odds band is empty: min {min} > max {max}")]
    EmptyOddsBand { min: f64, max: f64 },

    #[error("at least one paper size must be requested")]
    NoPaperSizes,

    #[error("paper sizes must be at least 1")]
    ZeroPaperSize,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("covariance {lambda_3} outside of [0, {upper}] for rates ({home_rate}, {away_rate})")]
pub struct CovarianceError {
    pub lambda_3: f64,
    pub upper: f64,
    pub home_rate: f64,
    pub away_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum SolverError {
    #[error("malformed problem: {0}")]
    Malformed(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum Diagnostic {
    #[error("fixture {fixture_id}: insufficient history, using fallback rates")]
    FallbackRates { fixture_id: u64 },

    #[error("fixture {fixture_id}: {model} skipped: {reason}")]
    ModelSkipped {
        fixture_id: u64,
        model: ModelId,
        reason: String,
    },

    #[error("fixture {fixture_id}: {cells} score cells from {model} failed numerically and were zeroed")]
    NumericalFailure {
        fixture_id: u64,
        model: ModelId,
        cells: usize,
    },

    #[error("fixture {fixture_id}: no odds available")]
    NoOdds { fixture_id: u64 },

    #[error("invalid configuration ignored: {0}")]
    Config(ConfigError),

    #[error("no feasible paper of size {size}")]
    Infeasible { size: usize },

    #[error("paper size {size} skipped: deadline elapsed")]
    DeadlineElapsed { size: usize },

    #[error("solver failure for paper size {size}: {reason}")]
    SolverFailure { size: usize, reason: String },

    #[error("unknown ranking strategy '{0}', order left unchanged")]
    UnknownRanking(String),
}

impl From<ConfigError> for Diagnostic {
    fn from(error: ConfigError) -> Self {
        Diagnostic::Config(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_display() {
        let diagnostic = Diagnostic::ModelSkipped {
            fixture_id: 4,
            model: ModelId::BivariatePoisson,
            reason: "bad".into(),
        };
        assert_eq!("fixture 4: bivariate_poisson skipped: bad", diagnostic.to_string());
        assert_eq!(
            "invalid configuration ignored: at least one paper size must be requested",
            Diagnostic::from(ConfigError::NoPaperSizes).to_string()
        );
    }
}
