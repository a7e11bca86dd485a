//! The exact models, evaluated over a score grid truncated at `max_goals` per side.

use tracing::debug;

use crate::domain::{ExpectedGoals, Score};
use crate::error::CovarianceError;
use crate::linear::Matrix;
use crate::model::{derive_markets, rescale_partitions, MarketProbabilities, ModelError, ModelId, ProbabilityModel};
use crate::probs::SliceExt;
use crate::scoregrid;

#[derive(Debug, Clone)]
pub struct IndependentPoisson {
    rescale_tolerance: f64,
}
impl IndependentPoisson {
    pub fn new(rescale_tolerance: f64) -> Self {
        Self { rescale_tolerance }
    }
}

impl ProbabilityModel for IndependentPoisson {
    fn id(&self) -> ModelId {
        ModelId::IndependentPoisson
    }

    fn compute(&self, expected_goals: &ExpectedGoals, max_goals: u8) -> Result<MarketProbabilities, ModelError> {
        if !expected_goals.is_valid() {
            return Err(ModelError::InvalidRates(*expected_goals));
        }
        let mut scoregrid = allocate(max_goals);
        scoregrid::from_univariate_poisson(expected_goals.home, expected_goals.away, &mut scoregrid);
        Ok(from_scoregrid(self.id(), &scoregrid, self.rescale_tolerance, 0))
    }
}

/// Goals correlated through a shared rate `common_rate`, which must lie in `[0, min(home, away)]`.
#[derive(Debug, Clone)]
pub struct BivariatePoisson {
    common_rate: f64,
    rescale_tolerance: f64,
}
impl BivariatePoisson {
    pub fn new(common_rate: f64, rescale_tolerance: f64) -> Self {
        Self {
            common_rate,
            rescale_tolerance,
        }
    }

    pub fn validate(&self, expected_goals: &ExpectedGoals) -> Result<(), CovarianceError> {
        let upper = f64::min(expected_goals.home, expected_goals.away);
        if !(self.common_rate.is_finite() && self.common_rate >= 0.0 && self.common_rate <= upper) {
            return Err(CovarianceError {
                lambda_3: self.common_rate,
                upper,
                home_rate: expected_goals.home,
                away_rate: expected_goals.away,
            });
        }
        Ok(())
    }
}

impl ProbabilityModel for BivariatePoisson {
    fn id(&self) -> ModelId {
        ModelId::BivariatePoisson
    }

    fn compute(&self, expected_goals: &ExpectedGoals, max_goals: u8) -> Result<MarketProbabilities, ModelError> {
        if !expected_goals.is_valid() {
            return Err(ModelError::InvalidRates(*expected_goals));
        }
        self.validate(expected_goals)?;
        let mut scoregrid = allocate(max_goals);
        let failed_cells = scoregrid::from_bivariate_poisson(
            expected_goals.home,
            expected_goals.away,
            self.common_rate,
            &mut scoregrid,
        );
        Ok(from_scoregrid(self.id(), &scoregrid, self.rescale_tolerance, failed_cells))
    }
}

fn allocate(max_goals: u8) -> Matrix {
    let dim = max_goals as usize + 1;
    Matrix::allocate(dim, dim)
}

fn from_scoregrid(model: ModelId, scoregrid: &Matrix, rescale_tolerance: f64, failed_cells: usize) -> MarketProbabilities {
    let mass = scoregrid.flatten().sum();
    let mut markets = derive_markets(scoregrid, 1.0);
    let rescaled = rescale_partitions(&mut markets, mass, rescale_tolerance);
    let (home_expectation, away_expectation) = scoregrid::home_away_expectations(scoregrid);
    debug!(
        "{model}: mass {mass:.6}, rescaled partitions {rescaled}, expectations ({home_expectation:.3}, {away_expectation:.3})"
    );

    let scores = scoregrid
        .cells()
        .map(|(home_goals, away_goals, prob)| (Score::new(home_goals as u8, away_goals as u8), prob))
        .collect();
    MarketProbabilities {
        model,
        markets,
        scores,
        failed_cells,
    }
}
