//! Monte Carlo model: paired Poisson draws binned into an empirical score grid.

use serde::{Deserialize, Serialize};
use tinyrand::{Seeded, StdRand};
use tracing::debug;

use crate::domain::{ExpectedGoals, Score};
use crate::error::ConfigError;
use crate::model::{derive_markets, MarketProbabilities, ModelError, ModelId, ProbabilityModel};
use crate::{poisson, scoregrid};

pub const MIN_SIMULATIONS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulations: u32,
    pub seed: u64,
    /// Exact scores beyond this many goals per side are folded into the ceiling.
    pub plot_ceiling: u8,
}
impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulations < MIN_SIMULATIONS {
            return Err(ConfigError::TooFewSimulations(self.simulations, MIN_SIMULATIONS));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulations: 80_000,
            seed: 42,
            plot_ceiling: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: Config,
}

impl From<Config> for Simulation {
    fn from(config: Config) -> Self {
        Self { config }
    }
}

impl Simulation {
    /// Draws the configured number of paired scores. The same rates and seed always produce the
    /// same draws.
    pub fn draw(&self, expected_goals: &ExpectedGoals) -> Vec<Score> {
        let mut rand = StdRand::seed(self.config.seed);
        (0..self.config.simulations)
            .map(|_| {
                let home = poisson::sample(expected_goals.home, &mut rand);
                let away = poisson::sample(expected_goals.away, &mut rand);
                Score::new(home, away)
            })
            .collect()
    }
}

impl ProbabilityModel for Simulation {
    fn id(&self) -> ModelId {
        ModelId::Simulation
    }

    /// Draws are not truncated, so `max_goals` does not apply.
    fn compute(&self, expected_goals: &ExpectedGoals, _max_goals: u8) -> Result<MarketProbabilities, ModelError> {
        self.config.validate()?;
        if !expected_goals.is_valid() {
            return Err(ModelError::InvalidRates(*expected_goals));
        }
        let samples = self.draw(expected_goals);
        let counts = scoregrid::from_samples(&samples);
        let total = samples.len() as f64;
        let markets = derive_markets(&counts, total);

        let (home_sum, away_sum) = scoregrid::home_away_expectations(&counts);
        debug!(
            "simulated {} draws, sample means ({:.3}, {:.3})",
            samples.len(),
            home_sum / total,
            away_sum / total
        );

        let scores = scoregrid::capped(&counts, self.config.plot_ceiling as usize)
            .cells()
            .map(|(home_goals, away_goals, count)| {
                (Score::new(home_goals as u8, away_goals as u8), count / total)
            })
            .collect();
        Ok(MarketProbabilities {
            model: self.id(),
            markets,
            scores,
            failed_cells: 0,
        })
    }
}
