//! Outcome probabilities for a fixture from its expected goals. Three substitutable models each
//! produce a score grid; every market on the [Concept::surface] is then gathered from that grid.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use thiserror::Error;
use tracing::{debug, warn};

use crate::concept::{to_concept, Btts, Concept, GoalBand, MatchResult, Total, LINES};
use crate::domain::{ExpectedGoals, Score};
use crate::error::{ConfigError, CovarianceError, Diagnostic};
use crate::linear::Matrix;
use crate::probs::rescale_partition;
use crate::scoregrid;

pub mod closed_form;
pub mod merge;
pub mod simulation;

pub use merge::{top_unique_selections, RankedSelection};

#[derive(
    Clone, Copy, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    Simulation,
    IndependentPoisson,
    BivariatePoisson,
}
impl ModelId {
    /// The prefix of raw outcome keys in this model's dialect.
    pub fn prefix(&self) -> &'static str {
        match self {
            ModelId::Simulation => "prob_",
            ModelId::IndependentPoisson => "poisson_",
            ModelId::BivariatePoisson => "bp_",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Highest goal count per side kept by the closed-form grids.
    pub max_goals: u8,
    /// Partitions summing to within this distance of the grid mass are left as they are.
    pub rescale_tolerance: f64,
}
impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rescale_tolerance.is_finite() && self.rescale_tolerance >= 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "rescale tolerance",
                value: self.rescale_tolerance,
                range: "[0, ∞)".into(),
            });
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_goals: 10,
            rescale_tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid expected goals {0:?}")]
    InvalidRates(ExpectedGoals),

    #[error("{0}")]
    Covariance(#[from] CovarianceError),

    #[error("{0}")]
    Config(#[from] ConfigError),
}

pub trait ProbabilityModel {
    fn id(&self) -> ModelId;

    fn compute(&self, expected_goals: &ExpectedGoals, max_goals: u8) -> Result<MarketProbabilities, ModelError>;
}

/// One model's probabilities for one fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketProbabilities {
    pub model: ModelId,
    pub markets: FxHashMap<Concept, f64>,
    pub scores: BTreeMap<Score, f64>,
    /// Score cells that could not be evaluated and were zeroed.
    pub failed_cells: usize,
}
impl MarketProbabilities {
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            markets: FxHashMap::default(),
            scores: BTreeMap::new(),
            failed_cells: 0,
        }
    }

    /// Builds the probabilities from raw outcome keys in any dialect. Unrecognised keys and values
    /// that are not probabilities are dropped.
    pub fn from_records<'a>(model: ModelId, records: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut probabilities = Self::new(model);
        for (key, prob) in records {
            if !(0.0..=1.0).contains(&prob) {
                continue;
            }
            match to_concept(key) {
                Some(Concept::Score(score)) => {
                    probabilities.scores.insert(score, prob);
                }
                Some(concept) => {
                    probabilities.markets.insert(concept, prob);
                }
                None => {
                    debug!("dropping unrecognised key '{key}'");
                }
            }
        }
        probabilities
    }

    /// Renders the probabilities as raw outcome keys in this model's dialect.
    pub fn to_records(&self) -> BTreeMap<String, f64> {
        self.iter()
            .map(|(concept, prob)| (concept.to_key(self.model), prob))
            .collect()
    }

    pub fn get(&self, concept: &Concept) -> Option<f64> {
        match concept {
            Concept::Score(score) => self.scores.get(score).copied(),
            _ => self.markets.get(concept).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Concept, f64)> + '_ {
        self.markets
            .iter()
            .map(|(&concept, &prob)| (concept, prob))
            .chain(self.scores.iter().map(|(&score, &prob)| (Concept::Score(score), prob)))
    }
}

impl Serialize for MarketProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MarketProbabilities", 3)?;
        state.serialize_field("model", &self.model)?;
        state.serialize_field("probabilities", &self.to_records())?;
        state.serialize_field("failed_cells", &self.failed_cells)?;
        state.end()
    }
}

/// The probabilities of every model that ran for a fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketProbabilitySet {
    entries: BTreeMap<ModelId, MarketProbabilities>,
}
impl MarketProbabilitySet {
    pub fn insert(&mut self, probabilities: MarketProbabilities) {
        self.entries.insert(probabilities.model, probabilities);
    }

    pub fn get(&self, model: ModelId) -> Option<&MarketProbabilities> {
        self.entries.get(&model)
    }

    pub fn models(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketProbabilities> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<MarketProbabilities> for MarketProbabilitySet {
    fn from_iter<T: IntoIterator<Item = MarketProbabilities>>(iter: T) -> Self {
        let mut set = Self::default();
        for probabilities in iter {
            set.insert(probabilities);
        }
        set
    }
}

/// Gathers every concept on the surface from the grid, dividing each sum by `total`.
pub fn derive_markets(scoregrid: &Matrix, total: f64) -> FxHashMap<Concept, f64> {
    Concept::surface()
        .into_iter()
        .map(|concept| (concept, scoregrid::gather(&concept, scoregrid) / total))
        .collect()
}

/// The mutually exclusive, exhaustive groups on the market surface.
pub fn partitions() -> Vec<Vec<Concept>> {
    let mut partitions = vec![
        MatchResult::iter().map(Concept::Result).collect(),
        Btts::iter().map(Concept::Btts).collect(),
        GoalBand::iter().map(Concept::GoalBand).collect(),
        MatchResult::iter()
            .flat_map(|result| Btts::iter().map(move |btts| Concept::ResultAndBtts(result, btts)))
            .collect::<Vec<_>>(),
    ];
    for line in LINES {
        let sides = [Total::over(line), Total::under(line)];
        partitions.push(sides.into_iter().map(Concept::Total).collect());
        partitions.push(
            MatchResult::iter()
                .flat_map(|result| sides.into_iter().map(move |total| Concept::ResultAndTotal(result, total)))
                .collect(),
        );
        partitions.push(
            Btts::iter()
                .flat_map(|btts| sides.into_iter().map(move |total| Concept::BttsAndTotal(btts, total)))
                .collect(),
        );
        partitions.push(
            MatchResult::iter()
                .flat_map(|result| {
                    Btts::iter().flat_map(move |btts| {
                        sides
                            .into_iter()
                            .map(move |total| Concept::ResultAndBttsAndTotal(result, btts, total))
                    })
                })
                .collect(),
        );
    }
    partitions
}

/// Rescales each partition whose sum strays from the grid `mass` by more than `tolerance`.
pub fn rescale_partitions(markets: &mut FxHashMap<Concept, f64>, mass: f64, tolerance: f64) -> usize {
    let mut rescaled = 0;
    for partition in partitions() {
        let mut probs = partition
            .iter()
            .map(|concept| markets.get(concept).copied().unwrap_or(0.0))
            .collect::<Vec<_>>();
        if rescale_partition(&mut probs, mass, tolerance) {
            rescaled += 1;
            for (concept, prob) in partition.into_iter().zip(probs) {
                markets.insert(concept, prob);
            }
        }
    }
    rescaled
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: simulation::Config,
    pub grid: GridConfig,
}

/// Runs the three models for one fixture in parallel. The bivariate model runs only when a
/// covariance is supplied. Failures are scoped to the model that raised them.
pub fn compute_all(
    fixture_id: u64,
    expected_goals: &ExpectedGoals,
    covariance: Option<f64>,
    config: &Config,
) -> (MarketProbabilitySet, Vec<Diagnostic>) {
    let max_goals = config.grid.max_goals;
    let simulation = simulation::Simulation::from(config.simulation.clone());
    let independent = closed_form::IndependentPoisson::new(config.grid.rescale_tolerance);
    let bivariate = covariance.map(|common_rate| {
        closed_form::BivariatePoisson::new(common_rate, config.grid.rescale_tolerance)
    });

    let (simulated, (independent, bivariate)) = rayon::join(
        || simulation.compute(expected_goals, max_goals),
        || {
            rayon::join(
                || independent.compute(expected_goals, max_goals),
                || bivariate.map(|model| model.compute(expected_goals, max_goals)),
            )
        },
    );

    let mut set = MarketProbabilitySet::default();
    let mut diagnostics = vec![];
    let outcomes = [
        (ModelId::Simulation, Some(simulated)),
        (ModelId::IndependentPoisson, Some(independent)),
        (ModelId::BivariatePoisson, bivariate),
    ];
    for (model, outcome) in outcomes {
        match outcome {
            Some(Ok(probabilities)) => {
                if probabilities.failed_cells > 0 {
                    diagnostics.push(Diagnostic::NumericalFailure {
                        fixture_id,
                        model,
                        cells: probabilities.failed_cells,
                    });
                }
                set.insert(probabilities);
            }
            Some(Err(err)) => {
                warn!("fixture {fixture_id}: {model} skipped: {err}");
                diagnostics.push(Diagnostic::ModelSkipped {
                    fixture_id,
                    model,
                    reason: err.to_string(),
                });
            }
            None => {
                debug!("fixture {fixture_id}: no covariance, {model} not run");
            }
        }
    }
    (set, diagnostics)
}

#[cfg(test)]
mod tests;
