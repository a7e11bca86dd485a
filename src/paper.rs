//! Papers: combination bets of one selection from each of several distinct fixtures.
//!
//! Candidates are first prepared per fixture ([prepare_candidates]), then assembled into papers of the
//! requested sizes either greedily ([greedy]) or by solving a binary selection problem per size
//! ([exact]). The resulting papers are filtered and ranked by [filter].

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

use crate::error::{ConfigError, Diagnostic};
use crate::paper::metrics::PaperMetrics;
use crate::paper::solver::BinarySolver;
use crate::selection::Selection;

pub mod exact;
pub mod filter;
pub mod greedy;
pub mod metrics;
pub mod solver;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Greedy,
    Exact,
}

/// How the greedy builder ranks a fixture's candidates when choosing a leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    #[default]
    Efficiency,
    Edge,
    Probability,
}
impl SelectionStrategy {
    pub fn key(&self, selection: &Selection) -> f64 {
        match self {
            SelectionStrategy::Efficiency => selection.efficiency(),
            SelectionStrategy::Edge => selection.edge,
            SelectionStrategy::Probability => selection.probability,
        }
    }
}

/// Weights of the efficiency composite. Only their proportions matter; they are renormalised to sum
/// to 1 before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyWeights {
    pub probability: f64,
    pub edge: f64,
    pub value: f64,
}
impl EfficiencyWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [self.probability, self.edge, self.value];
        if weights.iter().any(|weight| !weight.is_finite() || *weight < 0.0) || weights.iter().sum::<f64>() == 0.0 {
            return Err(ConfigError::InvalidWeights {
                probability: self.probability,
                edge: self.edge,
                value: self.value,
            });
        }
        Ok(())
    }

    pub fn normalised(&self) -> Result<Self, ConfigError> {
        self.validate()?;
        let sum = self.probability + self.edge + self.value;
        Ok(Self {
            probability: self.probability / sum,
            edge: self.edge / sum,
            value: self.value / sum,
        })
    }

    /// `w_p·probability + w_e·edge + w_v·(probability·odds − 1)`.
    pub fn score(&self, probability: f64, edge: f64, odds: f64) -> f64 {
        self.probability * probability + self.edge * edge + self.value * (probability * odds - 1.0)
    }
}

impl Default for EfficiencyWeights {
    fn default() -> Self {
        Self {
            probability: 0.5,
            edge: 0.3,
            value: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub min_edge: f64,
    pub min_probability: f64,
    pub min_odds: Option<f64>,
    pub max_odds: Option<f64>,
    /// Candidates kept per fixture.
    pub top_k: usize,
    pub weights: EfficiencyWeights,
}
impl CandidateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        for (name, bound) in [("min odds", self.min_odds), ("max odds", self.max_odds)] {
            if let Some(value) = bound {
                if !(value.is_finite() && value > 0.0) {
                    return Err(ConfigError::NonPositiveOddsBound { name, value });
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_odds, self.max_odds) {
            if min > max {
                return Err(ConfigError::EmptyOddsBand { min, max });
            }
        }
        Ok(())
    }
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            min_edge: 0.05,
            min_probability: 0.10,
            min_odds: None,
            max_odds: None,
            top_k: 5,
            weights: EfficiencyWeights::default(),
        }
    }
}

/// Scored candidates per fixture, each list in descending order of efficiency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    fixtures: BTreeMap<u64, Vec<Selection>>,
}
impl CandidatePool {
    /// Fixtures with at least one candidate, in ascending order of id.
    pub fn fixture_ids(&self) -> Vec<u64> {
        self.fixtures.keys().copied().collect()
    }

    pub fn get(&self, fixture_id: u64) -> &[Selection] {
        self.fixtures.get(&fixture_id).map_or(&[], Vec::as_slice)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Selection> {
        self.fixtures.values().flatten()
    }

    pub fn num_fixtures(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

/// Filters the selections by edge, probability and odds band, scores the survivors, and keeps the
/// `top_k` most efficient of each fixture.
pub fn prepare_candidates(
    selections: impl IntoIterator<Item = Selection>,
    config: &CandidateConfig,
) -> Result<CandidatePool, ConfigError> {
    config.validate()?;
    let weights = config.weights.normalised()?;
    let mut fixtures: BTreeMap<u64, Vec<Selection>> = BTreeMap::new();
    for selection in selections {
        let in_band = config.min_odds.map_or(true, |min| selection.odds >= min)
            && config.max_odds.map_or(true, |max| selection.odds <= max);
        if selection.edge >= config.min_edge && selection.probability >= config.min_probability && in_band {
            let efficiency_score = weights.score(selection.probability, selection.edge, selection.odds);
            fixtures
                .entry(selection.fixture_id)
                .or_default()
                .push(selection.with_efficiency(efficiency_score));
        }
    }
    for candidates in fixtures.values_mut() {
        candidates.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency()));
        candidates.truncate(config.top_k);
    }
    fixtures.retain(|_, candidates| !candidates.is_empty());
    debug!(
        "prepared {} candidates across {} fixtures",
        fixtures.values().map(Vec::len).sum::<usize>(),
        fixtures.len()
    );
    Ok(CandidatePool { fixtures })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paper {
    pub legs: Vec<Selection>,
    pub metrics: PaperMetrics,
}
impl Paper {
    pub fn new(legs: Vec<Selection>, weights: &EfficiencyWeights) -> Self {
        debug_assert!(
            {
                let mut fixture_ids = legs.iter().map(|leg| leg.fixture_id).collect::<Vec<_>>();
                fixture_ids.sort_unstable();
                fixture_ids.windows(2).all(|pair| pair[0] != pair[1])
            },
            "legs must come from distinct fixtures"
        );
        let metrics = PaperMetrics::compute(&legs, weights);
        Self { legs, metrics }
    }

    pub fn size(&self) -> usize {
        self.legs.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    pub sizes: Vec<usize>,
    pub strategy: Strategy,
    pub selection_strategy: SelectionStrategy,
    /// Greedy builder only.
    pub max_papers_per_size: usize,
    /// Exact builder only.
    pub max_combined_odds: Option<f64>,
    /// Exact builder only.
    pub min_combined_probability: Option<f64>,
    pub deadline_ms: Option<u64>,
}
impl PaperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sizes.is_empty() {
            return Err(ConfigError::NoPaperSizes);
        }
        if self.sizes.contains(&0) {
            return Err(ConfigError::ZeroPaperSize);
        }
        Ok(())
    }

    /// Validates the optional constraints of the exact builder. An invalid constraint is dropped
    /// rather than failing the generation.
    fn constraints(&self) -> (Option<f64>, Option<f64>, Vec<ConfigError>) {
        let mut errors = vec![];
        let max_combined_odds = self.max_combined_odds.filter(|&value| {
            let valid = value.is_finite() && value > 0.0;
            if !valid {
                errors.push(ConfigError::NonPositiveOddsBound {
                    name: "max combined odds",
                    value,
                });
            }
            valid
        });
        let min_combined_probability = self.min_combined_probability.filter(|&value| {
            let valid = value > 0.0 && value <= 1.0;
            if !valid {
                errors.push(ConfigError::OutOfRange {
                    name: "min combined probability",
                    value,
                    range: "(0, 1]".into(),
                });
            }
            valid
        });
        (max_combined_odds, min_combined_probability, errors)
    }

    /// The requested sizes in ascending order, without repeats.
    pub fn sorted_sizes(&self) -> Vec<usize> {
        let mut sizes = self.sizes.clone();
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            sizes: vec![2, 3],
            strategy: Strategy::default(),
            selection_strategy: SelectionStrategy::default(),
            max_papers_per_size: 5,
            max_combined_odds: None,
            min_combined_probability: None,
            deadline_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub size: usize,
    /// Fixture combinations (greedy) or optimisation problems (exact) attempted.
    pub attempted: u64,
    pub emitted: usize,
}
impl GenerationReport {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            attempted: 0,
            emitted: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Generation {
    pub papers: Vec<Paper>,
    pub reports: Vec<GenerationReport>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy)]
pub struct Deadline(Option<Instant>);
impl Deadline {
    pub fn after(millis: Option<u64>) -> Self {
        Self(millis.map(|millis| Instant::now() + Duration::from_millis(millis)))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn elapsed(&self) -> bool {
        self.0.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// Builds papers from the pool with the configured strategy. Invalid configuration yields no papers
/// and a diagnostic.
pub fn generate(
    pool: &CandidatePool,
    config: &PaperConfig,
    weights: &EfficiencyWeights,
    solver: &dyn BinarySolver,
) -> Generation {
    let weights = match config.validate().and_then(|_| weights.normalised()) {
        Ok(weights) => weights,
        Err(err) => {
            warn!("paper generation skipped: {err}");
            return Generation {
                diagnostics: vec![err.into()],
                ..Generation::default()
            };
        }
    };
    let deadline = Deadline::after(config.deadline_ms);
    let start_time = Instant::now();
    let generation = match config.strategy {
        Strategy::Greedy => greedy::build(pool, config, &weights, deadline),
        Strategy::Exact => {
            let (max_combined_odds, min_combined_probability, errors) = config.constraints();
            let mut generation = exact::build(
                pool,
                &exact::Constraints {
                    max_combined_odds,
                    min_combined_probability,
                },
                &config.sorted_sizes(),
                &weights,
                solver,
                deadline,
            );
            for err in errors {
                warn!("exact constraint dropped: {err}");
                generation.diagnostics.push(err.into());
            }
            generation
        }
    };
    debug!(
        "{} generated {} papers in {:?}",
        config.strategy,
        generation.papers.len(),
        start_time.elapsed()
    );
    generation
}

#[cfg(test)]
mod tests;
