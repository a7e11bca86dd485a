//! Batch driver. Each fixture is priced independently (in parallel): expected goals are estimated,
//! every model is run, value bets are detected against the fixture's odds and the models are merged
//! into a top-N list. The candidate model's value bets then feed the paper builder.

use std::time::Instant;

use chrono::NaiveDate;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{ExpectedGoals, Fixture, MatchRecord};
use crate::edge::find_value_bets;
use crate::error::{ConfigError, Diagnostic};
use crate::model::{compute_all, top_unique_selections, MarketProbabilitySet, ModelId, RankedSelection};
use crate::odds::OddsBook;
use crate::paper::filter::{self, PaperFilter};
use crate::paper::solver::{BinarySolver, BranchAndBound};
use crate::paper::{generate, prepare_candidates, CandidateConfig, GenerationReport, Paper, PaperConfig};
use crate::selection::Selection;
use crate::{edge, estimate, model};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub estimator: estimate::Config,
    pub model: model::Config,
    pub value: edge::Config,
    pub candidates: CandidateConfig,
    pub paper: PaperConfig,
    pub filter: PaperFilter,
    pub ranking: String,
    pub top_n: usize,
    /// The model whose value bets become paper candidates.
    pub candidate_model: ModelId,
    /// Goal covariance (λ3) by league name.
    pub covariance: FxHashMap<String, f64>,
    /// Covariance for leagues not listed in `covariance`. Without either, the bivariate model is
    /// not run.
    pub default_covariance: Option<f64>,
}
impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(err) = self.pricing_errors().into_iter().next() {
            return Err(err);
        }
        self.value.validate()?;
        self.candidates.validate()?;
        self.paper.validate()
    }

    /// Problems with the settings that shape per-fixture pricing, one per offending setting.
    fn pricing_errors(&self) -> Vec<ConfigError> {
        let top_n = if self.top_n == 0 {
            Err(ConfigError::OutOfRange {
                name: "top n",
                value: 0.0,
                range: "[1, ∞)".into(),
            })
        } else {
            Ok(())
        };
        let covariance = self
            .covariance
            .values()
            .chain(self.default_covariance.iter())
            .find(|value| !(value.is_finite() && **value >= 0.0))
            .map_or(Ok(()), |&value| {
                Err(ConfigError::OutOfRange {
                    name: "covariance",
                    value,
                    range: "[0, ∞)".into(),
                })
            });
        [
            self.estimator.validate(),
            self.model.simulation.validate(),
            self.model.grid.validate(),
            top_n,
            covariance,
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }

    pub fn covariance_for(&self, league: &str) -> Option<f64> {
        self.covariance.get(league).copied().or(self.default_covariance)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            estimator: estimate::Config::default(),
            model: model::Config::default(),
            value: edge::Config::default(),
            candidates: CandidateConfig::default(),
            paper: PaperConfig::default(),
            filter: PaperFilter::default(),
            ranking: "efficiency".into(),
            top_n: model::merge::DEFAULT_TOP_N,
            candidate_model: ModelId::IndependentPoisson,
            covariance: FxHashMap::default(),
            default_covariance: None,
        }
    }
}

/// Everything known about one fixture ahead of pricing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureJob {
    pub fixture: Fixture,
    #[serde(default)]
    pub home_history: Vec<MatchRecord>,
    #[serde(default)]
    pub away_history: Vec<MatchRecord>,
    /// Histories are considered strictly before this date; defaults to the fixture's date.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Supplied rates bypass estimation.
    #[serde(default)]
    pub expected_goals: Option<ExpectedGoals>,
    #[serde(default)]
    pub odds: OddsBook,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureOutcome {
    pub fixture: Fixture,
    pub expected_goals: ExpectedGoals,
    pub fallback: bool,
    pub probabilities: MarketProbabilitySet,
    /// The candidate model's value bets, in descending order of edge.
    pub value_bets: Vec<Selection>,
    pub top_selections: Vec<RankedSelection>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Output {
    pub fixtures: Vec<FixtureOutcome>,
    /// Filtered and ranked.
    pub papers: Vec<Paper>,
    pub reports: Vec<GenerationReport>,
    /// Batch-level diagnostics; per-fixture ones stay with their [FixtureOutcome].
    pub diagnostics: Vec<Diagnostic>,
}
impl Output {
    /// The value-bet feed: every fixture's value bets, fixtures in job order.
    pub fn value_bets(&self) -> impl Iterator<Item = &Selection> {
        self.fixtures.iter().flat_map(|outcome| outcome.value_bets.iter())
    }

    /// Every diagnostic raised during the run, per-fixture ones first.
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.fixtures
            .iter()
            .flat_map(|outcome| outcome.diagnostics.iter())
            .chain(self.diagnostics.iter())
    }
}

pub struct Engine {
    config: Config,
    solver: Box<dyn BinarySolver>,
}
impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            solver: Box::new(BranchAndBound),
        }
    }

    pub fn with_solver(mut self, solver: Box<dyn BinarySolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self, jobs: &[FixtureJob]) -> Output {
        let start_time = Instant::now();
        let mut diagnostics = vec![];
        for err in self.config.pricing_errors() {
            warn!("configuration: {err}");
            diagnostics.push(err.into());
        }
        let value_config = match self.config.value.validate() {
            Ok(()) => Some(&self.config.value),
            Err(err) => {
                warn!("value detection skipped: {err}");
                diagnostics.push(err.into());
                None
            }
        };

        let fixtures = jobs
            .par_iter()
            .map(|job| self.price(job, value_config))
            .collect::<Vec<_>>();

        let candidates = fixtures.iter().flat_map(|outcome| outcome.value_bets.iter().cloned());
        let (papers, reports) = match prepare_candidates(candidates, &self.config.candidates) {
            Ok(pool) => {
                let generation = generate(
                    &pool,
                    &self.config.paper,
                    &self.config.candidates.weights,
                    self.solver.as_ref(),
                );
                diagnostics.extend(generation.diagnostics);
                let mut papers = filter::apply(generation.papers, &self.config.filter);
                diagnostics.extend(filter::rank(&mut papers, &self.config.ranking));
                (papers, generation.reports)
            }
            Err(err) => {
                warn!("paper generation skipped: {err}");
                diagnostics.push(err.into());
                (vec![], vec![])
            }
        };

        info!(
            "priced {} fixtures, {} value bets, {} papers in {:?}",
            fixtures.len(),
            fixtures.iter().map(|outcome| outcome.value_bets.len()).sum::<usize>(),
            papers.len(),
            start_time.elapsed()
        );
        Output {
            fixtures,
            papers,
            reports,
            diagnostics,
        }
    }

    fn price(&self, job: &FixtureJob, value_config: Option<&edge::Config>) -> FixtureOutcome {
        let start_time = Instant::now();
        let fixture = &job.fixture;
        let mut diagnostics = vec![];

        let (expected_goals, fallback) = match job.expected_goals {
            Some(expected_goals) => (expected_goals, false),
            None => {
                let as_of = job.as_of.or(fixture.date);
                let estimate = estimate::estimate(&job.home_history, &job.away_history, as_of, &self.config.estimator);
                if estimate.fallback {
                    diagnostics.push(Diagnostic::FallbackRates { fixture_id: fixture.id });
                }
                (estimate.expected_goals, estimate.fallback)
            }
        };

        let covariance = self.config.covariance_for(&fixture.league);
        let (probabilities, model_diagnostics) =
            compute_all(fixture.id, &expected_goals, covariance, &self.config.model);
        diagnostics.extend(model_diagnostics);

        let value_bets = match (value_config, probabilities.get(self.config.candidate_model)) {
            _ if job.odds.is_empty() => {
                diagnostics.push(Diagnostic::NoOdds { fixture_id: fixture.id });
                vec![]
            }
            (Some(value_config), Some(candidate)) => find_value_bets(
                fixture,
                candidate,
                &job.odds,
                value_config.min_probability,
                value_config.min_edge,
            ),
            (Some(_), None) => {
                warn!(
                    "fixture {}: candidate model {} produced no probabilities",
                    fixture.id, self.config.candidate_model
                );
                vec![]
            }
            (None, _) => vec![],
        };

        let top_selections = top_unique_selections(&probabilities, self.config.top_n);
        debug!(
            "fixture {}: {expected_goals:?}, {} models, {} value bets in {:?}",
            fixture.id,
            probabilities.len(),
            value_bets.len(),
            start_time.elapsed()
        );
        FixtureOutcome {
            fixture: fixture.clone(),
            expected_goals,
            fallback,
            probabilities,
            value_bets,
            top_selections,
            diagnostics,
        }
    }
}

/// A complete batch: configuration and fixtures, as read from a job file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub config: Config,
    pub fixtures: Vec<FixtureJob>,
}
