//! Exact assembly: for each requested size, the paper of maximal summed efficiency, found by a
//! [BinarySolver]. Sizes are solved independently and in parallel. Unlike the greedy builder, papers
//! of different sizes may share selections.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::Diagnostic;
use crate::paper::solver::{BinarySolver, Item, Problem};
use crate::paper::{CandidatePool, Deadline, EfficiencyWeights, Generation, GenerationReport, Paper};
use crate::selection::Selection;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub max_combined_odds: Option<f64>,
    pub min_combined_probability: Option<f64>,
}

enum Outcome {
    Solved(Paper),
    Infeasible,
    DeadlineElapsed,
    Failed(String),
}

pub fn build(
    pool: &CandidatePool,
    constraints: &Constraints,
    sizes: &[usize],
    weights: &EfficiencyWeights,
    solver: &dyn BinarySolver,
    deadline: Deadline,
) -> Generation {
    let (candidates, items) = flatten(pool);
    debug!("{} candidates eligible for {} solver", candidates.len(), solver.name());

    let outcomes = sizes
        .par_iter()
        .map(|&size| {
            if deadline.elapsed() {
                return Outcome::DeadlineElapsed;
            }
            let problem = Problem {
                items: items.clone(),
                size,
                max_log_odds: constraints.max_combined_odds.map(f64::ln),
                min_log_probability: constraints.min_combined_probability.map(f64::ln),
            };
            match solver.solve_binary_knapsack_with_exclusion_groups(&problem) {
                Ok(Some(mut chosen)) => {
                    chosen.sort_unstable();
                    let legs = chosen.into_iter().map(|index| candidates[index].clone()).collect();
                    Outcome::Solved(Paper::new(legs, weights))
                }
                Ok(None) => Outcome::Infeasible,
                Err(err) => Outcome::Failed(err.to_string()),
            }
        })
        .collect::<Vec<_>>();

    let mut generation = Generation::default();
    for (&size, outcome) in sizes.iter().zip(outcomes) {
        let mut report = GenerationReport::new(size);
        match outcome {
            Outcome::Solved(paper) => {
                report.attempted = 1;
                report.emitted = 1;
                generation.papers.push(paper);
            }
            Outcome::Infeasible => {
                report.attempted = 1;
                debug!("no feasible paper of size {size}");
                generation.diagnostics.push(Diagnostic::Infeasible { size });
            }
            Outcome::DeadlineElapsed => {
                generation.diagnostics.push(Diagnostic::DeadlineElapsed { size });
            }
            Outcome::Failed(reason) => {
                report.attempted = 1;
                warn!("solver failed for size {size}: {reason}");
                generation.diagnostics.push(Diagnostic::SolverFailure { size, reason });
            }
        }
        generation.reports.push(report);
    }
    generation
}

/// Pools every candidate with well-defined logarithms and efficiency, grouped by fixture.
fn flatten(pool: &CandidatePool) -> (Vec<&Selection>, Vec<Item>) {
    pool.candidates()
        .filter_map(|candidate| {
            let item = Item {
                value: candidate.efficiency(),
                group: candidate.fixture_id,
                log_odds: candidate.odds.ln(),
                log_probability: candidate.probability.ln(),
            };
            let valid = item.value.is_finite() && item.log_odds.is_finite() && item.log_probability.is_finite();
            valid.then_some((candidate, item))
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comb::Combinations;
    use crate::domain::Fixture;
    use crate::paper::solver::{BranchAndBound, Exhaustive};
    use crate::paper::{prepare_candidates, CandidateConfig};
    use assert_float_eq::*;

    fn selection(fixture_id: u64, label: &str, probability: f64, odds: f64) -> Selection {
        let fixture = Fixture {
            id: fixture_id,
            ..Fixture::default()
        };
        Selection::new(&fixture, "Match Winner", label, probability, odds)
    }

    fn pool() -> CandidatePool {
        prepare_candidates(
            vec![
                selection(1, "Home", 0.55, 2.2),
                selection(2, "Home", 0.35, 3.6),
                selection(3, "Away", 0.62, 1.9),
                selection(4, "Draw", 0.28, 4.1),
            ],
            &CandidateConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn optimum_matches_brute_force() {
        let pool = pool();
        let candidates = pool.candidates().collect::<Vec<_>>();
        assert_eq!(4, candidates.len());
        let best = Combinations::new(4, 2)
            .map(|pair| pair.iter().map(|&index| candidates[index].efficiency()).sum::<f64>())
            .fold(f64::NEG_INFINITY, f64::max);

        for solver in [&BranchAndBound as &dyn BinarySolver, &Exhaustive] {
            let generation = build(
                &pool,
                &Constraints::default(),
                &[2],
                &EfficiencyWeights::default(),
                solver,
                Deadline::none(),
            );
            assert_eq!(1, generation.papers.len());
            let summed = generation.papers[0].legs.iter().map(Selection::efficiency).sum::<f64>();
            assert_float_absolute_eq!(best, summed, 1e-12);
        }
    }

    #[test]
    fn one_paper_per_size() {
        let generation = build(
            &pool(),
            &Constraints::default(),
            &[1, 2, 3, 4, 5],
            &EfficiencyWeights::default(),
            &BranchAndBound,
            Deadline::none(),
        );
        let sizes = generation.papers.iter().map(Paper::size).collect::<Vec<_>>();
        assert_eq!(vec![1, 2, 3, 4], sizes);
        assert_eq!(vec![Diagnostic::Infeasible { size: 5 }], generation.diagnostics);
        assert_eq!(5, generation.reports.len());
    }

    #[test]
    fn constraints_bind() {
        let constraints = Constraints {
            max_combined_odds: Some(5.0),
            min_combined_probability: None,
        };
        let generation = build(
            &pool(),
            &constraints,
            &[2],
            &EfficiencyWeights::default(),
            &BranchAndBound,
            Deadline::none(),
        );
        let paper = &generation.papers[0];
        assert!(paper.metrics.combined_odds <= 5.0);
        let labels = paper.legs.iter().map(|leg| leg.fixture_id).collect::<Vec<_>>();
        assert_eq!(vec![1, 3], labels);

        let impossible = Constraints {
            max_combined_odds: None,
            min_combined_probability: Some(0.5),
        };
        let generation = build(
            &pool(),
            &impossible,
            &[2],
            &EfficiencyWeights::default(),
            &BranchAndBound,
            Deadline::none(),
        );
        assert!(generation.papers.is_empty());
        assert_eq!(vec![Diagnostic::Infeasible { size: 2 }], generation.diagnostics);
    }
}
