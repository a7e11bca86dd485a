//! Greedy assembly. Sizes are processed in ascending order; for each, combinations of distinct
//! fixtures are enumerated lexicographically, and each fixture contributes its best candidate not yet
//! used by an earlier paper. A `(fixture, selection)` pair is used by at most one paper per run.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::comb::Combinations;
use crate::error::Diagnostic;
use crate::paper::{
    CandidatePool, Deadline, EfficiencyWeights, Generation, GenerationReport, Paper, PaperConfig,
    SelectionStrategy,
};
use crate::selection::Selection;

type Used = FxHashSet<(u64, String)>;

pub fn build(pool: &CandidatePool, config: &PaperConfig, weights: &EfficiencyWeights, deadline: Deadline) -> Generation {
    let fixtures = ranked_fixtures(pool, config.selection_strategy);
    let mut used = Used::default();
    let mut generation = Generation::default();
    for size in config.sorted_sizes() {
        if deadline.elapsed() {
            generation.diagnostics.push(Diagnostic::DeadlineElapsed { size });
            continue;
        }
        let report = fill_size(
            &fixtures,
            size,
            config.max_papers_per_size,
            weights,
            deadline,
            &mut used,
            &mut generation.papers,
        );
        debug!("size {size}: attempted {}, emitted {}", report.attempted, report.emitted);
        generation.reports.push(report);
    }
    generation
}

/// Each fixture's candidates, ordered by the selection strategy. Ties keep the pool's efficiency order.
fn ranked_fixtures(pool: &CandidatePool, strategy: SelectionStrategy) -> Vec<Vec<&Selection>> {
    pool.fixture_ids()
        .into_iter()
        .map(|fixture_id| {
            let mut candidates = pool.get(fixture_id).iter().collect::<Vec<_>>();
            candidates.sort_by(|a, b| strategy.key(b).total_cmp(&strategy.key(a)));
            candidates
        })
        .collect()
}

fn fill_size(
    fixtures: &[Vec<&Selection>],
    size: usize,
    cap: usize,
    weights: &EfficiencyWeights,
    deadline: Deadline,
    used: &mut Used,
    papers: &mut Vec<Paper>,
) -> GenerationReport {
    let mut report = GenerationReport::new(size);
    let available = fixtures
        .iter()
        .filter(|candidates| candidates.iter().any(|candidate| !used.contains(&candidate.key())))
        .collect::<Vec<_>>();
    if size > available.len() {
        return report;
    }
    for combination in Combinations::new(available.len(), size) {
        if report.emitted == cap || deadline.elapsed() {
            break;
        }
        report.attempted += 1;
        let legs = combination
            .iter()
            .map(|&fixture| {
                available[fixture]
                    .iter()
                    .find(|candidate| !used.contains(&candidate.key()))
                    .map(|&candidate| candidate.clone())
            })
            .collect::<Option<Vec<_>>>();
        if let Some(legs) = legs {
            for leg in &legs {
                used.insert(leg.key());
            }
            papers.push(Paper::new(legs, weights));
            report.emitted += 1;
        }
    }
    report
}
