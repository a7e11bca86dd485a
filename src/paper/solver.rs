//! Binary selection problems: choose exactly `size` items, at most one per exclusion group,
//! maximising the summed value, optionally bounding the summed log-odds from above and the summed
//! log-probability from below.

use tracing::trace;

use crate::error::SolverError;

#[cfg(feature = "highs")]
pub mod highs;

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub value: f64,
    pub group: u64,
    pub log_odds: f64,
    pub log_probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub items: Vec<Item>,
    pub size: usize,
    pub max_log_odds: Option<f64>,
    pub min_log_probability: Option<f64>,
}
impl Problem {
    pub fn validate(&self) -> Result<(), SolverError> {
        if let Some(index) = self.items.iter().position(|item| {
            !(item.value.is_finite() && item.log_odds.is_finite() && item.log_probability.is_finite())
        }) {
            return Err(SolverError::Malformed(format!("item {index} has non-finite coefficients")));
        }
        Ok(())
    }

    /// Whether the chosen items satisfy every constraint.
    pub fn is_feasible(&self, chosen: &[usize]) -> bool {
        if chosen.len() != self.size {
            return false;
        }
        let mut groups = chosen.iter().map(|&index| self.items[index].group).collect::<Vec<_>>();
        groups.sort_unstable();
        groups.dedup();
        if groups.len() != chosen.len() {
            return false;
        }
        let log_odds = chosen.iter().map(|&index| self.items[index].log_odds).sum::<f64>();
        let log_probability = chosen.iter().map(|&index| self.items[index].log_probability).sum::<f64>();
        self.max_log_odds.map_or(true, |max| log_odds <= max + EPSILON)
            && self.min_log_probability.map_or(true, |min| log_probability >= min - EPSILON)
    }

    pub fn objective(&self, chosen: &[usize]) -> f64 {
        chosen.iter().map(|&index| self.items[index].value).sum()
    }
}

const EPSILON: f64 = 1e-9;

pub trait BinarySolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Indices of the optimal items, or `None` if no feasible choice exists.
    fn solve_binary_knapsack_with_exclusion_groups(&self, problem: &Problem) -> Result<Option<Vec<usize>>, SolverError>;
}

/// Depth-first branch and bound over the exclusion groups. Each group either contributes its one
/// chosen item or is skipped; a branch is abandoned once the best values still available cannot beat
/// the incumbent.
#[derive(Debug, Default, Clone)]
pub struct BranchAndBound;

struct Search<'a> {
    problem: &'a Problem,
    /// Item indices per group, in descending order of value.
    groups: Vec<Vec<usize>>,
    /// Set when no item can lower the summed log-odds, so the odds cap can prune early.
    monotone_odds: bool,
    /// Likewise for the log-probability floor.
    monotone_probability: bool,
    chosen: Vec<usize>,
    best: Option<(f64, Vec<usize>)>,
    nodes: u64,
}

impl BinarySolver for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch_and_bound"
    }

    fn solve_binary_knapsack_with_exclusion_groups(&self, problem: &Problem) -> Result<Option<Vec<usize>>, SolverError> {
        problem.validate()?;
        let mut by_group = std::collections::BTreeMap::<u64, Vec<usize>>::new();
        for (index, item) in problem.items.iter().enumerate() {
            by_group.entry(item.group).or_default().push(index);
        }
        if by_group.len() < problem.size {
            return Ok(None);
        }
        let mut groups = by_group.into_values().collect::<Vec<_>>();
        for group in &mut groups {
            group.sort_by(|&a, &b| problem.items[b].value.total_cmp(&problem.items[a].value));
        }

        let mut search = Search {
            problem,
            groups,
            monotone_odds: problem.items.iter().all(|item| item.log_odds >= 0.0),
            monotone_probability: problem.items.iter().all(|item| item.log_probability <= 0.0),
            chosen: Vec::with_capacity(problem.size),
            best: None,
            nodes: 0,
        };
        search.descend(0, 0.0, 0.0, 0.0);
        trace!("explored {} nodes", search.nodes);
        Ok(search.best.map(|(_, chosen)| chosen))
    }
}

impl Search<'_> {
    fn descend(&mut self, group: usize, value: f64, log_odds: f64, log_probability: f64) {
        self.nodes += 1;
        let remaining = self.problem.size - self.chosen.len();
        if self.monotone_odds {
            if let Some(max) = self.problem.max_log_odds {
                if log_odds > max + EPSILON {
                    return;
                }
            }
        }
        if self.monotone_probability {
            if let Some(min) = self.problem.min_log_probability {
                if log_probability < min - EPSILON {
                    return;
                }
            }
        }

        if remaining == 0 {
            if self.problem.is_feasible(&self.chosen) {
                let improves = self.best.as_ref().map_or(true, |(best, _)| value > *best);
                if improves {
                    self.best = Some((value, self.chosen.clone()));
                }
            }
            return;
        }
        if self.groups.len() - group < remaining {
            return;
        }
        if let Some((best, _)) = &self.best {
            if value + self.bound(group, remaining) <= *best {
                return;
            }
        }

        for position in 0..self.groups[group].len() {
            let index = self.groups[group][position];
            let item = &self.problem.items[index];
            let (item_value, item_log_odds, item_log_probability) = (item.value, item.log_odds, item.log_probability);
            self.chosen.push(index);
            self.descend(
                group + 1,
                value + item_value,
                log_odds + item_log_odds,
                log_probability + item_log_probability,
            );
            self.chosen.pop();
        }
        self.descend(group + 1, value, log_odds, log_probability);
    }

    /// The most the remaining groups can add: the `remaining` largest group maxima.
    fn bound(&self, group: usize, remaining: usize) -> f64 {
        let mut maxima = self.groups[group..]
            .iter()
            .map(|members| self.problem.items[members[0]].value)
            .collect::<Vec<_>>();
        maxima.sort_by(|a, b| b.total_cmp(a));
        maxima.iter().take(remaining).sum()
    }
}

/// Exhaustive search over every combination, for cross-checking on small pools.
#[derive(Debug, Default, Clone)]
pub struct Exhaustive;

impl BinarySolver for Exhaustive {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve_binary_knapsack_with_exclusion_groups(&self, problem: &Problem) -> Result<Option<Vec<usize>>, SolverError> {
        problem.validate()?;
        let mut best: Option<(f64, Vec<usize>)> = None;
        for chosen in crate::comb::Combinations::new(problem.items.len(), problem.size) {
            if !problem.is_feasible(&chosen) {
                continue;
            }
            let value = problem.objective(&chosen);
            if best.as_ref().map_or(true, |(best, _)| value > *best) {
                best = Some((value, chosen));
            }
        }
        Ok(best.map(|(_, chosen)| chosen))
    }
}
