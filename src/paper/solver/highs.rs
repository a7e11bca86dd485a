//! HiGHS mixed-integer backend via good_lp.

use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable};

use super::{BinarySolver, Problem};
use crate::error::SolverError;

#[derive(Debug, Default, Clone)]
pub struct HighsSolver;

impl BinarySolver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve_binary_knapsack_with_exclusion_groups(&self, problem: &Problem) -> Result<Option<Vec<usize>>, SolverError> {
        problem.validate()?;
        if problem.items.is_empty() {
            return Ok((problem.size == 0).then(Vec::new));
        }

        let mut vars = variables!();
        let xs: Vec<Variable> = problem.items.iter().map(|_| vars.add(variable().binary())).collect();
        let weighted = |coefficient: fn(&super::Item) -> f64| -> Expression {
            xs.iter()
                .zip(problem.items.iter())
                .map(|(&x, item)| coefficient(item) * x)
                .sum()
        };

        let objective = weighted(|item| item.value);
        let count: Expression = xs.iter().copied().sum();
        let size = problem.size as f64;
        let mut model = vars
            .maximise(&objective)
            .using(highs)
            .with(constraint!(count == size));

        let mut groups = problem.items.iter().map(|item| item.group).collect::<Vec<_>>();
        groups.sort_unstable();
        groups.dedup();
        for group in groups {
            let members: Expression = xs
                .iter()
                .zip(problem.items.iter())
                .filter(|(_, item)| item.group == group)
                .map(|(&x, _)| x)
                .sum();
            model = model.with(constraint!(members <= 1.0));
        }
        if let Some(max) = problem.max_log_odds {
            let log_odds = weighted(|item| item.log_odds);
            model = model.with(constraint!(log_odds <= max));
        }
        if let Some(min) = problem.min_log_probability {
            let log_probability = weighted(|item| item.log_probability);
            model = model.with(constraint!(log_probability >= min));
        }

        match model.solve() {
            Ok(solution) => Ok(Some(
                xs.iter()
                    .enumerate()
                    .filter(|(_, x)| solution.value(**x) > 0.5)
                    .map(|(index, _)| index)
                    .collect(),
            )),
            Err(ResolutionError::Infeasible) | Err(ResolutionError::Unbounded) => Ok(None),
            Err(err) => Err(SolverError::Backend(err.to_string())),
        }
    }
}
