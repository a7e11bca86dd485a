//! Score grids: joint distributions of home and away goals, indexed `(home, away)`.

use crate::concept::Concept;
use crate::domain::Score;
use crate::factorial::{LnFactorial, Lookup};
use crate::linear::Matrix;
use crate::poisson;

pub fn from_univariate_poisson(home_rate: f64, away_rate: f64, scoregrid: &mut Matrix) {
    let factorial = Lookup::default();
    let home_probs = (0..scoregrid.rows())
        .map(|goals| poisson::univariate(goals as u8, home_rate, &factorial))
        .collect::<Vec<_>>();
    let away_probs = (0..scoregrid.cols())
        .map(|goals| poisson::univariate(goals as u8, away_rate, &factorial))
        .collect::<Vec<_>>();
    for (home_goals, home_prob) in home_probs.iter().enumerate() {
        for (away_goals, away_prob) in away_probs.iter().enumerate() {
            scoregrid[(home_goals, away_goals)] = home_prob * away_prob;
        }
    }
}

/// Populates the grid from a bivariate Poisson with marginal rates `home_rate` and `away_rate`, of
/// which `common_rate` is shared. Cells that cannot be evaluated are zeroed; their count is returned.
pub fn from_bivariate_poisson(
    home_rate: f64,
    away_rate: f64,
    common_rate: f64,
    scoregrid: &mut Matrix,
) -> usize {
    from_bivariate_poisson_with(home_rate, away_rate, common_rate, scoregrid, &Lookup::default())
}

pub fn from_bivariate_poisson_with(
    home_rate: f64,
    away_rate: f64,
    common_rate: f64,
    scoregrid: &mut Matrix,
    factorial: &impl LnFactorial,
) -> usize {
    let (lambda_1, lambda_2) = (home_rate - common_rate, away_rate - common_rate);
    let mut failed = 0;
    for home_goals in 0..scoregrid.rows() {
        for away_goals in 0..scoregrid.cols() {
            scoregrid[(home_goals, away_goals)] = match poisson::bivariate(
                home_goals as u8,
                away_goals as u8,
                lambda_1,
                lambda_2,
                common_rate,
                factorial,
            ) {
                Some(prob) => prob,
                None => {
                    failed += 1;
                    0.0
                }
            };
        }
    }
    failed
}

/// Bins sampled scores into a grid of raw counts, sized to fit the largest sample.
pub fn from_samples(samples: &[Score]) -> Matrix {
    let rows = samples.iter().map(|score| score.home).max().unwrap_or(0) as usize + 1;
    let cols = samples.iter().map(|score| score.away).max().unwrap_or(0) as usize + 1;
    let mut scoregrid = Matrix::allocate(rows, cols);
    for score in samples {
        scoregrid[(score.home as usize, score.away as usize)] += 1.0;
    }
    scoregrid
}

/// Folds every cell beyond `ceiling` goals on either side into the ceiling row/column, so that the
/// last row and column read as "`ceiling` or more".
pub fn capped(scoregrid: &Matrix, ceiling: usize) -> Matrix {
    let mut capped = Matrix::allocate(ceiling + 1, ceiling + 1);
    for (home_goals, away_goals, value) in scoregrid.cells() {
        capped[(usize::min(home_goals, ceiling), usize::min(away_goals, ceiling))] += value;
    }
    capped
}

/// Sums the cells of the grid whose score satisfies the concept.
pub fn gather(concept: &Concept, scoregrid: &Matrix) -> f64 {
    scoregrid
        .cells()
        .filter(|&(home_goals, away_goals, _)| {
            concept.matches(&Score::new(home_goals as u8, away_goals as u8))
        })
        .map(|(_, _, value)| value)
        .sum()
}

pub fn home_away_expectations(scoregrid: &Matrix) -> (f64, f64) {
    let (mut home_expectation, mut away_expectation) = (0.0, 0.0);
    for (home_goals, away_goals, prob) in scoregrid.cells() {
        home_expectation += home_goals as f64 * prob;
        away_expectation += away_goals as f64 * prob;
    }
    (home_expectation, away_expectation)
}

#[cfg(test)]
mod tests;
