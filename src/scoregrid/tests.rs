use super::*;
use crate::concept::{Btts, GoalBand, MatchResult, Total};
use crate::probs::SliceExt;
use assert_float_eq::*;

fn create_test_4x4_scoregrid() -> Matrix {
    let mut scoregrid = Matrix::allocate(4, 4);
    let rows = [
        [0.04, 0.03, 0.02, 0.01],
        [0.08, 0.06, 0.04, 0.02],
        [0.12, 0.09, 0.06, 0.03],
        [0.16, 0.12, 0.08, 0.04],
    ];
    for (home_goals, row) in rows.iter().enumerate() {
        for (away_goals, &prob) in row.iter().enumerate() {
            scoregrid[(home_goals, away_goals)] = prob;
        }
    }
    scoregrid
}

#[test]
pub fn gather_win() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.65, gather(&Concept::Result(MatchResult::Home), &scoregrid), 1e-12);
    assert_float_absolute_eq!(0.15, gather(&Concept::Result(MatchResult::Away), &scoregrid), 1e-12);
}

#[test]
pub fn gather_draw() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.2, gather(&Concept::Result(MatchResult::Draw), &scoregrid), 1e-12);
}

#[test]
pub fn gather_goals_ou() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.35, gather(&Concept::Total(Total::under(2)), &scoregrid), 1e-12);
    assert_float_absolute_eq!(0.65, gather(&Concept::Total(Total::over(2)), &scoregrid), 1e-12);
}

#[test]
pub fn gather_btts_and_bands() {
    let scoregrid = create_test_4x4_scoregrid();
    let yes = gather(&Concept::Btts(Btts::Yes), &scoregrid);
    let no = gather(&Concept::Btts(Btts::No), &scoregrid);
    assert_float_absolute_eq!(0.54, yes, 1e-12);
    assert_float_absolute_eq!(1.0, yes + no, 1e-12);
    assert_float_absolute_eq!(0.15, gather(&Concept::GoalBand(GoalBand::ZeroToOne), &scoregrid), 1e-12);
    assert_float_absolute_eq!(0.04, gather(&Concept::GoalBand(GoalBand::SixPlus), &scoregrid), 1e-12);
}

#[test]
pub fn gather_correct_score() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_eq!(0.04, gather(&Concept::Score(Score::new(0, 0)), &scoregrid));
    assert_eq!(0.08, gather(&Concept::Score(Score::new(3, 2)), &scoregrid));
    assert_eq!(0.0, gather(&Concept::Score(Score::new(7, 2)), &scoregrid));
}

#[test]
pub fn univariate_poisson() {
    let mut scoregrid = Matrix::allocate(11, 11);
    from_univariate_poisson(1.4, 1.1, &mut scoregrid);
    let mass = scoregrid.flatten().sum();
    assert!(mass < 1.0);
    assert_float_absolute_eq!(1.0, mass, 1e-4);
    assert_float_relative_eq!(f64::exp(-2.5), scoregrid[(0, 0)], 1e-12);

    let (home, away) = home_away_expectations(&scoregrid);
    assert_float_absolute_eq!(1.4, home, 1e-3);
    assert_float_absolute_eq!(1.1, away, 1e-3);
}

#[test]
pub fn bivariate_poisson_zero_common_matches_univariate() {
    let mut univariate = Matrix::allocate(11, 11);
    from_univariate_poisson(1.6, 0.9, &mut univariate);
    let mut bivariate = Matrix::allocate(11, 11);
    let failed = from_bivariate_poisson(1.6, 0.9, 0.0, &mut bivariate);
    assert_eq!(0, failed);
    for (home_goals, away_goals, prob) in univariate.cells() {
        assert_float_relative_eq!(prob, bivariate[(home_goals, away_goals)], 1e-9);
    }
}

#[test]
pub fn bivariate_poisson_preserves_marginals() {
    let mut scoregrid = Matrix::allocate(16, 16);
    from_bivariate_poisson(1.6, 1.2, 0.3, &mut scoregrid);
    let (home, away) = home_away_expectations(&scoregrid);
    assert_float_absolute_eq!(1.6, home, 1e-4);
    assert_float_absolute_eq!(1.2, away, 1e-4);
}

#[test]
pub fn bivariate_poisson_raises_draws() {
    let mut independent = Matrix::allocate(11, 11);
    from_univariate_poisson(1.4, 1.1, &mut independent);
    let mut correlated = Matrix::allocate(11, 11);
    from_bivariate_poisson(1.4, 1.1, 0.2, &mut correlated);
    let draw = Concept::Result(MatchResult::Draw);
    assert!(gather(&draw, &correlated) > gather(&draw, &independent));
}

#[test]
pub fn bivariate_poisson_counts_failed_cells() {
    let mut scoregrid = Matrix::allocate(3, 3);
    // a shared rate above the marginals leaves negative independent components
    let failed = from_bivariate_poisson(0.5, 0.5, 1.0, &mut scoregrid);
    assert!(failed > 0);
    assert!(scoregrid.flatten().iter().all(|prob| prob.is_finite()));
}

#[test]
pub fn samples_and_capping() {
    let samples = [
        Score::new(0, 0),
        Score::new(1, 0),
        Score::new(1, 0),
        Score::new(7, 2),
    ];
    let counts = from_samples(&samples);
    assert_eq!(8, counts.rows());
    assert_eq!(3, counts.cols());
    assert_eq!(2.0, counts[(1, 0)]);
    assert_eq!(4.0, counts.flatten().sum());

    let capped = capped(&counts, 5);
    assert_eq!(6, capped.rows());
    assert_eq!(1.0, capped[(5, 2)]);
    assert_eq!(4.0, capped.flatten().sum());
}

#[test]
pub fn samples_empty() {
    let counts = from_samples(&[]);
    assert_eq!(1, counts.rows());
    assert_eq!(0.0, counts[(0, 0)]);
}
