use super::closed_form::{BivariatePoisson, IndependentPoisson};
use super::simulation::{self, Simulation};
use super::*;
use crate::concept::GoalBand;
use crate::probs::SliceExt;
use assert_float_eq::*;

const TOLERANCE: f64 = 1e-9;

fn independent(home: f64, away: f64) -> MarketProbabilities {
    IndependentPoisson::new(TOLERANCE)
        .compute(&ExpectedGoals::new(home, away), 10)
        .unwrap()
}

fn result(probabilities: &MarketProbabilities, result: MatchResult) -> f64 {
    probabilities.get(&Concept::Result(result)).unwrap()
}

#[test]
fn independent_1x2_sums_to_truncated_mass() {
    let rates = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];
    for home in rates {
        for away in rates {
            let probabilities = independent(home, away);
            let mass = probabilities.scores.values().copied().collect::<Vec<_>>().sum();
            let one_x_two = MatchResult::iter()
                .map(|outcome| result(&probabilities, outcome))
                .sum::<f64>();
            assert_float_absolute_eq!(mass, one_x_two, 1e-3);
            assert!(mass <= 1.0);
        }
    }
}

#[test]
fn independent_partitions_are_consistent() {
    let probabilities = IndependentPoisson::new(TOLERANCE)
        .compute(&ExpectedGoals::new(3.5, 3.0), 5)
        .unwrap();
    let mass = probabilities.scores.values().copied().collect::<Vec<_>>().sum();
    assert!(mass < 0.99);
    for partition in partitions() {
        let sum = partition
            .iter()
            .map(|concept| probabilities.get(concept).unwrap())
            .sum::<f64>();
        assert_float_absolute_eq!(mass, sum, 1e-9);
    }
}

#[test]
fn independent_covers_the_surface() {
    let probabilities = independent(1.4, 1.1);
    assert_eq!(Concept::surface().len(), probabilities.markets.len());
    assert_eq!(121, probabilities.scores.len());
    assert!(probabilities
        .markets
        .values()
        .all(|&prob| (0.0..=1.0).contains(&prob)));
    assert_float_relative_eq!(
        f64::exp(-2.5),
        probabilities.get(&Concept::Score(Score::nil_all())).unwrap(),
        1e-12
    );
}

#[test]
fn simulation_agrees_with_independent() {
    let expected_goals = ExpectedGoals::new(1.4, 1.1);
    let simulated = Simulation::from(simulation::Config::default())
        .compute(&expected_goals, 10)
        .unwrap();
    let exact = independent(1.4, 1.1);
    for concept in [
        Concept::Result(MatchResult::Home),
        Concept::Result(MatchResult::Draw),
        Concept::Result(MatchResult::Away),
        Concept::Total(Total::over(2)),
        Concept::Btts(Btts::Yes),
        Concept::GoalBand(GoalBand::TwoToThree),
    ] {
        let diff = simulated.get(&concept).unwrap() - exact.get(&concept).unwrap();
        assert!(diff.abs() < 0.02, "{concept:?}: {diff}");
    }
}

#[test]
fn simulation_is_deterministic_per_seed() {
    let expected_goals = ExpectedGoals::new(1.7, 0.9);
    let config = simulation::Config {
        simulations: 10_000,
        ..simulation::Config::default()
    };
    let first = Simulation::from(config.clone()).compute(&expected_goals, 10).unwrap();
    let second = Simulation::from(config.clone()).compute(&expected_goals, 10).unwrap();
    assert_eq!(first, second);

    let reseeded = Simulation::from(simulation::Config { seed: 7, ..config })
        .compute(&expected_goals, 10)
        .unwrap();
    assert_ne!(first, reseeded);
}

#[test]
fn simulation_partitions_sum_to_one() {
    let simulated = Simulation::from(simulation::Config::default())
        .compute(&ExpectedGoals::new(2.0, 1.5), 10)
        .unwrap();
    for partition in partitions() {
        let sum = partition
            .iter()
            .map(|concept| simulated.get(concept).unwrap())
            .sum::<f64>();
        assert_float_absolute_eq!(1.0, sum, 1e-9);
    }
}

#[test]
fn simulation_histogram_is_capped() {
    let simulated = Simulation::from(simulation::Config::default())
        .compute(&ExpectedGoals::new(3.5, 3.5), 10)
        .unwrap();
    assert_eq!(36, simulated.scores.len());
    assert!(simulated.scores.keys().all(|score| score.home <= 5 && score.away <= 5));
    let total = simulated.scores.values().copied().collect::<Vec<_>>().sum();
    assert_float_absolute_eq!(1.0, total, 1e-9);
    assert!(simulated.get(&Concept::Score(Score::new(5, 5))).unwrap() > 0.0);
}

#[test]
fn simulation_saturates_extreme_rates() {
    let simulated = Simulation::from(simulation::Config::default())
        .compute(&ExpectedGoals::new(800.0, 1.0), 10)
        .unwrap();
    assert_float_absolute_eq!(1.0, result(&simulated, MatchResult::Home), 1e-9);
}

#[test]
fn simulation_rejects_too_few_draws() {
    let config = simulation::Config {
        simulations: 9_999,
        ..simulation::Config::default()
    };
    assert_eq!(
        Err(ModelError::Config(ConfigError::TooFewSimulations(9_999, 10_000))),
        Simulation::from(config).compute(&ExpectedGoals::new(1.0, 1.0), 10)
    );
}

#[test]
fn bivariate_without_covariance_collapses_to_independent() {
    let exact = independent(1.6, 1.2);
    let bivariate = BivariatePoisson::new(0.0, TOLERANCE)
        .compute(&ExpectedGoals::new(1.6, 1.2), 10)
        .unwrap();
    assert_eq!(0, bivariate.failed_cells);
    for (score, prob) in &exact.scores {
        assert_float_relative_eq!(*prob, bivariate.scores[score], 1e-9);
    }
    for (concept, prob) in &exact.markets {
        assert_float_absolute_eq!(*prob, bivariate.markets[concept], 1e-9);
    }
}

#[test]
fn bivariate_rejects_invalid_covariance() {
    let expected_goals = ExpectedGoals::new(1.6, 1.2);
    for common_rate in [-0.1, 1.3, f64::NAN] {
        let outcome = BivariatePoisson::new(common_rate, TOLERANCE).compute(&expected_goals, 10);
        assert!(matches!(outcome, Err(ModelError::Covariance(_))), "{common_rate}");
    }
    assert!(BivariatePoisson::new(1.2, TOLERANCE).compute(&expected_goals, 10).is_ok());
}

#[test]
fn invalid_rates_are_rejected() {
    let expected_goals = ExpectedGoals::new(-1.0, 1.0);
    assert_eq!(
        Err(ModelError::InvalidRates(expected_goals)),
        IndependentPoisson::new(TOLERANCE).compute(&expected_goals, 10)
    );
}

#[test]
fn records_round_trip() {
    let exact = independent(1.4, 1.1);
    let records = exact.to_records();
    assert_eq!(Concept::surface().len() + 121, records.len());
    assert!(records.contains_key("poisson_H_&_O2.5"));
    assert!(records.contains_key("score_3-1"));
    let parsed = MarketProbabilities::from_records(
        ModelId::IndependentPoisson,
        records.iter().map(|(key, &prob)| (key.as_str(), prob)),
    );
    assert_eq!(exact, parsed);
}

#[test]
fn records_drop_unrecognised_keys_and_improper_values() {
    let parsed = MarketProbabilities::from_records(
        ModelId::Simulation,
        [("prob_H", 0.5), ("prob_Z", 0.2), ("prob_D", 1.5), ("prob_A", f64::NAN)],
    );
    assert_eq!(1, parsed.markets.len());
    assert_eq!(Some(0.5), parsed.get(&Concept::Result(MatchResult::Home)));
}

#[test]
fn compute_all_runs_every_model() {
    let (set, diagnostics) = compute_all(1, &ExpectedGoals::new(1.4, 1.1), Some(0.1), &Config::default());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(
        vec![ModelId::Simulation, ModelId::IndependentPoisson, ModelId::BivariatePoisson],
        set.models().collect::<Vec<_>>()
    );
}

#[test]
fn compute_all_skips_bivariate_on_bad_covariance() {
    let (set, diagnostics) = compute_all(7, &ExpectedGoals::new(1.4, 1.1), Some(2.0), &Config::default());
    assert_eq!(2, set.len());
    assert!(set.get(ModelId::BivariatePoisson).is_none());
    assert_eq!(1, diagnostics.len());
    assert!(matches!(
        diagnostics[0],
        Diagnostic::ModelSkipped {
            fixture_id: 7,
            model: ModelId::BivariatePoisson,
            ..
        }
    ));
}

#[test]
fn compute_all_without_covariance() {
    let (set, diagnostics) = compute_all(1, &ExpectedGoals::new(1.4, 1.1), None, &Config::default());
    assert_eq!(2, set.len());
    assert!(diagnostics.is_empty());
}

#[test]
fn model_identifiers() {
    assert_eq!("independent_poisson", ModelId::IndependentPoisson.to_string());
    assert_eq!("\"bivariate_poisson\"", serde_json::to_string(&ModelId::BivariatePoisson).unwrap());
}
