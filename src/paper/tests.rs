use assert_float_eq::*;

use super::*;
use crate::domain::Fixture;
use crate::paper::solver::BranchAndBound;

fn selection(fixture_id: u64, label: &str, probability: f64, odds: f64) -> Selection {
    let fixture = Fixture {
        id: fixture_id,
        ..Fixture::default()
    };
    Selection::new(&fixture, "Match Winner", label, probability, odds)
}

#[test]
fn weights_renormalise() {
    let weights = EfficiencyWeights {
        probability: 5.0,
        edge: 3.0,
        value: 2.0,
    }
    .normalised()
    .unwrap();
    assert_float_absolute_eq!(0.5, weights.probability, 1e-12);
    assert_float_absolute_eq!(0.3, weights.edge, 1e-12);
    assert_float_absolute_eq!(0.2, weights.value, 1e-12);
    assert_float_absolute_eq!(0.5 * 0.6 + 0.3 * 0.5 + 0.2 * 0.5, weights.score(0.6, 0.5, 2.5), 1e-12);
}

#[test]
fn weights_reject_degenerate() {
    for (probability, edge, value) in [(0.0, 0.0, 0.0), (-1.0, 1.0, 1.0), (f64::NAN, 1.0, 1.0)] {
        let weights = EfficiencyWeights { probability, edge, value };
        assert!(weights.validate().is_err());
        assert!(weights.normalised().is_err());
    }
}

#[test]
fn candidates_filtered_and_truncated() {
    let config = CandidateConfig {
        min_odds: Some(1.5),
        max_odds: Some(5.0),
        top_k: 2,
        ..CandidateConfig::default()
    };
    let pool = prepare_candidates(
        vec![
            selection(1, "Home", 0.50, 2.4),   // edge 0.20
            selection(1, "Draw", 0.30, 3.6),   // edge 0.08
            selection(1, "Away", 0.25, 4.4),   // edge 0.10
            selection(1, "Over 2.5", 0.80, 1.3), // below the odds band
            selection(1, "1:0", 0.09, 14.0),   // improbable
            selection(2, "Home", 0.40, 2.5),   // no edge
            selection(3, "Under 2.5", 0.15, 8.0), // above the odds band
        ],
        &config,
    )
    .unwrap();

    assert_eq!(vec![1], pool.fixture_ids());
    assert_eq!(1, pool.num_fixtures());
    let labels = pool.get(1).iter().map(|candidate| candidate.selection_label.as_str()).collect::<Vec<_>>();
    assert_eq!(vec!["Home", "Draw"], labels);
    assert!(pool.get(2).is_empty());
    for candidate in pool.candidates() {
        let expected = config.weights.score(candidate.probability, candidate.edge, candidate.odds);
        assert_float_absolute_eq!(expected, candidate.efficiency(), 1e-12);
    }
}

#[test]
fn candidates_reject_invalid_config() {
    let config = CandidateConfig {
        min_odds: Some(3.0),
        max_odds: Some(2.0),
        ..CandidateConfig::default()
    };
    assert_eq!(
        Err(ConfigError::EmptyOddsBand { min: 3.0, max: 2.0 }),
        prepare_candidates(vec![], &config)
    );
}

#[test]
fn paper_config_validation() {
    assert!(PaperConfig::default().validate().is_ok());
    let no_sizes = PaperConfig {
        sizes: vec![],
        ..PaperConfig::default()
    };
    assert_eq!(Err(ConfigError::NoPaperSizes), no_sizes.validate());
    let zero = PaperConfig {
        sizes: vec![2, 0],
        ..PaperConfig::default()
    };
    assert_eq!(Err(ConfigError::ZeroPaperSize), zero.validate());
    let unsorted = PaperConfig {
        sizes: vec![4, 2, 4, 3],
        ..PaperConfig::default()
    };
    assert_eq!(vec![2, 3, 4], unsorted.sorted_sizes());
}

#[test]
fn strategy_names() {
    assert_eq!("greedy", Strategy::Greedy.to_string());
    assert_eq!(Ok(Strategy::Exact), "exact".parse::<Strategy>());
    assert_eq!(Ok(SelectionStrategy::Probability), "probability".parse::<SelectionStrategy>());
    assert!("cheapest".parse::<SelectionStrategy>().is_err());
}

fn pool() -> CandidatePool {
    prepare_candidates(
        vec![
            selection(1, "Home", 0.55, 2.2),
            selection(1, "Draw", 0.30, 3.7),
            selection(2, "Home", 0.35, 3.6),
            selection(3, "Away", 0.62, 1.9),
        ],
        &CandidateConfig::default(),
    )
    .unwrap()
}

#[test]
fn generate_dispatches_on_strategy() {
    let greedy = generate(&pool(), &PaperConfig::default(), &EfficiencyWeights::default(), &BranchAndBound);
    assert!(greedy.diagnostics.is_empty());
    assert_eq!(vec![2, 3], greedy.reports.iter().map(|report| report.size).collect::<Vec<_>>());
    // size 2 uses (1, 2) then (1, 3) with the second candidate of fixture 1; nothing is left for size 3
    assert_eq!(2, greedy.papers.len());

    let config = PaperConfig {
        strategy: Strategy::Exact,
        ..PaperConfig::default()
    };
    let exact = generate(&pool(), &config, &EfficiencyWeights::default(), &BranchAndBound);
    assert!(exact.diagnostics.is_empty());
    assert_eq!(vec![2, 3], exact.papers.iter().map(Paper::size).collect::<Vec<_>>());
}

#[test]
fn generate_reports_invalid_config() {
    let config = PaperConfig {
        sizes: vec![],
        ..PaperConfig::default()
    };
    let generation = generate(&pool(), &config, &EfficiencyWeights::default(), &BranchAndBound);
    assert!(generation.papers.is_empty());
    assert_eq!(vec![Diagnostic::Config(ConfigError::NoPaperSizes)], generation.diagnostics);
}

#[test]
fn generate_drops_invalid_exact_constraints() {
    let config = PaperConfig {
        strategy: Strategy::Exact,
        sizes: vec![2],
        max_combined_odds: Some(-1.0),
        ..PaperConfig::default()
    };
    let generation = generate(&pool(), &config, &EfficiencyWeights::default(), &BranchAndBound);
    assert_eq!(1, generation.papers.len());
    assert_eq!(
        vec![Diagnostic::Config(ConfigError::NonPositiveOddsBound {
            name: "max combined odds",
            value: -1.0
        })],
        generation.diagnostics
    );
}
