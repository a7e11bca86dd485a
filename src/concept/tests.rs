use super::*;
use rustc_hash::FxHashSet;

#[test]
pub fn parse_simple_tokens() {
    assert_eq!(Some(Concept::Result(MatchResult::Home)), to_concept("prob_H"));
    assert_eq!(Some(Concept::Result(MatchResult::Draw)), to_concept("poisson_D"));
    assert_eq!(Some(Concept::Result(MatchResult::Away)), to_concept("bp_A"));
    assert_eq!(Some(Concept::DoubleChance(DoubleChance::HomeOrDraw)), to_concept("prob_1X"));
    assert_eq!(Some(Concept::DoubleChance(DoubleChance::DrawOrAway)), to_concept("X2"));
    assert_eq!(Some(Concept::DoubleChance(DoubleChance::HomeOrAway)), to_concept("bp_12"));
    assert_eq!(Some(Concept::Btts(Btts::Yes)), to_concept("prob_BTTS_Yes"));
    assert_eq!(Some(Concept::Btts(Btts::No)), to_concept("poisson_BTTS_No"));
}

#[test]
pub fn parse_totals() {
    assert_eq!(Some(Concept::Total(Total::over(2))), to_concept("prob_O2.5"));
    assert_eq!(Some(Concept::Total(Total::under(1))), to_concept("bp_U1.5"));
    assert_eq!(Some(Concept::Total(Total::under(2))), to_concept("prob_O2.5_No"));
    assert_eq!(Some(Concept::Total(Total::over(3))), to_concept("poisson_U3.5_No"));
    assert_eq!(None, to_concept("prob_O2"));
    assert_eq!(None, to_concept("prob_O2.25"));
    assert_eq!(None, to_concept("prob_Oabc.5"));
}

#[test]
pub fn parse_compounds() {
    assert_eq!(
        Some(Concept::ResultAndTotal(MatchResult::Home, Total::over(2))),
        to_concept("prob_H_&_O2.5")
    );
    assert_eq!(
        Some(Concept::ResultAndTotal(MatchResult::Home, Total::under(2))),
        to_concept("prob_H_&_O2.5_No")
    );
    assert_eq!(
        Some(Concept::ResultAndBtts(MatchResult::Away, Btts::Yes)),
        to_concept("bp_A_&_BTTS_Yes")
    );
    assert_eq!(
        Some(Concept::DoubleChanceAndTotal(DoubleChance::HomeOrDraw, Total::under(3))),
        to_concept("poisson_1X_&_U3.5")
    );
    assert_eq!(
        Some(Concept::DoubleChanceAndBtts(DoubleChance::DrawOrAway, Btts::No)),
        to_concept("prob_X2_&_BTTS_No")
    );
    assert_eq!(
        Some(Concept::BttsAndTotal(Btts::Yes, Total::over(2))),
        to_concept("prob_BTTS_Yes_&_O2.5")
    );
    assert_eq!(
        Some(Concept::ResultAndBttsAndTotal(MatchResult::Draw, Btts::Yes, Total::over(1))),
        to_concept("prob_D_&_BTTS_Yes_&_O1.5")
    );
    assert_eq!(
        Some(Concept::DoubleChanceAndBttsAndTotal(DoubleChance::HomeOrAway, Btts::No, Total::under(2))),
        to_concept("bp_12_&_BTTS_No_&_U2.5")
    );
}

#[test]
pub fn parse_is_order_independent() {
    assert_eq!(to_concept("prob_H_&_O2.5"), to_concept("prob_O2.5_&_H"));
    assert_eq!(to_concept("prob_BTTS_Yes_&_O2.5"), to_concept("prob_O2.5_&_BTTS_Yes"));
}

#[test]
pub fn parse_scores() {
    assert_eq!(Some(Concept::Score(Score::new(2, 1))), to_concept("score_2-1"));
    assert_eq!(Some(Concept::Score(Score::new(0, 0))), to_concept("score_0-0"));
    assert_eq!(None, to_concept("score_2"));
    assert_eq!(None, to_concept("score_a-1"));
}

#[test]
pub fn unrecognised_keys_are_dropped() {
    for key in [
        "",
        "prob_",
        "prob_Z",
        "prob_H_&_A",
        "prob_H_&_1X",
        "prob_O2.5_&_U3.5",
        "prob_G2-3_&_H",
        "prob_BTTS_Maybe",
        "expected_goals_home",
    ] {
        assert_eq!(None, to_concept(key), "key {key}");
    }
    assert_eq!(
        Err(UnrecognisedKey("prob_Z".into())),
        Concept::from_str("prob_Z")
    );
}

#[test]
pub fn keys_round_trip_in_every_dialect() {
    let mut concepts = Concept::surface();
    concepts.push(Concept::Score(Score::new(3, 1)));
    for model in ModelId::iter() {
        for concept in &concepts {
            let key = concept.to_key(model);
            assert_eq!(Some(*concept), to_concept(&key), "key {key}");
        }
    }
}

#[test]
pub fn dialect_prefixes() {
    let concept = Concept::Total(Total::over(2));
    assert_eq!("prob_O2.5", concept.to_key(ModelId::Simulation));
    assert_eq!("poisson_O2.5", concept.to_key(ModelId::IndependentPoisson));
    assert_eq!("bp_O2.5", concept.to_key(ModelId::BivariatePoisson));
    assert_eq!("score_1-0", Concept::Score(Score::new(1, 0)).to_key(ModelId::BivariatePoisson));
}

#[test]
pub fn surface_is_unique() {
    let surface = Concept::surface();
    let unique = surface.iter().collect::<FxHashSet<_>>();
    assert_eq!(surface.len(), unique.len());
    // 3 + 3 + 2 + 8 + 4 + (24 + 6) + (24 + 6) + 16 + 48 + 48
    assert_eq!(192, surface.len());
}

#[test]
pub fn opposite_is_an_involution() {
    for concept in Concept::surface() {
        if let Some(opposite) = concept.opposite() {
            assert_eq!(Some(concept), opposite.opposite(), "{concept:?}");
            assert_ne!(to_display(&concept), to_display(&opposite), "{concept:?}");
            assert_ne!(concept, opposite);
        }
    }
}

#[test]
pub fn opposite_totality() {
    for concept in Concept::surface() {
        let expect_binary = !matches!(
            concept,
            Concept::Result(_) | Concept::DoubleChance(_) | Concept::GoalBand(_)
        );
        assert_eq!(expect_binary, concept.is_binary(), "{concept:?}");
    }
    assert_eq!(None, Concept::Score(Score::new(1, 1)).opposite());
}

#[test]
pub fn binary_opposites_partition_scores() {
    let concept = Concept::Total(Total::over(2));
    let opposite = concept.opposite().unwrap();
    for home in 0..6 {
        for away in 0..6 {
            let score = Score::new(home, away);
            assert_ne!(concept.matches(&score), opposite.matches(&score));
        }
    }
}

#[test]
pub fn predicates() {
    let score = Score::new(2, 1);
    assert!(Concept::Result(MatchResult::Home).matches(&score));
    assert!(Concept::DoubleChance(DoubleChance::HomeOrDraw).matches(&score));
    assert!(!Concept::DoubleChance(DoubleChance::DrawOrAway).matches(&score));
    assert!(Concept::Btts(Btts::Yes).matches(&score));
    assert!(Concept::Total(Total::over(2)).matches(&score));
    assert!(!Concept::Total(Total::over(3)).matches(&score));
    assert!(Concept::GoalBand(GoalBand::TwoToThree).matches(&score));
    assert!(Concept::ResultAndBttsAndTotal(MatchResult::Home, Btts::Yes, Total::under(3)).matches(&score));
    assert!(Concept::GoalBand(GoalBand::SixPlus).matches(&Score::new(4, 3)));
    assert!(Concept::Score(Score::new(2, 1)).matches(&score));
}

#[test]
pub fn display_labels() {
    assert_eq!("Home Win", Concept::Result(MatchResult::Home).to_string());
    assert_eq!("Over 2.5", Concept::Total(Total::over(2)).to_string());
    assert_eq!("BTTS No", Concept::Btts(Btts::No).to_string());
    assert_eq!(
        "Home or Draw & BTTS Yes & Under 3.5",
        Concept::DoubleChanceAndBttsAndTotal(DoubleChance::HomeOrDraw, Btts::Yes, Total::under(3)).to_string()
    );
    assert_eq!("Correct Score 2-1", Concept::Score(Score::new(2, 1)).to_string());
    assert_eq!("6+ Goals", Concept::GoalBand(GoalBand::SixPlus).to_string());
}

#[test]
pub fn external_markets() {
    let external = |concept: Concept| {
        concept
            .to_external_market()
            .map(|external| (external.market_name, external.selection_label))
    };
    assert_eq!(
        Some(("Match Winner".into(), "Home".into())),
        external(Concept::Result(MatchResult::Home))
    );
    assert_eq!(
        Some(("Goals Over/Under".into(), "Under 1.5".into())),
        external(Concept::Total(Total::under(1)))
    );
    assert_eq!(
        Some(("Both Teams Score".into(), "Yes".into())),
        external(Concept::Btts(Btts::Yes))
    );
    assert_eq!(
        Some(("Double Chance".into(), "Draw/Away".into())),
        external(Concept::DoubleChance(DoubleChance::DrawOrAway))
    );
    assert_eq!(
        Some(("Exact Score".into(), "2:0".into())),
        external(Concept::Score(Score::new(2, 0)))
    );
    assert_eq!(
        Some(("Results/Both Teams Score".into(), "Away/No".into())),
        external(Concept::ResultAndBtts(MatchResult::Away, Btts::No))
    );
    assert_eq!(
        None,
        external(Concept::ResultAndBttsAndTotal(MatchResult::Home, Btts::Yes, Total::over(2)))
    );
}
