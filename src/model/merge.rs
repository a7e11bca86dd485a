//! Merges the models' probabilities into one ranked list of distinct selections.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::concept::{to_display, Concept};
use crate::model::MarketProbabilitySet;
use crate::probs::SliceExt;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSelection {
    pub concept: Concept,
    pub label: String,
    /// Mean over the models that priced the concept.
    pub probability: f64,
    pub models: usize,
}

/// Averages each concept, markets and exact scores alike, across the models that report it and
/// returns the `n` most likely, never keeping a concept together with its opposite.
pub fn top_unique_selections(set: &MarketProbabilitySet, n: usize) -> Vec<RankedSelection> {
    let mut reported: FxHashMap<Concept, Vec<f64>> = FxHashMap::default();
    for probabilities in set.iter() {
        for (&concept, &prob) in &probabilities.markets {
            reported.entry(concept).or_default().push(prob);
        }
        for (&score, &prob) in &probabilities.scores {
            reported.entry(Concept::Score(score)).or_default().push(prob);
        }
    }

    let mut averaged = reported
        .into_iter()
        .map(|(concept, probs)| (concept, probs.mean(), probs.len()))
        .filter(|(_, probability, _)| !probability.is_nan())
        .collect::<Vec<_>>();
    averaged.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut kept = FxHashSet::default();
    let mut selections = Vec::with_capacity(n);
    for (concept, probability, models) in averaged {
        if selections.len() == n {
            break;
        }
        let clashes = kept.contains(&concept)
            || concept.opposite().map_or(false, |opposite| kept.contains(&opposite));
        if clashes {
            continue;
        }
        kept.insert(concept);
        selections.push(RankedSelection {
            concept,
            label: to_display(&concept),
            probability,
            models,
        });
    }
    selections
}
