//! Combined and averaged figures of a paper.

use serde::Serialize;

use crate::paper::EfficiencyWeights;
use crate::probs::SliceExt;
use crate::selection::Selection;

/// Products are taken across legs, which presumes the legs are independent. Invalid combinations
/// carry `NaN` products and fail every numeric filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaperMetrics {
    pub combined_odds: f64,
    pub combined_probability: f64,
    pub average_edge: f64,
    pub average_probability: f64,
    pub average_odds: f64,
    pub efficiency_score: f64,
}
impl PaperMetrics {
    pub fn compute(legs: &[Selection], weights: &EfficiencyWeights) -> Self {
        let odds = legs.iter().map(|leg| leg.odds).collect::<Vec<_>>();
        let probabilities = legs.iter().map(|leg| leg.probability).collect::<Vec<_>>();
        let edges = legs.iter().map(|leg| leg.edge).collect::<Vec<_>>();

        let (combined_odds, combined_probability) = if is_combinable(legs) {
            (product(&odds), product(&probabilities))
        } else {
            (f64::NAN, f64::NAN)
        };
        let average_edge = edges.mean();
        let average_probability = probabilities.mean();
        let average_odds = odds.mean();
        Self {
            combined_odds,
            combined_probability,
            average_edge,
            average_probability,
            average_odds,
            efficiency_score: weights.score(average_probability, average_edge, average_odds),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.combined_odds.is_finite() && self.combined_probability.is_finite()
    }
}

fn is_combinable(legs: &[Selection]) -> bool {
    if legs.is_empty() || legs.iter().any(|leg| !(leg.probability > 0.0 && leg.odds > 1.0)) {
        return false;
    }
    legs.len() == 1 || product(legs.iter().map(|leg| leg.odds)) > 1.0
}

fn product(values: impl IntoIterator<Item = impl std::borrow::Borrow<f64>>) -> f64 {
    values.into_iter().map(|value| *value.borrow()).product()
}
