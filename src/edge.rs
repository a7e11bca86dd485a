//! Value bets: selections whose model probability beats the bookmaker's price.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Fixture;
use crate::error::ConfigError;
use crate::model::MarketProbabilities;
use crate::odds::OddsBook;
use crate::selection::Selection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub min_probability: f64,
    pub min_edge: f64,
}
impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_probability) {
            return Err(ConfigError::OutOfRange {
                name: "min probability",
                value: self.min_probability,
                range: "[0, 1]".into(),
            });
        }
        if !self.min_edge.is_finite() {
            return Err(ConfigError::OutOfRange {
                name: "min edge",
                value: self.min_edge,
                range: "(-∞, ∞)".into(),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_probability: 0.10,
            min_edge: 0.05,
        }
    }
}

/// The probability implied by decimal odds; `None` unless the odds are positive.
pub fn implied_probability(odds: f64) -> Option<f64> {
    (odds.is_finite() && odds > 0.0).then(|| 1.0 / odds)
}

/// Prices every concept the model reports against the book, returning the selections with
/// `probability ≥ min_probability` and `edge ≥ min_edge`, in descending order of edge. Concepts with
/// no external market, or with no quote in the book, are skipped.
pub fn find_value_bets(
    fixture: &Fixture,
    probabilities: &MarketProbabilities,
    book: &OddsBook,
    min_probability: f64,
    min_edge: f64,
) -> Vec<Selection> {
    let mut priced = 0;
    let mut value_bets = probabilities
        .iter()
        .filter_map(|(concept, probability)| {
            let external = concept.to_external_market()?;
            let odds = book.get(&external.market_name, &external.selection_label)?;
            // odds ≤ 0 carry no implied probability
            implied_probability(odds)?;
            priced += 1;
            Some(Selection::new(
                fixture,
                external.market_name,
                external.selection_label,
                probability,
                odds,
            ))
        })
        .filter(|selection| selection.probability >= min_probability && selection.edge >= min_edge)
        .collect::<Vec<_>>();
    value_bets.sort_by(|a, b| {
        b.edge
            .total_cmp(&a.edge)
            .then_with(|| a.market_name.cmp(&b.market_name))
            .then_with(|| a.selection_label.cmp(&b.selection_label))
    });
    debug!(
        "fixture {}: {} of {priced} priced selections from {} are value",
        fixture.id,
        value_bets.len(),
        probabilities.model
    );
    value_bets
}
