//! A priced [Selection]: one outcome of one fixture, with the model's probability for it and the
//! bookmaker's odds.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::Fixture;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub fixture_id: u64,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    pub market_name: String,
    pub selection_label: String,
    pub probability: f64,
    pub odds: f64,
    pub edge: f64,
    /// Assigned when the selection is accepted into a candidate pool.
    #[serde(default)]
    pub efficiency_score: Option<f64>,
}
impl Selection {
    pub fn new(
        fixture: &Fixture,
        market_name: impl Into<String>,
        selection_label: impl Into<String>,
        probability: f64,
        odds: f64,
    ) -> Self {
        Self {
            fixture_id: fixture.id,
            league: fixture.league.clone(),
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            market_name: market_name.into(),
            selection_label: selection_label.into(),
            probability,
            odds,
            edge: edge(probability, odds),
            efficiency_score: None,
        }
    }

    pub fn implied_probability(&self) -> f64 {
        1.0 / self.odds
    }

    /// The efficiency score, or `NaN` if the selection has not been scored.
    pub fn efficiency(&self) -> f64 {
        self.efficiency_score.unwrap_or(f64::NAN)
    }

    pub fn with_efficiency(mut self, efficiency_score: f64) -> Self {
        self.efficiency_score = Some(efficiency_score);
        self
    }

    /// Identifies the selection within one generation run of papers.
    pub fn key(&self) -> (u64, String) {
        (self.fixture_id, self.selection_label.clone())
    }

    pub fn involves_team(&self, team: &str) -> bool {
        self.home_team.eq_ignore_ascii_case(team) || self.away_team.eq_ignore_ascii_case(team)
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} v {}: {} {} @ {:.2}",
            self.home_team, self.away_team, self.market_name, self.selection_label, self.odds
        )
    }
}

/// Expected return per unit staked, less the stake.
#[inline]
pub fn edge(probability: f64, odds: f64) -> f64 {
    probability * odds - 1.0
}
