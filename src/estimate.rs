//! Derivation of expected-goal rates from recent scoring and conceding histories.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ExpectedGoals, MatchRecord};
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// League-wide average goals per team per match.
    pub league_baseline: f64,
    pub home_advantage: f64,
    /// Number of most recent matches considered per team.
    pub window: usize,
    pub fallback: ExpectedGoals,
    pub min_rate: f64,
    pub max_rate: f64,
}
impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.league_baseline.is_finite() && self.league_baseline > 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "league baseline",
                value: self.league_baseline,
                range: "(0, ∞)".into(),
            });
        }
        if !self.home_advantage.is_finite() {
            return Err(ConfigError::OutOfRange {
                name: "home advantage",
                value: self.home_advantage,
                range: "(-∞, ∞)".into(),
            });
        }
        if self.window == 0 {
            return Err(ConfigError::OutOfRange {
                name: "history window",
                value: 0.0,
                range: "[1, ∞)".into(),
            });
        }
        if !(self.min_rate >= 0.0 && self.min_rate <= self.max_rate) {
            return Err(ConfigError::OutOfRange {
                name: "min rate",
                value: self.min_rate,
                range: format!("[0, {}]", self.max_rate),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            league_baseline: 1.3,
            home_advantage: 0.3,
            window: 10,
            fallback: ExpectedGoals::new(1.4, 1.1),
            min_rate: 0.5,
            max_rate: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub expected_goals: ExpectedGoals,
    /// Set when either side lacked usable history and the fixed fallback pair was returned.
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Averages {
    goals_for: f64,
    goals_against: f64,
}

/// Estimates the expected goals for a fixture from the two sides' histories. Only matches strictly
/// before `as_of` (if given) count, newest first, up to the configured window. Never fails: missing
/// history or an invalid configuration yields the fallback pair.
pub fn estimate(
    home_history: &[MatchRecord],
    away_history: &[MatchRecord],
    as_of: Option<NaiveDate>,
    config: &Config,
) -> Estimate {
    let fallback = Estimate {
        expected_goals: config.fallback,
        fallback: true,
    };
    if config.validate().is_err() {
        return fallback;
    }

    let (home, away) = match (
        averages(home_history, as_of, config.window),
        averages(away_history, as_of, config.window),
    ) {
        (Some(home), Some(away)) => (home, away),
        _ => {
            debug!("insufficient history, falling back to {:?}", config.fallback);
            return fallback;
        }
    };

    let baseline = config.league_baseline;
    let home_attack = home.goals_for / baseline;
    let away_attack = away.goals_for / baseline;
    let home_defense = defense(baseline, home.goals_against);
    let away_defense = defense(baseline, away.goals_against);

    let home_rate = home_attack * (2.0 - away_defense) * baseline + config.home_advantage;
    let away_rate = away_attack * (2.0 - home_defense) * baseline;
    let expected_goals = ExpectedGoals::new(
        home_rate.clamp(config.min_rate, config.max_rate),
        away_rate.clamp(config.min_rate, config.max_rate),
    );
    debug!("home: {home:?}, away: {away:?}, expected goals: {expected_goals:?}");
    Estimate {
        expected_goals,
        fallback: false,
    }
}

fn averages(history: &[MatchRecord], as_of: Option<NaiveDate>, window: usize) -> Option<Averages> {
    let mut usable = history
        .iter()
        .filter(|record| as_of.map_or(true, |as_of| record.date < as_of))
        .collect::<Vec<_>>();
    if usable.is_empty() {
        return None;
    }
    usable.sort_by(|a, b| b.date.cmp(&a.date));
    usable.truncate(window);

    let matches = usable.len() as f64;
    let goals_for = usable.iter().map(|record| record.goals_for as f64).sum::<f64>();
    let goals_against = usable.iter().map(|record| record.goals_against as f64).sum::<f64>();
    Some(Averages {
        goals_for: goals_for / matches,
        goals_against: goals_against / matches,
    })
}

#[inline]
fn defense(baseline: f64, goals_against: f64) -> f64 {
    if goals_against == 0.0 {
        1.0
    } else {
        baseline / goals_against
    }
}
