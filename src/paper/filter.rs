//! Post-generation filtering and ranking of papers.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

use crate::error::Diagnostic;
use crate::paper::Paper;

/// Optional constraints on a finished paper. League and team names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperFilter {
    /// Every leg must belong to one of these leagues.
    pub leagues: Option<Vec<String>>,
    /// At least one leg must involve one of these teams.
    pub teams: Option<Vec<String>>,
    pub min_combined_odds: Option<f64>,
    pub max_combined_odds: Option<f64>,
    pub min_combined_probability: Option<f64>,
    pub min_average_edge: Option<f64>,
}
impl PaperFilter {
    pub fn accepts(&self, paper: &Paper) -> bool {
        let metrics = &paper.metrics;
        if let Some(leagues) = &self.leagues {
            let allowed = |league: &str| leagues.iter().any(|allowed| allowed.eq_ignore_ascii_case(league));
            if !paper.legs.iter().all(|leg| allowed(&leg.league)) {
                return false;
            }
        }
        if let Some(teams) = &self.teams {
            if !paper.legs.iter().any(|leg| teams.iter().any(|team| leg.involves_team(team))) {
                return false;
            }
        }
        // comparisons against NaN are false, so invalid metrics fail every bound
        at_least(metrics.combined_odds, self.min_combined_odds)
            && at_most(metrics.combined_odds, self.max_combined_odds)
            && at_least(metrics.combined_probability, self.min_combined_probability)
            && at_least(metrics.average_edge, self.min_average_edge)
    }
}

fn at_least(value: f64, bound: Option<f64>) -> bool {
    bound.map_or(true, |bound| value >= bound)
}

fn at_most(value: f64, bound: Option<f64>) -> bool {
    bound.map_or(true, |bound| value <= bound)
}

pub fn apply(papers: Vec<Paper>, filter: &PaperFilter) -> Vec<Paper> {
    let before = papers.len();
    let papers = papers.into_iter().filter(|paper| filter.accepts(paper)).collect::<Vec<_>>();
    debug!("filter kept {} of {before} papers", papers.len());
    papers
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Ranking {
    /// Descending paper efficiency.
    Efficiency,
    /// Descending combined probability, then descending average edge.
    Probability,
}
impl Ranking {
    pub fn sort(&self, papers: &mut [Paper]) {
        match self {
            Ranking::Efficiency => {
                papers.sort_by(|a, b| descending(a.metrics.efficiency_score, b.metrics.efficiency_score))
            }
            Ranking::Probability => papers.sort_by(|a, b| {
                descending(a.metrics.combined_probability, b.metrics.combined_probability)
                    .then_with(|| descending(a.metrics.average_edge, b.metrics.average_edge))
            }),
        }
    }
}

/// Larger values first; `NaN` after every number.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Ranks the papers by the named strategy. An unrecognised name leaves the order untouched and is
/// reported rather than failed.
pub fn rank(papers: &mut [Paper], ranking: &str) -> Option<Diagnostic> {
    match Ranking::from_str(ranking.trim()) {
        Ok(ranking) => {
            ranking.sort(papers);
            None
        }
        Err(_) => {
            warn!("unknown ranking strategy '{ranking}', order left unchanged");
            Some(Diagnostic::UnknownRanking(ranking.into()))
        }
    }
}
