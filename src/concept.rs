//! Canonical, model-independent identities of betting outcomes. Raw outcome keys, in whichever dialect
//! a model renders them, are parsed into a [Concept] here and nowhere else; everything downstream
//! operates on the variant.
//!
//! Key grammar: an optional model prefix (`prob_`, `poisson_`, `bp_`) followed by one or more atoms
//! joined with `_&_`. Atoms are `H`, `D`, `A` (result), `1X`, `X2`, `12` (double chance), `BTTS_Yes`,
//! `BTTS_No`, `O{line}`/`U{line}` with an optional trailing `_No` negating the line, and the goal
//! bands `G0-1`, `G2-3`, `G4-5`, `G6+`. Exact scores are keyed `score_{h}-{a}`.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

use crate::domain::Score;
use crate::model::ModelId;

const COMPOUND_SEPARATOR: &str = "_&_";
const SCORE_PREFIX: &str = "score_";
const NEGATION_SUFFIX: &str = "_No";

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum MatchResult {
    Home,
    Draw,
    Away,
}
impl MatchResult {
    pub fn matches(&self, score: &Score) -> bool {
        match self {
            MatchResult::Home => score.home > score.away,
            MatchResult::Draw => score.home == score.away,
            MatchResult::Away => score.home < score.away,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            MatchResult::Home => "H",
            MatchResult::Draw => "D",
            MatchResult::Away => "A",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MatchResult::Home => "Home",
            MatchResult::Draw => "Draw",
            MatchResult::Away => "Away",
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum DoubleChance {
    HomeOrDraw,
    DrawOrAway,
    HomeOrAway,
}
impl DoubleChance {
    pub fn matches(&self, score: &Score) -> bool {
        match self {
            DoubleChance::HomeOrDraw => score.home >= score.away,
            DoubleChance::DrawOrAway => score.home <= score.away,
            DoubleChance::HomeOrAway => score.home != score.away,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            DoubleChance::HomeOrDraw => "1X",
            DoubleChance::DrawOrAway => "X2",
            DoubleChance::HomeOrAway => "12",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DoubleChance::HomeOrDraw => "Home/Draw",
            DoubleChance::DrawOrAway => "Draw/Away",
            DoubleChance::HomeOrAway => "Home/Away",
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum Btts {
    Yes,
    No,
}
impl Btts {
    pub fn matches(&self, score: &Score) -> bool {
        let both = score.home > 0 && score.away > 0;
        match self {
            Btts::Yes => both,
            Btts::No => !both,
        }
    }

    pub fn flip(&self) -> Self {
        match self {
            Btts::Yes => Btts::No,
            Btts::No => Btts::Yes,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Btts::Yes => "Yes",
            Btts::No => "No",
        }
    }
}

/// A half-goal line: `Line(2)` is the 2.5 line.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Line(pub u8);
impl Line {
    pub fn value(&self) -> f64 {
        self.0 as f64 + 0.5
    }

    fn parse(str: &str) -> Option<Self> {
        let (whole, fraction) = str.split_once('.')?;
        if fraction != "5" {
            return None;
        }
        whole.parse().ok().map(Line)
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.5", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum OverUnder {
    Over,
    Under,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Total {
    pub side: OverUnder,
    pub line: Line,
}
impl Total {
    pub fn over(line: u8) -> Self {
        Self {
            side: OverUnder::Over,
            line: Line(line),
        }
    }

    pub fn under(line: u8) -> Self {
        Self {
            side: OverUnder::Under,
            line: Line(line),
        }
    }

    pub fn matches(&self, score: &Score) -> bool {
        let over = score.total() > self.line.0 as u16;
        match self.side {
            OverUnder::Over => over,
            OverUnder::Under => !over,
        }
    }

    pub fn flip(&self) -> Self {
        let side = match self.side {
            OverUnder::Over => OverUnder::Under,
            OverUnder::Under => OverUnder::Over,
        };
        Self { side, line: self.line }
    }

    fn token(&self) -> String {
        match self.side {
            OverUnder::Over => format!("O{}", self.line),
            OverUnder::Under => format!("U{}", self.line),
        }
    }

    fn label(&self) -> String {
        match self.side {
            OverUnder::Over => format!("Over {}", self.line),
            OverUnder::Under => format!("Under {}", self.line),
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum GoalBand {
    ZeroToOne,
    TwoToThree,
    FourToFive,
    SixPlus,
}
impl GoalBand {
    pub fn matches(&self, score: &Score) -> bool {
        match (self, score.total()) {
            (GoalBand::ZeroToOne, 0..=1) => true,
            (GoalBand::TwoToThree, 2..=3) => true,
            (GoalBand::FourToFive, 4..=5) => true,
            (GoalBand::SixPlus, 6..) => true,
            _ => false,
        }
    }

    fn range(&self) -> &'static str {
        match self {
            GoalBand::ZeroToOne => "0-1",
            GoalBand::TwoToThree => "2-3",
            GoalBand::FourToFive => "4-5",
            GoalBand::SixPlus => "6+",
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Concept {
    Result(MatchResult),
    DoubleChance(DoubleChance),
    Btts(Btts),
    Total(Total),
    GoalBand(GoalBand),
    ResultAndTotal(MatchResult, Total),
    ResultAndBtts(MatchResult, Btts),
    DoubleChanceAndTotal(DoubleChance, Total),
    DoubleChanceAndBtts(DoubleChance, Btts),
    BttsAndTotal(Btts, Total),
    ResultAndBttsAndTotal(MatchResult, Btts, Total),
    DoubleChanceAndBttsAndTotal(DoubleChance, Btts, Total),
    Score(Score),
}

/// The goal lines priced by every model.
pub const LINES: [u8; 4] = [1, 2, 3, 4];

impl Concept {
    pub fn matches(&self, score: &Score) -> bool {
        match self {
            Concept::Result(result) => result.matches(score),
            Concept::DoubleChance(dc) => dc.matches(score),
            Concept::Btts(btts) => btts.matches(score),
            Concept::Total(total) => total.matches(score),
            Concept::GoalBand(band) => band.matches(score),
            Concept::ResultAndTotal(result, total) => result.matches(score) && total.matches(score),
            Concept::ResultAndBtts(result, btts) => result.matches(score) && btts.matches(score),
            Concept::DoubleChanceAndTotal(dc, total) => dc.matches(score) && total.matches(score),
            Concept::DoubleChanceAndBtts(dc, btts) => dc.matches(score) && btts.matches(score),
            Concept::BttsAndTotal(btts, total) => btts.matches(score) && total.matches(score),
            Concept::ResultAndBttsAndTotal(result, btts, total) => {
                result.matches(score) && btts.matches(score) && total.matches(score)
            }
            Concept::DoubleChanceAndBttsAndTotal(dc, btts, total) => {
                dc.matches(score) && btts.matches(score) && total.matches(score)
            }
            Concept::Score(exact) => exact == score,
        }
    }

    /// The concept with every binary component (BTTS, over/under) flipped. `None` for the n-ary
    /// families, which have no single opposite.
    pub fn opposite(&self) -> Option<Concept> {
        match self {
            Concept::Btts(btts) => Some(Concept::Btts(btts.flip())),
            Concept::Total(total) => Some(Concept::Total(total.flip())),
            Concept::ResultAndTotal(result, total) => {
                Some(Concept::ResultAndTotal(*result, total.flip()))
            }
            Concept::ResultAndBtts(result, btts) => Some(Concept::ResultAndBtts(*result, btts.flip())),
            Concept::DoubleChanceAndTotal(dc, total) => {
                Some(Concept::DoubleChanceAndTotal(*dc, total.flip()))
            }
            Concept::DoubleChanceAndBtts(dc, btts) => {
                Some(Concept::DoubleChanceAndBtts(*dc, btts.flip()))
            }
            Concept::BttsAndTotal(btts, total) => Some(Concept::BttsAndTotal(btts.flip(), total.flip())),
            Concept::ResultAndBttsAndTotal(result, btts, total) => Some(
                Concept::ResultAndBttsAndTotal(*result, btts.flip(), total.flip()),
            ),
            Concept::DoubleChanceAndBttsAndTotal(dc, btts, total) => Some(
                Concept::DoubleChanceAndBttsAndTotal(*dc, btts.flip(), total.flip()),
            ),
            Concept::Result(_) | Concept::DoubleChance(_) | Concept::GoalBand(_) | Concept::Score(_) => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.opposite().is_some()
    }

    /// Every non-score concept priced by the models: 1X2, double chance, BTTS, over/under at each of
    /// [LINES], goal bands, and the pairwise and triple-wise compounds with a goal line.
    pub fn surface() -> Vec<Concept> {
        let totals = || {
            LINES
                .iter()
                .flat_map(|&line| [Total::over(line), Total::under(line)])
        };
        let mut concepts = vec![];
        concepts.extend(MatchResult::iter().map(Concept::Result));
        concepts.extend(DoubleChance::iter().map(Concept::DoubleChance));
        concepts.extend(Btts::iter().map(Concept::Btts));
        concepts.extend(totals().map(Concept::Total));
        concepts.extend(GoalBand::iter().map(Concept::GoalBand));
        for result in MatchResult::iter() {
            concepts.extend(totals().map(|total| Concept::ResultAndTotal(result, total)));
            concepts.extend(Btts::iter().map(|btts| Concept::ResultAndBtts(result, btts)));
        }
        for dc in DoubleChance::iter() {
            concepts.extend(totals().map(|total| Concept::DoubleChanceAndTotal(dc, total)));
            concepts.extend(Btts::iter().map(|btts| Concept::DoubleChanceAndBtts(dc, btts)));
        }
        for btts in Btts::iter() {
            concepts.extend(totals().map(|total| Concept::BttsAndTotal(btts, total)));
            for result in MatchResult::iter() {
                concepts.extend(totals().map(|total| Concept::ResultAndBttsAndTotal(result, btts, total)));
            }
            for dc in DoubleChance::iter() {
                concepts.extend(totals().map(|total| Concept::DoubleChanceAndBttsAndTotal(dc, btts, total)));
            }
        }
        concepts
    }

    /// Renders the concept as a raw outcome key in the dialect of the given model.
    pub fn to_key(&self, model: ModelId) -> String {
        match self {
            Concept::Score(score) => format!("{SCORE_PREFIX}{score}"),
            _ => format!("{}{}", model.prefix(), self.atoms().join(COMPOUND_SEPARATOR)),
        }
    }

    fn atoms(&self) -> Vec<String> {
        let btts_token = |btts: &Btts| format!("BTTS_{}", btts.label());
        match self {
            Concept::Result(result) => vec![result.token().into()],
            Concept::DoubleChance(dc) => vec![dc.token().into()],
            Concept::Btts(btts) => vec![btts_token(btts)],
            Concept::Total(total) => vec![total.token()],
            Concept::GoalBand(band) => vec![format!("G{}", band.range())],
            Concept::ResultAndTotal(result, total) => vec![result.token().into(), total.token()],
            Concept::ResultAndBtts(result, btts) => vec![result.token().into(), btts_token(btts)],
            Concept::DoubleChanceAndTotal(dc, total) => vec![dc.token().into(), total.token()],
            Concept::DoubleChanceAndBtts(dc, btts) => vec![dc.token().into(), btts_token(btts)],
            Concept::BttsAndTotal(btts, total) => vec![btts_token(btts), total.token()],
            Concept::ResultAndBttsAndTotal(result, btts, total) => {
                vec![result.token().into(), btts_token(btts), total.token()]
            }
            Concept::DoubleChanceAndBttsAndTotal(dc, btts, total) => {
                vec![dc.token().into(), btts_token(btts), total.token()]
            }
            Concept::Score(score) => vec![score.to_string()],
        }
    }

    /// The bookmaker market and selection names under which this concept is offered, if any.
    pub fn to_external_market(&self) -> Option<ExternalMarket> {
        let (market_name, selection_label) = match self {
            Concept::Result(result) => ("Match Winner", result.label().to_string()),
            Concept::DoubleChance(dc) => ("Double Chance", dc.label().to_string()),
            Concept::Btts(btts) => ("Both Teams Score", btts.label().to_string()),
            Concept::Total(total) => ("Goals Over/Under", total.label()),
            Concept::GoalBand(band) => ("Total Goals Band", band.range().to_string()),
            Concept::ResultAndTotal(result, total) => (
                "Result/Total Goals",
                format!("{}/{}", result.label(), total.label()),
            ),
            Concept::ResultAndBtts(result, btts) => (
                "Results/Both Teams Score",
                format!("{}/{}", result.label(), btts.label()),
            ),
            Concept::DoubleChanceAndTotal(dc, total) => (
                "Double Chance/Total Goals",
                format!("{} & {}", dc.label(), total.label()),
            ),
            Concept::DoubleChanceAndBtts(dc, btts) => (
                "Double Chance/Both Teams Score",
                format!("{} & {}", dc.label(), btts.label()),
            ),
            Concept::BttsAndTotal(btts, total) => (
                "Total Goals/Both Teams Score",
                format!("{}/{}", total.label(), btts.label()),
            ),
            Concept::Score(score) => ("Exact Score", format!("{}:{}", score.home, score.away)),
            Concept::ResultAndBttsAndTotal(_, _, _) | Concept::DoubleChanceAndBttsAndTotal(_, _, _) => {
                return None
            }
        };
        Some(ExternalMarket {
            market_name: market_name.to_string(),
            selection_label,
        })
    }
}

impl Display for Concept {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let result_label = |result: &MatchResult| match result {
            MatchResult::Home => "Home Win",
            MatchResult::Draw => "Draw",
            MatchResult::Away => "Away Win",
        };
        let dc_label = |dc: &DoubleChance| match dc {
            DoubleChance::HomeOrDraw => "Home or Draw",
            DoubleChance::DrawOrAway => "Draw or Away",
            DoubleChance::HomeOrAway => "Home or Away",
        };
        let btts_label = |btts: &Btts| format!("BTTS {}", btts.label());
        match self {
            Concept::Result(result) => write!(f, "{}", result_label(result)),
            Concept::DoubleChance(dc) => write!(f, "{}", dc_label(dc)),
            Concept::Btts(btts) => write!(f, "{}", btts_label(btts)),
            Concept::Total(total) => write!(f, "{}", total.label()),
            Concept::GoalBand(band) => write!(f, "{} Goals", band.range()),
            Concept::ResultAndTotal(result, total) => {
                write!(f, "{} & {}", result_label(result), total.label())
            }
            Concept::ResultAndBtts(result, btts) => {
                write!(f, "{} & {}", result_label(result), btts_label(btts))
            }
            Concept::DoubleChanceAndTotal(dc, total) => write!(f, "{} & {}", dc_label(dc), total.label()),
            Concept::DoubleChanceAndBtts(dc, btts) => write!(f, "{} & {}", dc_label(dc), btts_label(btts)),
            Concept::BttsAndTotal(btts, total) => write!(f, "{} & {}", btts_label(btts), total.label()),
            Concept::ResultAndBttsAndTotal(result, btts, total) => write!(
                f,
                "{} & {} & {}",
                result_label(result),
                btts_label(btts),
                total.label()
            ),
            Concept::DoubleChanceAndBttsAndTotal(dc, btts, total) => write!(
                f,
                "{} & {} & {}",
                dc_label(dc),
                btts_label(btts),
                total.label()
            ),
            Concept::Score(score) => write!(f, "Correct Score {score}"),
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMarket {
    pub market_name: String,
    pub selection_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised outcome key '{0}'")]
pub struct UnrecognisedKey(pub String);

impl FromStr for Concept {
    type Err = UnrecognisedKey;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        to_concept(key).ok_or_else(|| UnrecognisedKey(key.to_string()))
    }
}

/// Parses a raw outcome key from any model dialect. Unrecognised keys yield `None`.
pub fn to_concept(raw_key: &str) -> Option<Concept> {
    let key = raw_key.trim();
    if let Some(score) = key.strip_prefix(SCORE_PREFIX) {
        return parse_score(score).map(Concept::Score);
    }
    let key = ModelId::iter()
        .find_map(|model| key.strip_prefix(model.prefix()))
        .unwrap_or(key);

    let mut parts = Parts::default();
    for atom in key.split(COMPOUND_SEPARATOR) {
        parts.add(parse_atom(atom)?)?;
    }
    parts.assemble()
}

pub fn to_display(concept: &Concept) -> String {
    concept.to_string()
}

fn parse_score(str: &str) -> Option<Score> {
    let (home, away) = str.split_once('-')?;
    Some(Score::new(home.parse().ok()?, away.parse().ok()?))
}

enum Atom {
    Result(MatchResult),
    DoubleChance(DoubleChance),
    Btts(Btts),
    Total(Total),
    GoalBand(GoalBand),
}

fn parse_atom(atom: &str) -> Option<Atom> {
    match atom {
        "H" => return Some(Atom::Result(MatchResult::Home)),
        "D" => return Some(Atom::Result(MatchResult::Draw)),
        "A" => return Some(Atom::Result(MatchResult::Away)),
        "1X" => return Some(Atom::DoubleChance(DoubleChance::HomeOrDraw)),
        "X2" => return Some(Atom::DoubleChance(DoubleChance::DrawOrAway)),
        "12" => return Some(Atom::DoubleChance(DoubleChance::HomeOrAway)),
        "BTTS_Yes" => return Some(Atom::Btts(Btts::Yes)),
        "BTTS_No" => return Some(Atom::Btts(Btts::No)),
        "G0-1" => return Some(Atom::GoalBand(GoalBand::ZeroToOne)),
        "G2-3" => return Some(Atom::GoalBand(GoalBand::TwoToThree)),
        "G4-5" => return Some(Atom::GoalBand(GoalBand::FourToFive)),
        "G6+" => return Some(Atom::GoalBand(GoalBand::SixPlus)),
        _ => {}
    }

    let (atom, negated) = match atom.strip_suffix(NEGATION_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (atom, false),
    };
    let total = if let Some(line) = atom.strip_prefix('O') {
        Total {
            side: OverUnder::Over,
            line: Line::parse(line)?,
        }
    } else if let Some(line) = atom.strip_prefix('U') {
        Total {
            side: OverUnder::Under,
            line: Line::parse(line)?,
        }
    } else {
        return None;
    };
    Some(Atom::Total(if negated { total.flip() } else { total }))
}

#[derive(Default)]
struct Parts {
    result: Option<MatchResult>,
    dc: Option<DoubleChance>,
    btts: Option<Btts>,
    total: Option<Total>,
    band: Option<GoalBand>,
}
impl Parts {
    fn add(&mut self, atom: Atom) -> Option<()> {
        fn fill<T>(slot: &mut Option<T>, value: T) -> Option<()> {
            if slot.is_some() {
                return None;
            }
            *slot = Some(value);
            Some(())
        }
        match atom {
            Atom::Result(result) => fill(&mut self.result, result),
            Atom::DoubleChance(dc) => fill(&mut self.dc, dc),
            Atom::Btts(btts) => fill(&mut self.btts, btts),
            Atom::Total(total) => fill(&mut self.total, total),
            Atom::GoalBand(band) => fill(&mut self.band, band),
        }
    }

    fn assemble(self) -> Option<Concept> {
        match (self.result, self.dc, self.btts, self.total, self.band) {
            (Some(result), None, None, None, None) => Some(Concept::Result(result)),
            (None, Some(dc), None, None, None) => Some(Concept::DoubleChance(dc)),
            (None, None, Some(btts), None, None) => Some(Concept::Btts(btts)),
            (None, None, None, Some(total), None) => Some(Concept::Total(total)),
            (None, None, None, None, Some(band)) => Some(Concept::GoalBand(band)),
            (Some(result), None, None, Some(total), None) => Some(Concept::ResultAndTotal(result, total)),
            (Some(result), None, Some(btts), None, None) => Some(Concept::ResultAndBtts(result, btts)),
            (None, Some(dc), None, Some(total), None) => Some(Concept::DoubleChanceAndTotal(dc, total)),
            (None, Some(dc), Some(btts), None, None) => Some(Concept::DoubleChanceAndBtts(dc, btts)),
            (None, None, Some(btts), Some(total), None) => Some(Concept::BttsAndTotal(btts, total)),
            (Some(result), None, Some(btts), Some(total), None) => {
                Some(Concept::ResultAndBttsAndTotal(result, btts, total))
            }
            (None, Some(dc), Some(btts), Some(total), None) => {
                Some(Concept::DoubleChanceAndBttsAndTotal(dc, btts, total))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
