//! Bookmaker odds, normalised from the payload shapes odds providers emit into one lookup of
//! `(market, selection) → decimal odds`.
//!
//! Three shapes are understood, and may be mixed in one document:
//!
//! * flat: `{"Match Winner": {"Home": 2.1, "Draw": "3.4"}}`;
//! * keyed by bookmaker: `{"Pinnacle": [{"name": "Match Winner", "values": [{"value": "Home", "odd": "2.1"}]}]}`;
//! * provider envelope: `{"bookmakers": [{"name": "Pinnacle", "bets": [...]}]}`.
//!
//! Flat entries are taken first, then bookmakers in lexicographic order of name. The first quote for a
//! given market and selection wins. Anything else is ignored.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub odds: f64,
    /// The bookmaker the quote was taken from; `None` for flat entries.
    pub bookmaker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OddsBook {
    quotes: BTreeMap<(String, String), Quote>,
}

#[derive(Debug, Deserialize)]
struct Bookmaker {
    #[serde(default)]
    name: String,
    #[serde(default)]
    bets: Vec<Bet>,
}

#[derive(Debug, Deserialize)]
struct Bet {
    #[serde(alias = "market")]
    name: String,
    #[serde(default)]
    values: Vec<BetValue>,
}

#[derive(Debug, Deserialize)]
struct BetValue {
    #[serde(alias = "selection")]
    value: Value,
    #[serde(alias = "odds")]
    odd: Value,
}

const MARKET_ALIASES: [(&str, &str); 14] = [
    ("1x2", "Match Winner"),
    ("match result", "Match Winner"),
    ("full time result", "Match Winner"),
    ("match_winner", "Match Winner"),
    ("over/under", "Goals Over/Under"),
    ("total goals", "Goals Over/Under"),
    ("goals_over_under", "Goals Over/Under"),
    ("both teams to score", "Both Teams Score"),
    ("btts", "Both Teams Score"),
    ("both_teams_score", "Both Teams Score"),
    ("double_chance", "Double Chance"),
    ("correct score", "Exact Score"),
    ("exact_score", "Exact Score"),
    ("result/both teams score", "Results/Both Teams Score"),
];

const SELECTION_ALIASES: [(&str, &str); 3] = [("1", "home"), ("x", "draw"), ("2", "away")];

fn market_key(market_name: &str) -> String {
    let trimmed = market_name.trim();
    let lowered = trimmed.to_lowercase();
    let canonical = MARKET_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(trimmed);
    canonical.to_lowercase()
}

fn selection_key(market_key: &str, selection_label: &str) -> String {
    let lowered = selection_label.trim().to_lowercase();
    if market_key == "match winner" {
        if let Some((_, canonical)) = SELECTION_ALIASES.iter().find(|(alias, _)| *alias == lowered) {
            return canonical.to_string();
        }
    }
    lowered
}

/// Reads decimal odds from a number or a numeric string. Non-positive and non-finite odds are rejected.
pub fn parse_odds(value: &Value) -> Option<f64> {
    let odds = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(str) => str.trim().parse().ok()?,
        _ => return None,
    };
    (odds.is_finite() && odds > 0.0).then_some(odds)
}

fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(str) => Some(str.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

impl OddsBook {
    /// Records a quote unless one already exists for the market and selection. Returns `true` if the
    /// quote was taken.
    pub fn insert(&mut self, market_name: &str, selection_label: &str, quote: Quote) -> bool {
        let market = market_key(market_name);
        let selection = selection_key(&market, selection_label);
        match self.quotes.entry((market, selection)) {
            Entry::Vacant(entry) => {
                entry.insert(quote);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, market_name: &str, selection_label: &str) -> Option<f64> {
        self.quote(market_name, selection_label).map(|quote| quote.odds)
    }

    pub fn quote(&self, market_name: &str, selection_label: &str) -> Option<&Quote> {
        let market = market_key(market_name);
        let selection = selection_key(&market, selection_label);
        self.quotes.get(&(market, selection))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Normalises an odds payload in any of the understood shapes.
    pub fn from_value(payload: &Value) -> Self {
        let mut book = Self::default();
        let Value::Object(entries) = payload else {
            debug!("odds payload is not an object, ignoring");
            return book;
        };

        let mut bookmakers = vec![];
        for (key, value) in entries {
            match value {
                Value::Object(selections) => {
                    for (selection, odds) in selections {
                        if let Some(odds) = parse_odds(odds) {
                            book.insert(key, selection, Quote { odds, bookmaker: None });
                        }
                    }
                }
                Value::Array(_) if key == "bookmakers" => {
                    match serde_json::from_value::<Vec<Bookmaker>>(value.clone()) {
                        Ok(envelope) => bookmakers.extend(envelope),
                        Err(err) => debug!("unrecognised bookmakers envelope: {err}"),
                    }
                }
                Value::Array(_) => match serde_json::from_value::<Vec<Bet>>(value.clone()) {
                    Ok(bets) => bookmakers.push(Bookmaker {
                        name: key.clone(),
                        bets,
                    }),
                    Err(err) => debug!("unrecognised bets for bookmaker '{key}': {err}"),
                },
                _ => debug!("ignoring odds entry '{key}'"),
            }
        }

        bookmakers.sort_by(|a, b| a.name.cmp(&b.name));
        for bookmaker in bookmakers {
            for bet in &bookmaker.bets {
                for bet_value in &bet.values {
                    let (Some(selection), Some(odds)) = (label_of(&bet_value.value), parse_odds(&bet_value.odd)) else {
                        continue;
                    };
                    book.insert(
                        &bet.name,
                        &selection,
                        Quote {
                            odds,
                            bookmaker: Some(bookmaker.name.clone()),
                        },
                    );
                }
            }
        }
        book
    }
}

impl<'de> Deserialize<'de> for OddsBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let payload = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&payload))
    }
}
