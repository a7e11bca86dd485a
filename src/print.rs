use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::concept::Concept;
use crate::engine::FixtureOutcome;
use crate::model::{MarketProbabilitySet, ModelId, RankedSelection};
use crate::paper::{GenerationReport, Paper};
use crate::selection::Selection;

fn left(min_width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(min_width)).with(Left))
}

fn right(min_width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(min_width)).with(HAlign::Right))
}

fn header(cells: &[&str]) -> Row {
    Row::new(
        Styles::default().with(Header(true)),
        cells.iter().map(|&cell| cell.into()).collect(),
    )
}

pub fn tabulate_value_bets(value_bets: &[Selection]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![left(20), left(16), left(12), right(8), right(8), right(8), right(8)])
        .with_row(header(&["Fixture", "Market", "Selection", "Prob", "Implied", "Odds", "Edge"]));
    for selection in value_bets {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{} v {}", selection.home_team, selection.away_team).into(),
                selection.market_name.clone().into(),
                selection.selection_label.clone().into(),
                format!("{:.3}", selection.probability).into(),
                format!("{:.3}", selection.implied_probability()).into(),
                format!("{:.2}", selection.odds).into(),
                format!("{:+.3}", selection.edge).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_top_selections(top_selections: &[RankedSelection]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![right(4), left(28), right(10), right(6)])
        .with_row(header(&["#", "Selection", "Prob", "Models"]));
    for (rank, selection) in top_selections.iter().enumerate() {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", rank + 1).into(),
                selection.label.clone().into(),
                format!("{:.4}", selection.probability).into(),
                format!("{}", selection.models).into(),
            ],
        ));
    }
    table
}

/// Side-by-side probabilities of the models for a few headline markets.
pub fn tabulate_models(probabilities: &MarketProbabilitySet, concepts: &[Concept]) -> Table {
    let models = probabilities.models().collect::<Vec<ModelId>>();
    let mut cols = vec![left(16)];
    cols.extend(models.iter().map(|_| right(12)));
    let mut header_cells = vec!["Market".into()];
    header_cells.extend(models.iter().map(|model| model.to_string().into()));
    let mut table = Table::default()
        .with_cols(cols)
        .with_row(Row::new(Styles::default().with(Header(true)).with(Separator(true)), header_cells));
    for concept in concepts {
        let mut row_cells = vec![concept.to_string().into()];
        for &model in &models {
            let prob = probabilities.get(model).and_then(|probabilities| probabilities.get(concept));
            row_cells.push(prob.map_or_else(|| "-".to_string(), |prob| format!("{prob:.4}")).into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

pub fn tabulate_papers(papers: &[Paper]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![right(4), left(48), right(10), right(10), right(8), right(10)])
        .with_row(header(&["#", "Legs", "Odds", "Prob", "Avg edge", "Efficiency"]));
    for (rank, paper) in papers.iter().enumerate() {
        let legs = paper
            .legs
            .iter()
            .map(|leg| leg.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", rank + 1).into(),
                legs.into(),
                format!("{:.2}", paper.metrics.combined_odds).into(),
                format!("{:.4}", paper.metrics.combined_probability).into(),
                format!("{:+.3}", paper.metrics.average_edge).into(),
                format!("{:.4}", paper.metrics.efficiency_score).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_reports(reports: &[GenerationReport]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![right(5), right(10), right(8)])
        .with_row(header(&["Size", "Attempted", "Emitted"]));
    for report in reports {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", report.size).into(),
                format!("{}", report.attempted).into(),
                format!("{}", report.emitted).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_fixtures(fixtures: &[FixtureOutcome]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![right(6), left(12), left(30), right(8), right(8), left(9), right(6)])
        .with_row(header(&["Id", "League", "Fixture", "xG home", "xG away", "Fallback", "Value"]));
    for outcome in fixtures {
        let fixture = &outcome.fixture;
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", fixture.id).into(),
                fixture.league.clone().into(),
                format!("{} v {}", fixture.home_team, fixture.away_team).into(),
                format!("{:.2}", outcome.expected_goals.home).into(),
                format!("{:.2}", outcome.expected_goals.away).into(),
                if outcome.fallback { "yes" } else { "no" }.into(),
                format!("{}", outcome.value_bets.len()).into(),
            ],
        ));
    }
    table
}
