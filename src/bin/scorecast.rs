use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use scorecast::concept::{Btts, Concept, MatchResult, Total};
use scorecast::engine::{Batch, Engine};
use scorecast::file::FromJsonFile;
use scorecast::paper::Strategy;
use scorecast::print::{
    tabulate_fixtures, tabulate_models, tabulate_papers, tabulate_reports, tabulate_top_selections,
    tabulate_value_bets,
};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the batch (configuration and fixtures) from
    #[clap(short = 'f', long)]
    file: PathBuf,

    /// print the output as JSON instead of tables
    #[clap(long)]
    json: bool,

    /// paper builder strategy: greedy or exact
    #[clap(long)]
    strategy: Option<Strategy>,

    /// comma-separated paper sizes
    #[clap(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// solve exact papers with HiGHS
    #[cfg(feature = "highs")]
    #[clap(long)]
    highs: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if let Some(sizes) = &self.sizes {
            if sizes.is_empty() || sizes.contains(&0) {
                bail!("paper sizes must be positive");
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut batch = Batch::from_json_file(&args.file)?;
    if let Some(strategy) = args.strategy {
        batch.config.paper.strategy = strategy;
    }
    if let Some(sizes) = &args.sizes {
        batch.config.paper.sizes = sizes.clone();
    }
    if let Err(err) = batch.config.validate() {
        warn!("configuration: {err}");
    }
    debug!("config: {:?}", batch.config);

    let engine = Engine::new(batch.config);
    #[cfg(feature = "highs")]
    let engine = if args.highs {
        engine.with_solver(Box::new(scorecast::paper::solver::highs::HighsSolver))
    } else {
        engine
    };
    let output = engine.run(&batch.fixtures);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Fixtures:\n{}", Console::default().render(&tabulate_fixtures(&output.fixtures)));
    let headline = [
        Concept::Result(MatchResult::Home),
        Concept::Result(MatchResult::Draw),
        Concept::Result(MatchResult::Away),
        Concept::Total(Total::over(2)),
        Concept::Btts(Btts::Yes),
    ];
    for outcome in &output.fixtures {
        let fixture = &outcome.fixture;
        println!(
            "{} v {} ({:.2}, {:.2}):\n{}",
            fixture.home_team,
            fixture.away_team,
            outcome.expected_goals.home,
            outcome.expected_goals.away,
            Console::default().render(&tabulate_models(&outcome.probabilities, &headline))
        );
        println!(
            "Top selections:\n{}",
            Console::default().render(&tabulate_top_selections(&outcome.top_selections))
        );
    }

    let value_bets = output.value_bets().cloned().collect::<Vec<_>>();
    println!("Value bets:\n{}", Console::default().render(&tabulate_value_bets(&value_bets)));
    println!("Papers:\n{}", Console::default().render(&tabulate_papers(&output.papers)));
    println!("Generation:\n{}", Console::default().render(&tabulate_reports(&output.reports)));
    for diagnostic in output.all_diagnostics() {
        info!("{diagnostic}");
    }
    Ok(())
}
