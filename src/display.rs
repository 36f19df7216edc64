//! Terminal output: round-by-round game log and the outcome table.

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::board::TopCards;
use crate::game::{Checkpoint, GameOutcome, RoundSink, WINNING_REMAINDER};
use crate::simulation::SimulationResult;

const BAR_WIDTH: usize = 40;

/// Prints every pile's top card at each checkpoint of every round.
pub struct ConsoleSink;

impl ConsoleSink {
    fn heading(checkpoint: Checkpoint) -> &'static str {
        match checkpoint {
            Checkpoint::Dealt => "Dealing cards...",
            Checkpoint::Discarded => "Discarding lower cards...",
            Checkpoint::Relocated => "Checking and moving aces...",
        }
    }

    fn suffix(checkpoint: Checkpoint) -> &'static str {
        match checkpoint {
            Checkpoint::Dealt => "",
            Checkpoint::Discarded => " after discard",
            Checkpoint::Relocated => " after moving aces",
        }
    }
}

impl RoundSink for ConsoleSink {
    fn checkpoint(&mut self, round: usize, checkpoint: Checkpoint, tops: &TopCards) {
        if checkpoint == Checkpoint::Dealt {
            println!("\n{}", format!("Round {}", round).bold().cyan());
        }
        println!("{}", Self::heading(checkpoint).dimmed());
        println!("{}", format_tops(tops, Self::suffix(checkpoint)));
    }

    fn finished(&mut self, outcome: &GameOutcome) {
        println!("\n{}", "Game Over".bold());
        let remaining = outcome.board_remaining.to_string();
        let remaining = if outcome.is_win() {
            remaining.green().bold()
        } else {
            remaining.yellow()
        };
        println!("Cards remaining on board: {}", remaining);
        println!("Cards remaining in deck:  {}", outcome.source_remaining);
        if outcome.is_win() {
            println!("{}", "Only the aces are left!".green().bold());
        }
    }
}

/// One line per pile, e.g. `  Pile 1 after discard: K♠ (top card)`.
pub fn format_tops(tops: &TopCards, suffix: &str) -> String {
    tops.iter()
        .enumerate()
        .map(|(i, top)| {
            let shown = match top {
                Some(card) if card.relocated => format!("{}*", card.colored()),
                Some(card) => card.colored().to_string(),
                None => "Empty".dimmed().to_string(),
            };
            format!("  Pile {}{}: {} (top card)", i + 1, suffix, shown)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bar(probability: f64, scale: f64) -> String {
    if scale <= 0.0 {
        return String::new();
    }
    let len = ((probability / scale) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len)
}

/// Outcome distribution over the full observed range of remaining counts.
pub fn distribution_table(result: &SimulationResult) -> Table {
    let dist = result.distribution();
    let scale = dist.iter().map(|&(_, p)| p).fold(0.0, f64::max);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Remaining", "Games", "Probability", ""]);

    for (remaining, p) in dist {
        let games = result.board_remaining.get(&remaining).copied().unwrap_or(0);
        let color = if remaining == WINNING_REMAINDER {
            Color::Green
        } else {
            Color::Blue
        };
        table.add_row(vec![
            Cell::new(remaining).set_alignment(CellAlignment::Right),
            Cell::new(games).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", p)).set_alignment(CellAlignment::Right),
            Cell::new(bar(p, scale)).fg(color),
        ]);
    }
    table
}

pub fn print_simulation(result: &SimulationResult) {
    println!("{}", distribution_table(result));
    println!(
        "Probability of ending with exactly four aces: {}",
        format!("{:.5}", result.win_probability()).green().bold()
    );
    println!("{}", result.to_string().dimmed());
}
