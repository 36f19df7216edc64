use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use crate::deck::{parse_deck, shuffled_deck};
use crate::display::{print_simulation, ConsoleSink};
use crate::error::AcesResult;
use crate::game::Game;
use crate::relocation::{SearchConfig, DEFAULT_MAX_DEPTH, DEFAULT_NODE_LIMIT};
use crate::simulation::{run_simulation_with_threads, SimulationConfig, DEFAULT_TRIALS};

#[derive(Parser)]
#[command(name = "acesup", version, about = "Aces Up solitaire simulator")]
struct Cli {
    /// Increase diagnostic output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one game and log every round
    Play {
        /// Seed for the shuffle and tie-breaks
        #[arg(long)]
        seed: Option<u64>,

        /// Explicit deck order instead of a shuffle, e.g. "As 10h Kd ..."
        #[arg(long)]
        deck: Option<String>,

        #[command(flatten)]
        search: SearchArgs,
    },
    /// Estimate the distribution of cards left over many games
    Simulate {
        /// Number of games to play
        #[arg(short = 'n', long, default_value_t = DEFAULT_TRIALS)]
        trials: usize,

        /// Run seed (random if omitted; printed with the results)
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (defaults to rayon's global pool)
        #[arg(long)]
        threads: Option<usize>,

        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also write the JSON results to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Lookahead depth when several aces can move
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    depth: usize,

    /// Maximum lookahead nodes per candidate move
    #[arg(long, default_value_t = DEFAULT_NODE_LIMIT)]
    node_limit: usize,
}

impl SearchArgs {
    fn config(&self) -> AcesResult<SearchConfig> {
        SearchConfig::new(self.depth, self.node_limit)
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Play { seed, deck, search } => cmd_play(seed, deck.as_deref(), &search),
        Command::Simulate {
            trials,
            seed,
            threads,
            json,
            output,
            search,
        } => cmd_simulate(trials, seed, threads, json, output, &search),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn cmd_play(seed: Option<u64>, deck: Option<&str>, search: &SearchArgs) -> AcesResult<()> {
    let config = search.config()?;
    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let source = match deck {
        Some(text) => parse_deck(text)?,
        None => shuffled_deck(&mut rng),
    };

    println!("{}", format!("Seed: {}", seed).dimmed());
    let mut game = Game::new(source, config);
    game.run(&mut rng, &mut ConsoleSink);
    Ok(())
}

fn cmd_simulate(
    trials: usize,
    seed: Option<u64>,
    threads: Option<usize>,
    json: bool,
    output: Option<PathBuf>,
    search: &SearchArgs,
) -> AcesResult<()> {
    let config = SimulationConfig::new(trials, seed, search.config()?)?;
    let result = run_simulation_with_threads(&config, threads)?;

    if json {
        println!("{}", result.to_json()?);
    } else {
        print_simulation(&result);
    }
    if let Some(path) = output {
        result.write_json(&path)?;
        if !json {
            println!("Results written to {}", path.display());
        }
    }
    Ok(())
}
