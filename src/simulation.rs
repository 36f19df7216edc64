//! Monte Carlo trial runner.
//!
//! Plays many independently shuffled games in parallel and tallies how many
//! cards were left on the board (and in the source) at the end of each.
//! Trial `i` draws from its own RNG derived from the run seed and `i`, so a
//! seeded run gives the same tables for any thread count.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::deck::shuffled_deck;
use crate::error::{AcesError, AcesResult};
use crate::game::{play, GameOutcome, NoopSink, WINNING_REMAINDER};
use crate::relocation::SearchConfig;

pub const DEFAULT_TRIALS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub trials: usize,
    /// Run seed. `None` picks a random one, reported in the result.
    pub seed: Option<u64>,
    pub search: SearchConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            trials: DEFAULT_TRIALS,
            seed: None,
            search: SearchConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(trials: usize, seed: Option<u64>, search: SearchConfig) -> AcesResult<Self> {
        if trials == 0 {
            return Err(AcesError::InvalidConfig(
                "at least one trial is required".to_string(),
            ));
        }
        Ok(SimulationConfig {
            trials,
            seed,
            search,
        })
    }
}

/// Frequency tables over all trials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub trials: usize,
    pub seed: u64,
    pub search: Option<SearchConfig>,
    /// Cards left on the board -> number of games.
    pub board_remaining: BTreeMap<usize, u64>,
    /// Cards left undealt -> number of games.
    pub source_remaining: BTreeMap<usize, u64>,
}

impl SimulationResult {
    /// Fraction of games that ended with `remaining` cards on the board.
    pub fn probability(&self, remaining: usize) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.board_remaining.get(&remaining).copied().unwrap_or(0) as f64 / self.trials as f64
    }

    /// Fraction of games that ended with only the four aces left.
    pub fn win_probability(&self) -> f64 {
        self.probability(WINNING_REMAINDER)
    }

    /// Observed outcomes and their probabilities, ascending by remaining count.
    pub fn probabilities(&self) -> Vec<(usize, f64)> {
        self.board_remaining
            .keys()
            .map(|&k| (k, self.probability(k)))
            .collect()
    }

    /// Every remaining count from the lowest to the highest observed, with
    /// unobserved counts at probability 0.
    pub fn distribution(&self) -> Vec<(usize, f64)> {
        let (lo, hi) = match (
            self.board_remaining.keys().next(),
            self.board_remaining.keys().next_back(),
        ) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => return Vec::new(),
        };
        (lo..=hi).map(|k| (k, self.probability(k))).collect()
    }

    pub fn mean_remaining(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        let total: u64 = self
            .board_remaining
            .iter()
            .map(|(&k, &n)| k as u64 * n)
            .sum();
        total as f64 / self.trials as f64
    }

    pub fn to_json(&self) -> AcesResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> AcesResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Win {:.2}% | Mean remaining {:.2} ({} games, seed {})",
            self.win_probability() * 100.0,
            self.mean_remaining(),
            self.trials,
            self.seed,
        )
    }
}

#[derive(Default)]
struct Tally {
    games: usize,
    board: BTreeMap<usize, u64>,
    source: BTreeMap<usize, u64>,
}

impl Tally {
    fn record(&mut self, outcome: &GameOutcome) {
        self.games += 1;
        *self.board.entry(outcome.board_remaining).or_insert(0) += 1;
        *self.source.entry(outcome.source_remaining).or_insert(0) += 1;
    }

    fn merge(mut self, other: Tally) -> Tally {
        self.games += other.games;
        for (k, n) in other.board {
            *self.board.entry(k).or_insert(0) += n;
        }
        for (k, n) in other.source {
            *self.source.entry(k).or_insert(0) += n;
        }
        self
    }
}

/// RNG for one trial of a seeded run.
pub fn trial_rng(seed: u64, trial: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Shuffle a fresh deck and play it.
pub fn play_trial(seed: u64, trial: usize, search: &SearchConfig) -> GameOutcome {
    let mut rng = trial_rng(seed, trial);
    let deck = shuffled_deck(&mut rng);
    play(deck, search, &mut rng, &mut NoopSink)
}

/// Run every trial on the current rayon pool.
pub fn run_simulation(config: &SimulationConfig) -> SimulationResult {
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        trials = config.trials,
        seed,
        max_depth = config.search.max_depth,
        "starting simulation"
    );
    let start = Instant::now();

    let tally = (0..config.trials)
        .into_par_iter()
        .fold(Tally::default, |mut tally, trial| {
            tally.record(&play_trial(seed, trial, &config.search));
            tally
        })
        .reduce(Tally::default, Tally::merge);

    info!(
        games = tally.games,
        elapsed = ?start.elapsed(),
        "simulation complete"
    );

    SimulationResult {
        trials: tally.games,
        seed,
        search: Some(config.search),
        board_remaining: tally.board,
        source_remaining: tally.source,
    }
}

/// Run on a dedicated pool of `threads` workers, or the global pool if `None`.
pub fn run_simulation_with_threads(
    config: &SimulationConfig,
    threads: Option<usize>,
) -> AcesResult<SimulationResult> {
    match threads {
        None => Ok(run_simulation(config)),
        Some(0) => Err(AcesError::InvalidConfig(
            "thread count must be at least 1".to_string(),
        )),
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| AcesError::InvalidConfig(format!("cannot start thread pool: {}", e)))?;
            Ok(pool.install(|| run_simulation(config)))
        }
    }
}
