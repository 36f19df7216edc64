//! Game driver: deal, discard, relocate, repeat until the source is empty.
//!
//! ```text
//! Dealing -> Discarding -> Relocating -+-> Dealing   (source has cards)
//!                                      +-> Terminal  (source exhausted)
//! ```

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::board::{deal_round, Board, TopCards};
use crate::card_encoding::CardSet;
use crate::cards::Card;
use crate::discard::discard_pass_into;
use crate::relocation::{choose_ace_move, execute_move, AceMove, SearchConfig};

/// Cards left on the board when exactly the four aces survive.
pub const WINNING_REMAINDER: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Dealing,
    Discarding,
    Relocating,
    Terminal,
}

/// Points in a round at which the board is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Dealt,
    Discarded,
    Relocated,
}

/// Receives board snapshots while a game is played. The engine never reads
/// anything back, so any implementation (including [`NoopSink`]) is valid.
pub trait RoundSink {
    fn checkpoint(&mut self, round: usize, checkpoint: Checkpoint, tops: &TopCards);

    fn finished(&mut self, _outcome: &GameOutcome) {}
}

pub struct NoopSink;

impl RoundSink for NoopSink {
    fn checkpoint(&mut self, _round: usize, _checkpoint: Checkpoint, _tops: &TopCards) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Cards left across all piles. Lower is better.
    pub board_remaining: usize,
    /// Cards never dealt. Always 0 after a natural finish.
    pub source_remaining: usize,
    pub rounds: usize,
}

impl GameOutcome {
    pub fn is_win(&self) -> bool {
        self.board_remaining == WINNING_REMAINDER
    }
}

/// One game in progress. Owns its source, board and discard pile.
#[derive(Debug, Clone)]
pub struct Game {
    source: VecDeque<Card>,
    board: Board,
    discarded: Vec<Card>,
    moves: Vec<AceMove>,
    phase: Phase,
    round: usize,
    config: SearchConfig,
}

impl Game {
    pub fn new(source: Vec<Card>, config: SearchConfig) -> Self {
        Game::from_position(Board::new(), source, config)
    }

    /// Resume from an arbitrary board with the given cards still to deal.
    ///
    /// Panics if a card identity appears twice across board and source.
    pub fn from_position(board: Board, source: Vec<Card>, config: SearchConfig) -> Self {
        if let Err(dup) = CardSet::from_unique(board.iter_cards().chain(source.iter())) {
            panic!("duplicate card in game: {}", dup);
        }
        let phase = if source.is_empty() {
            Phase::Terminal
        } else {
            Phase::Dealing
        };
        Game {
            source: source.into(),
            board,
            discarded: Vec::new(),
            moves: Vec::new(),
            phase,
            round: 0,
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn source(&self) -> &VecDeque<Card> {
        &self.source
    }

    /// Cards removed from play so far, in discard order.
    pub fn discarded(&self) -> &[Card] {
        &self.discarded
    }

    /// Ace moves played so far.
    pub fn moves(&self) -> &[AceMove] {
        &self.moves
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn outcome(&self) -> GameOutcome {
        GameOutcome {
            board_remaining: self.board.card_count(),
            source_remaining: self.source.len(),
            rounds: self.round,
        }
    }

    /// Perform one state transition and return the new phase.
    pub fn step<R, S>(&mut self, rng: &mut R, sink: &mut S) -> Phase
    where
        R: Rng + ?Sized,
        S: RoundSink + ?Sized,
    {
        self.phase = match self.phase {
            Phase::Dealing => {
                self.round += 1;
                let dealt = deal_round(&mut self.source, &mut self.board);
                trace!(round = self.round, dealt, "dealt");
                sink.checkpoint(self.round, Checkpoint::Dealt, &self.board.tops());
                Phase::Discarding
            }
            Phase::Discarding => {
                let removed = discard_pass_into(&mut self.board, &mut self.discarded);
                trace!(round = self.round, removed, "discarded");
                sink.checkpoint(self.round, Checkpoint::Discarded, &self.board.tops());
                Phase::Relocating
            }
            Phase::Relocating => {
                if let Some(ace_move) = choose_ace_move(&self.board, &self.config, rng) {
                    execute_move(&mut self.board, ace_move);
                    let removed = discard_pass_into(&mut self.board, &mut self.discarded);
                    trace!(round = self.round, ?ace_move, removed, "moved ace");
                    self.moves.push(ace_move);
                }
                sink.checkpoint(self.round, Checkpoint::Relocated, &self.board.tops());
                if self.source.is_empty() {
                    Phase::Terminal
                } else {
                    Phase::Dealing
                }
            }
            Phase::Terminal => Phase::Terminal,
        };
        self.phase
    }

    /// Play through to the end.
    pub fn run<R, S>(&mut self, rng: &mut R, sink: &mut S) -> GameOutcome
    where
        R: Rng + ?Sized,
        S: RoundSink + ?Sized,
    {
        while !self.is_finished() {
            self.step(rng, sink);
        }
        let outcome = self.outcome();
        sink.finished(&outcome);
        outcome
    }
}

/// Play one game over an already shuffled source.
pub fn play<R, S>(source: Vec<Card>, config: &SearchConfig, rng: &mut R, sink: &mut S) -> GameOutcome
where
    R: Rng + ?Sized,
    S: RoundSink + ?Sized,
{
    Game::new(source, *config).run(rng, sink)
}
