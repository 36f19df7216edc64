//! Ace relocation policy with a bounded lookahead.
//!
//! After the discard pass settles, an unmoved ace showing on top of a pile
//! may be moved into an empty pile. With a single movable ace the move is
//! forced. With several, every (ace, empty pile) pair is tried on a copy of
//! the board and scored by [`score`]; a random maximiser is played.
//!
//! The scorer sums discard yields over every continuation rather than
//! following the best one, so a position with many productive follow-ups
//! outscores one with a single strong line.

use itertools::{iproduct, Itertools};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, NUM_PILES};
use crate::discard::discard_pass;
use crate::error::{AcesError, AcesResult};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub const DEFAULT_MAX_DEPTH: usize = 5;
pub const DEFAULT_NODE_LIMIT: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Recursion depth at which the scorer stops and returns 0.
    pub max_depth: usize,
    /// Maximum scorer calls per top-level candidate. Calls past the limit
    /// score 0, as if the depth bound had been hit.
    pub node_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }
}

impl SearchConfig {
    pub fn new(max_depth: usize, node_limit: usize) -> AcesResult<Self> {
        if max_depth == 0 {
            return Err(AcesError::InvalidConfig(
                "search depth must be at least 1".to_string(),
            ));
        }
        if node_limit == 0 {
            return Err(AcesError::InvalidConfig(
                "node limit must be at least 1".to_string(),
            ));
        }
        Ok(SearchConfig {
            max_depth,
            node_limit,
        })
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// Move the top card of pile `from` (an unmoved ace) onto empty pile `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AceMove {
    pub from: usize,
    pub to: usize,
}

/// A candidate move with its lookahead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub ace_move: AceMove,
    pub score: u64,
}

/// Piles whose top card is an ace that has not been relocated yet.
pub fn movable_aces(board: &Board) -> Vec<usize> {
    (0..NUM_PILES)
        .filter(|&i| board.top(i).is_some_and(|c| c.is_movable_ace()))
        .collect()
}

/// Every (movable ace, empty pile) pair on the board.
pub fn legal_moves(board: &Board) -> Vec<AceMove> {
    let empties = board.empty_piles();
    iproduct!(movable_aces(board), empties)
        .filter(|&(from, to)| from != to)
        .map(|(from, to)| AceMove { from, to })
        .collect()
}

/// Apply a move in place and mark the ace as relocated.
///
/// Panics if the source top card is not an unmoved ace or the destination
/// is not empty. Both are caller bugs, never game situations.
pub fn execute_move(board: &mut Board, ace_move: AceMove) {
    let AceMove { from, to } = ace_move;
    assert!(
        board.top(from).is_some_and(|c| c.is_movable_ace()),
        "pile {} has no movable ace on top: {:?}",
        from,
        board.top(from)
    );
    assert!(board.is_pile_empty(to), "pile {} is not empty", to);

    if let Some(ace) = board.pop(from) {
        board.push(to, ace.relocate());
    }
}

/// A copy of `board` with `ace_move` applied.
pub fn simulate_move(board: &Board, ace_move: AceMove) -> Board {
    let mut next = board.clone();
    execute_move(&mut next, ace_move);
    next
}

// ---------------------------------------------------------------------------
// Lookahead
// ---------------------------------------------------------------------------

struct Lookahead<'a> {
    config: &'a SearchConfig,
    nodes: usize,
}

impl<'a> Lookahead<'a> {
    fn new(config: &'a SearchConfig) -> Self {
        Lookahead { config, nodes: 0 }
    }

    fn score(&mut self, mut board: Board, depth: usize) -> u64 {
        if depth >= self.config.max_depth || self.nodes >= self.config.node_limit {
            return 0;
        }
        self.nodes += 1;

        let mut total = discard_pass(&mut board) as u64;
        for ace_move in legal_moves(&board) {
            total += self.score(simulate_move(&board, ace_move), depth + 1);
        }
        total
    }
}

/// Lookahead score of a position: cards discarded on a working copy, plus
/// the scores of every single-ace continuation one level deeper. Returns 0
/// once `depth` reaches `config.max_depth`. Never touches `board`.
pub fn score(board: &Board, depth: usize, config: &SearchConfig) -> u64 {
    Lookahead::new(config).score(board.clone(), depth)
}

/// Score every legal move on `board`.
pub fn evaluate_moves(board: &Board, config: &SearchConfig) -> Vec<ScoredMove> {
    legal_moves(board)
        .into_iter()
        .map(|ace_move| ScoredMove {
            ace_move,
            score: Lookahead::new(config).score(simulate_move(board, ace_move), 0),
        })
        .collect()
}

/// All moves that reach the maximum lookahead score, in enumeration order.
pub fn best_ace_moves(board: &Board, config: &SearchConfig) -> Vec<AceMove> {
    let scored = evaluate_moves(board, config);
    debug!(candidates = ?scored, "scored ace moves");
    scored
        .into_iter()
        .max_set_by_key(|s| s.score)
        .into_iter()
        .map(|s| s.ace_move)
        .collect()
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Pick this round's ace move, if any.
///
/// A single movable ace goes to the lowest empty pile without consulting
/// `rng`. Several movable aces are searched and ties broken uniformly.
pub fn choose_ace_move<R: Rng + ?Sized>(
    board: &Board,
    config: &SearchConfig,
    rng: &mut R,
) -> Option<AceMove> {
    let aces = movable_aces(board);
    let empties = board.empty_piles();

    match (aces.as_slice(), empties.first()) {
        ([], _) | (_, None) => None,
        ([from], Some(&to)) => Some(AceMove { from: *from, to }),
        _ => {
            let best = best_ace_moves(board, config);
            let chosen = best.choose(rng).copied();
            debug!(ties = best.len(), ?chosen, "picked ace move");
            chosen
        }
    }
}

/// Choose and play an ace move, then settle discards again. Returns the move
/// played, if any.
pub fn apply_best_ace_move<R: Rng + ?Sized>(
    board: &mut Board,
    config: &SearchConfig,
    rng: &mut R,
) -> Option<AceMove> {
    let chosen = choose_ace_move(board, config, rng)?;
    execute_move(board, chosen);
    discard_pass(board);
    Some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(piles: [&str; 4]) -> Board {
        Board::from_piles(piles.map(|p| parse_cards(p).unwrap()))
    }

    #[test]
    fn config_rejects_zero_depth() {
        assert!(SearchConfig::new(0, 10).is_err());
        assert!(SearchConfig::new(3, 0).is_err());
        assert_eq!(SearchConfig::new(5, 100_000).unwrap(), SearchConfig::default());
    }

    #[test]
    fn legal_moves_pair_every_ace_with_every_empty() {
        let b = board(["Ah", "As", "", ""]);
        let moves = legal_moves(&b);
        assert_eq!(
            moves,
            vec![
                AceMove { from: 0, to: 2 },
                AceMove { from: 0, to: 3 },
                AceMove { from: 1, to: 2 },
                AceMove { from: 1, to: 3 },
            ]
        );
    }

    #[test]
    fn buried_aces_are_not_movable() {
        let b = board(["Ah 2c", "", "Kd", "3s"]);
        assert!(movable_aces(&b).is_empty());
        assert!(legal_moves(&b).is_empty());
    }

    #[test]
    fn execute_move_relocates_ace() {
        let mut b = board(["Ah", "", "Kd", "3s"]);
        execute_move(&mut b, AceMove { from: 0, to: 1 });
        assert!(b.is_pile_empty(0));
        let ace = b.top(1).unwrap();
        assert!(ace.relocated);
        assert!(movable_aces(&b).is_empty());
    }

    #[test]
    #[should_panic(expected = "no movable ace")]
    fn execute_move_rejects_non_ace() {
        let mut b = board(["Kh", "", "", ""]);
        execute_move(&mut b, AceMove { from: 0, to: 1 });
    }

    #[test]
    #[should_panic(expected = "not empty")]
    fn execute_move_rejects_occupied_destination() {
        let mut b = board(["Ah", "2c", "", ""]);
        execute_move(&mut b, AceMove { from: 0, to: 1 });
    }

    #[test]
    fn score_does_not_mutate_input() {
        let b = board(["Qc Ah", "", "", "Kc"]);
        let before = b.clone();
        score(&b, 0, &SearchConfig::default());
        assert_eq!(b, before);
    }

    #[test]
    fn score_sums_sibling_branches() {
        // Ah can go to pile 1 or pile 2; either way Qc is exposed and
        // discarded under Kc. Both continuations count.
        let b = board(["Qc Ah", "", "", "Kc"]);
        assert_eq!(score(&b, 0, &SearchConfig::default()), 2);
    }

    #[test]
    fn score_respects_depth_bound() {
        let b = board(["Qc Ah", "", "", "Kc"]);
        let shallow = SearchConfig::new(1, 100).unwrap();
        assert_eq!(score(&b, 0, &shallow), 0);
        assert_eq!(score(&b, 5, &SearchConfig::default()), 0);
    }

    #[test]
    fn score_respects_node_limit() {
        let b = board(["Qc Ah", "", "", "Kc"]);
        // Only the root is expanded: no discards at the root.
        let capped = SearchConfig::new(5, 1).unwrap();
        assert_eq!(score(&b, 0, &capped), 0);
        // Root plus the first branch.
        let capped = SearchConfig::new(5, 2).unwrap();
        assert_eq!(score(&b, 0, &capped), 1);
    }

    #[test]
    fn best_move_prefers_productive_ace() {
        // Moving Ah exposes Kd, which drops Qd and frees pile 3 for As.
        // Moving As first exposes 5c and nothing follows.
        let b = board(["Kd Ah", "5c As", "", "Qd"]);
        let scored = evaluate_moves(&b, &SearchConfig::default());
        assert_eq!(scored.len(), 2);
        assert_eq!(best_ace_moves(&b, &SearchConfig::default()), vec![AceMove { from: 0, to: 2 }]);

        let mut rng = StdRng::seed_from_u64(1);
        let mut played = b.clone();
        assert_eq!(
            apply_best_ace_move(&mut played, &SearchConfig::default(), &mut rng),
            Some(AceMove { from: 0, to: 2 })
        );
        assert!(played.is_pile_empty(3), "Qd should be discarded under Kd");
    }

    #[test]
    fn ties_keep_every_maximiser() {
        let b = board(["Ah", "As", "", ""]);
        let best = best_ace_moves(&b, &SearchConfig::default());
        assert_eq!(best.len(), 4);
    }

    #[test]
    fn tie_break_reaches_every_maximiser() {
        let b = board(["Ah", "As", "", ""]);
        let config = SearchConfig::default();
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts = std::collections::HashMap::new();
        for _ in 0..400 {
            let m = choose_ace_move(&b, &config, &mut rng).unwrap();
            *counts.entry(m).or_insert(0usize) += 1;
        }
        assert_eq!(counts.len(), 4);
        for (m, n) in counts {
            assert!(n > 50, "{:?} chosen only {} times out of 400", m, n);
        }
    }

    #[test]
    fn single_ace_goes_to_first_empty_pile() {
        // Unsettled on purpose: 9c is still showing next to Ac.
        let b = board(["5h", "Ac", "", "9c"]);
        let config = SearchConfig::default();

        let mut a = b.clone();
        let mut c = b.clone();
        let m1 = apply_best_ace_move(&mut a, &config, &mut StdRng::seed_from_u64(1));
        let m2 = apply_best_ace_move(&mut c, &config, &mut StdRng::seed_from_u64(2));
        assert_eq!(m1, Some(AceMove { from: 1, to: 2 }));
        assert_eq!(m1, m2);
        assert_eq!(a, c);

        let ace = a.top(2).unwrap();
        assert!(ace.relocated);
        // 9c drops under the ace; 5h has no heart above it.
        assert!(a.is_pile_empty(3));
        assert_eq!(a.top(0).unwrap().to_string(), "5♥");
        assert_eq!(a.card_count(), 2);
    }

    #[test]
    fn no_move_without_empty_pile_or_ace() {
        let config = SearchConfig::default();
        let mut rng = StdRng::seed_from_u64(0);

        let mut full = board(["Ah", "As", "2c", "3d"]);
        assert_eq!(apply_best_ace_move(&mut full, &config, &mut rng), None);

        let mut no_ace = board(["Kh", "", "", ""]);
        assert_eq!(apply_best_ace_move(&mut no_ace, &config, &mut rng), None);

        let mut moved = Board::from_piles([
            vec![parse_cards("Ah").unwrap()[0].relocate()],
            vec![],
            vec![],
            vec![],
        ]);
        assert_eq!(apply_best_ace_move(&mut moved, &config, &mut rng), None);
    }
}
