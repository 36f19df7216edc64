//! Discard rule: a face-up card goes if a higher face-up card of the same
//! suit is showing on another pile.
//!
//! Each pass has two phases. First the highest visible rank of every suit is
//! collected, then every visible card strictly below its suit's maximum is
//! popped. Popping exposes new top cards, so passes repeat until one removes
//! nothing.

use crate::board::{Board, NUM_PILES};
use crate::card_encoding::CardSet;
use crate::cards::{Card, Rank, ALL_SUITS};

/// Highest visible rank per suit, indexed by `Suit::index`.
fn visible_maxima(board: &Board) -> [Option<Rank>; ALL_SUITS.len()] {
    let mut maxima = [None; ALL_SUITS.len()];
    for card in (0..NUM_PILES).filter_map(|i| board.top(i)) {
        let slot = &mut maxima[card.suit.index()];
        if slot.map_or(true, |best| card.rank > best) {
            *slot = Some(card.rank);
        }
    }
    maxima
}

/// One scan-and-remove cycle. Dominated cards are handed to `on_discard`.
fn single_pass<F: FnMut(Card)>(board: &mut Board, on_discard: &mut F) -> usize {
    let maxima = visible_maxima(board);
    let mut removed = 0;
    for pile in 0..NUM_PILES {
        let dominated = board
            .top(pile)
            .is_some_and(|card| maxima[card.suit.index()].is_some_and(|best| card.rank < best));
        if dominated {
            if let Some(card) = board.pop(pile) {
                on_discard(card);
                removed += 1;
            }
        }
    }
    removed
}

fn run_to_fixed_point<F: FnMut(Card)>(board: &mut Board, mut on_discard: F) -> usize {
    debug_assert!(
        CardSet::from_unique(board.iter_cards()).is_ok(),
        "discard on a board with duplicate cards"
    );
    let mut total = 0;
    loop {
        let removed = single_pass(board, &mut on_discard);
        if removed == 0 {
            return total;
        }
        total += removed;
    }
}

/// Discard dominated face-up cards until nothing more can go. Returns the
/// number of cards removed.
pub fn discard_pass(board: &mut Board) -> usize {
    run_to_fixed_point(board, |_| {})
}

/// Same as [`discard_pass`], but appends every removed card to `discarded`.
pub fn discard_pass_into(board: &mut Board, discarded: &mut Vec<Card>) -> usize {
    run_to_fixed_point(board, |card| discarded.push(card))
}

/// True when no visible card is dominated by another visible card of its suit.
pub fn is_converged(board: &Board) -> bool {
    let maxima = visible_maxima(board);
    (0..NUM_PILES)
        .filter_map(|i| board.top(i))
        .all(|card| maxima[card.suit.index()] == Some(card.rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn board(piles: [&str; 4]) -> Board {
        Board::from_piles(piles.map(|p| parse_cards(p).unwrap()))
    }

    #[test]
    fn removes_lower_card_of_same_suit() {
        let mut b = board(["5h", "Kh", "2c", "9s"]);
        assert_eq!(discard_pass(&mut b), 1);
        assert!(b.is_pile_empty(0));
        assert_eq!(b.card_count(), 3);
    }

    #[test]
    fn different_suits_do_not_interact() {
        let mut b = board(["5h", "Kd", "2c", "9s"]);
        assert_eq!(discard_pass(&mut b), 0);
        assert_eq!(b.card_count(), 4);
    }

    #[test]
    fn cascades_through_exposed_cards() {
        // 9h goes, exposing 3d, which is below Jd.
        let mut b = board(["3d 9h", "Qh", "Jd", "4c"]);
        assert_eq!(discard_pass(&mut b), 2);
        assert!(b.is_pile_empty(0));
        assert!(is_converged(&b));
    }

    #[test]
    fn several_cards_of_one_suit_in_one_pass() {
        let mut b = board(["2s", "5s", "As", "Ts"]);
        assert_eq!(discard_pass(&mut b), 3);
        assert_eq!(b.tops()[2].unwrap().to_string(), "A♠");
        assert_eq!(b.card_count(), 1);
    }

    #[test]
    fn idempotent_at_fixed_point() {
        let mut b = board(["4c 2s 7h", "8h", "Kc 3c", "Qs"]);
        discard_pass(&mut b);
        let converged = b.clone();
        assert_eq!(discard_pass(&mut b), 0);
        assert_eq!(b, converged);
    }

    #[test]
    fn discard_into_collects_removed_cards() {
        let mut b = board(["5h", "Kh", "", "9s"]);
        let mut pile = Vec::new();
        assert_eq!(discard_pass_into(&mut b, &mut pile), 1);
        assert_eq!(pile.len(), 1);
        assert_eq!(pile[0].to_string(), "5♥");
    }

    #[test]
    fn empty_board_is_converged() {
        let mut b = Board::new();
        assert!(is_converged(&b));
        assert_eq!(discard_pass(&mut b), 0);
    }
}
