//! The four piles and the dealer.

use std::collections::VecDeque;
use std::fmt;

use crate::card_encoding::CardSet;
use crate::cards::Card;

pub const NUM_PILES: usize = 4;

/// Top card of every pile, `None` for an empty pile.
pub type TopCards = [Option<Card>; NUM_PILES];

/// Four positionally addressed piles. The last card of each pile is its
/// face-up top card; nothing below the top is ever inspected by the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    piles: [Vec<Card>; NUM_PILES],
}

impl Board {
    pub fn new() -> Self {
        Board::default()
    }

    /// Build a board from explicit piles (bottom card first).
    ///
    /// Panics if any card identity appears twice.
    pub fn from_piles(piles: [Vec<Card>; NUM_PILES]) -> Self {
        let board = Board { piles };
        board.assert_unique();
        board
    }

    pub fn piles(&self) -> &[Vec<Card>; NUM_PILES] {
        &self.piles
    }

    pub fn pile(&self, index: usize) -> &[Card] {
        &self.piles[index]
    }

    pub fn top(&self, index: usize) -> Option<&Card> {
        self.piles[index].last()
    }

    pub fn tops(&self) -> TopCards {
        [0, 1, 2, 3].map(|i| self.top(i).copied())
    }

    pub fn is_pile_empty(&self, index: usize) -> bool {
        self.piles[index].is_empty()
    }

    /// Indices of empty piles, ascending.
    pub fn empty_piles(&self) -> Vec<usize> {
        (0..NUM_PILES).filter(|&i| self.is_pile_empty(i)).collect()
    }

    /// Total cards across all piles.
    pub fn card_count(&self) -> usize {
        self.piles.iter().map(Vec::len).sum()
    }

    pub fn push(&mut self, index: usize, card: Card) {
        self.piles[index].push(card);
    }

    pub fn pop(&mut self, index: usize) -> Option<Card> {
        self.piles[index].pop()
    }

    pub fn iter_cards(&self) -> impl Iterator<Item = &Card> {
        self.piles.iter().flatten()
    }

    /// Panics if two cards on the board share suit and rank.
    pub fn assert_unique(&self) {
        if let Err(dup) = CardSet::from_unique(self.iter_cards()) {
            panic!("duplicate card on board: {}", dup);
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, top) in self.tops().iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            match top {
                Some(card) => write!(f, "{} ({})", card, self.piles[i].len())?,
                None => write!(f, "--")?,
            }
        }
        Ok(())
    }
}

/// Deal one round: up to four cards from the front of `source`, the i-th
/// onto pile i. Returns how many cards were dealt (fewer than four only when
/// the source runs out).
pub fn deal_round(source: &mut VecDeque<Card>, board: &mut Board) -> usize {
    let mut dealt = 0;
    for pile in 0..NUM_PILES {
        match source.pop_front() {
            Some(card) => {
                board.push(pile, card);
                dealt += 1;
            }
            None => break,
        }
    }
    dealt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn source(s: &str) -> VecDeque<Card> {
        parse_cards(s).unwrap().into_iter().collect()
    }

    #[test]
    fn deal_places_one_card_per_pile_in_order() {
        let mut src = source("2h 3h 4h 5h 6h");
        let mut board = Board::new();
        assert_eq!(deal_round(&mut src, &mut board), 4);
        assert_eq!(src.len(), 1);
        assert_eq!(board.top(0).unwrap().to_string(), "2♥");
        assert_eq!(board.top(3).unwrap().to_string(), "5♥");
    }

    #[test]
    fn deal_stacks_on_existing_cards() {
        let mut src = source("2h 3h 4h 5h 6h 7h 8h 9h");
        let mut board = Board::new();
        deal_round(&mut src, &mut board);
        deal_round(&mut src, &mut board);
        assert_eq!(board.pile(1).len(), 2);
        assert_eq!(board.top(1).unwrap().to_string(), "7♥");
        assert_eq!(board.card_count(), 8);
    }

    #[test]
    fn deal_short_source_keeps_alignment() {
        let mut src = source("Ks Qs");
        let mut board = Board::new();
        assert_eq!(deal_round(&mut src, &mut board), 2);
        assert!(src.is_empty());
        assert_eq!(board.top(0).unwrap().to_string(), "K♠");
        assert_eq!(board.top(1).unwrap().to_string(), "Q♠");
        assert_eq!(board.empty_piles(), vec![2, 3]);
    }

    #[test]
    fn deal_from_empty_source_is_noop() {
        let mut src = VecDeque::new();
        let mut board = Board::new();
        assert_eq!(deal_round(&mut src, &mut board), 0);
        assert_eq!(board, Board::new());
    }

    #[test]
    #[should_panic(expected = "duplicate card")]
    fn from_piles_rejects_duplicates() {
        let cards = parse_cards("As As").unwrap();
        Board::from_piles([vec![cards[0]], vec![cards[1]], vec![], vec![]]);
    }
}
