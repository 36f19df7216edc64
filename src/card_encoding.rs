//! Maps cards to u8 indices (0-51) and back, plus a compact card set.
//!
//! Encoding: index = suit_offset * 13 + rank_offset
//!   suit_offset: 0=Hearts, 1=Diamonds, 2=Clubs, 3=Spades
//!   rank_offset: 0=Two, 1=Three, ..., 12=Ace
//!
//! The relocation flag is not part of a card's identity, so a moved ace
//! maps to the same index as before it moved.

use crate::cards::{Card, ALL_RANKS, ALL_SUITS};

pub fn card_to_index(card: &Card) -> u8 {
    let rank_idx = card.rank as u8 - 2; // Rank::Two = 2
    card.suit.index() as u8 * 13 + rank_idx
}

pub fn index_to_card(index: u8) -> Card {
    Card::new(ALL_RANKS[(index % 13) as usize], ALL_SUITS[(index / 13) as usize])
}

/// A set of card identities, one bit per index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardSet(u64);

impl CardSet {
    pub const FULL: CardSet = CardSet((1u64 << 52) - 1);

    pub fn new() -> Self {
        CardSet(0)
    }

    /// Insert a card. Returns false if its identity was already present.
    pub fn insert(&mut self, card: &Card) -> bool {
        let bit = 1u64 << card_to_index(card);
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.0 & (1u64 << card_to_index(card)) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_full(&self) -> bool {
        *self == CardSet::FULL
    }

    /// Build a set from cards, or return the first duplicated card.
    pub fn from_unique<'a, I>(cards: I) -> Result<CardSet, Card>
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let mut set = CardSet::new();
        for card in cards {
            if !set.insert(card) {
                return Err(*card);
            }
        }
        Ok(set)
    }
}
