//! Deck construction and the shuffle primitive.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::card_encoding::CardSet;
use crate::cards::{parse_cards, Card, ALL_RANKS, ALL_SUITS};
use crate::error::{AcesError, AcesResult};

pub const DECK_SIZE: usize = 52;

/// The 52 cards in suit-major order (hearts, diamonds, clubs, spades; 2 to A).
pub fn standard_deck() -> Vec<Card> {
    ALL_SUITS
        .iter()
        .flat_map(|&suit| ALL_RANKS.iter().map(move |&rank| Card::new(rank, suit)))
        .collect()
}

/// Permute `cards` in place.
pub fn shuffle<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    cards.shuffle(rng);
}

/// A freshly shuffled 52-card deck.
pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = standard_deck();
    shuffle(&mut deck, rng);
    deck
}

/// Parse an explicit deck order. Must name all 52 cards exactly once.
pub fn parse_deck(s: &str) -> AcesResult<Vec<Card>> {
    let cards = parse_cards(s)?;
    if cards.len() != DECK_SIZE {
        return Err(AcesError::InvalidDeck(format!(
            "expected {} cards, got {}",
            DECK_SIZE,
            cards.len()
        )));
    }
    CardSet::from_unique(&cards)
        .map_err(|dup| AcesError::InvalidDeck(format!("{} appears more than once", dup)))?;
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn standard_deck_is_complete() {
        let deck = standard_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        assert!(CardSet::from_unique(&deck).unwrap().is_full());
        assert!(deck.iter().all(|c| !c.relocated));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let deck = shuffled_deck(&mut rng);
        assert_eq!(deck.len(), DECK_SIZE);
        assert!(CardSet::from_unique(&deck).unwrap().is_full());
        assert_ne!(deck, standard_deck());
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let a = shuffled_deck(&mut StdRng::seed_from_u64(42));
        let b = shuffled_deck(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn parse_deck_roundtrips_display() {
        let deck = shuffled_deck(&mut StdRng::seed_from_u64(3));
        let text: Vec<String> = deck.iter().map(|c| c.to_string()).collect();
        assert_eq!(parse_deck(&text.join(" ")).unwrap(), deck);
    }

    #[test]
    fn parse_deck_rejects_short_or_duplicated() {
        assert!(parse_deck("As Kh").is_err());

        let mut text: Vec<String> = standard_deck().iter().map(|c| c.to_string()).collect();
        text[1] = text[0].clone();
        let err = parse_deck(&text.join(" ")).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
