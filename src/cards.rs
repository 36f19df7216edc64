//! Card model for Aces Up.
//!
//! A `Card` is a small `Copy` value. The only state that ever changes is the
//! `relocated` flag on an ace, and that happens by building a new value with
//! [`Card::relocate`] and storing it in place of the old one.

use std::fmt;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::error::{AcesError, AcesResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

impl Suit {
    /// Position in `ALL_SUITS`, used for per-suit lookup tables.
    pub fn index(self) -> usize {
        match self {
            Suit::Hearts => 0,
            Suit::Diamonds => 1,
            Suit::Clubs => 2,
            Suit::Spades => 3,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    fn from_char(c: char) -> Option<Suit> {
        match c.to_ascii_lowercase() {
            'h' | '♥' => Some(Suit::Hearts),
            'd' | '♦' => Some(Suit::Diamonds),
            'c' | '♣' => Some(Suit::Clubs),
            's' | '♠' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// Card rank. The discriminant is the comparison value: 2..10, J=11, Q=12,
/// K=13, A=14, so the derived `Ord` is the game's strict total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

impl Rank {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    fn from_notation(s: &str) -> Option<Rank> {
        let rank = match s.to_ascii_uppercase().as_str() {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "T" | "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            _ => return None,
        };
        Some(rank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    /// Set once an ace has been moved into an empty pile. Never set on
    /// other ranks.
    pub relocated: bool,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card {
            suit,
            rank,
            relocated: false,
        }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }

    /// An ace that has not been moved yet.
    pub fn is_movable_ace(&self) -> bool {
        self.is_ace() && !self.relocated
    }

    /// The same card with its relocation flag set.
    ///
    /// Panics if the card is not an unrelocated ace.
    pub fn relocate(self) -> Card {
        assert!(
            self.is_movable_ace(),
            "only an unrelocated ace can be relocated, got {:?}",
            self
        );
        Card {
            relocated: true,
            ..self
        }
    }

    /// Same suit and rank, ignoring the relocation flag.
    pub fn same_identity(&self, other: &Card) -> bool {
        self.suit == other.suit && self.rank == other.rank
    }

    /// Coloured rendering for terminal output (red suits in red).
    pub fn colored(&self) -> colored::ColoredString {
        let text = self.to_string();
        if self.suit.is_red() {
            text.red().bold()
        } else {
            text.bold()
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

/// Parse a card in short notation: rank then suit, e.g. `As`, `Th`, `10h`, `Q♣`.
pub fn parse_card(notation: &str) -> AcesResult<Card> {
    let notation = notation.trim();
    let mut chars = notation.chars();
    let suit_char = chars
        .next_back()
        .ok_or_else(|| AcesError::InvalidCard(notation.to_string()))?;
    let rank_part = chars.as_str();

    let suit = Suit::from_char(suit_char).ok_or_else(|| AcesError::InvalidCard(notation.to_string()))?;
    let rank = Rank::from_notation(rank_part).ok_or_else(|| AcesError::InvalidCard(notation.to_string()))?;
    Ok(Card::new(rank, suit))
}

/// Parse a whitespace or comma separated list of cards.
pub fn parse_cards(s: &str) -> AcesResult<Vec<Card>> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|tok| !tok.is_empty())
        .map(parse_card)
        .collect()
}
