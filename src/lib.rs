pub mod board;
pub mod card_encoding;
pub mod cards;
pub mod cli;
pub mod deck;
pub mod discard;
pub mod display;
pub mod error;
pub mod game;
pub mod relocation;
pub mod simulation;
