pub mod basic;
pub mod deck;
pub mod trick;

pub use basic::{Card, Rank, Suit};
pub use deck::Deck;
pub use trick::{PlayedCard, Trick};
