use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::game::scoring;

/// The four suits of the Italian 40-card deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Suit {
    Denari,
    Spade,
    Bastoni,
    Kope,
}

impl Suit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suit::Denari => "Denari",
            Suit::Spade => "Spade",
            Suit::Bastoni => "Bastoni",
            Suit::Kope => "Kope",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Suit {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Suit::iter()
            .find(|suit| suit.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Card ranks, written on the wire as "1".."7" and "11".."13".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String", into = "String")]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Jack,
    Knight,
    King,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Ace => "1",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Jack => "11",
            Rank::Knight => "12",
            Rank::King => "13",
        }
    }

    /// Trick-taking strength within a suit. Three is the highest card, Four the lowest.
    pub fn strength(&self) -> u8 {
        match self {
            Rank::Three => 10,
            Rank::Two => 9,
            Rank::Ace => 8,
            Rank::King => 7,
            Rank::Knight => 6,
            Rank::Jack => 5,
            Rank::Seven => 4,
            Rank::Six => 3,
            Rank::Five => 2,
            Rank::Four => 1,
        }
    }

    /// Point value in scaled units (thirds of a point).
    pub fn scaled_value(&self) -> u32 {
        match self {
            Rank::Ace => scoring::SCALE,
            Rank::Two | Rank::Three | Rank::Jack | Rank::Knight | Rank::King => 1,
            Rank::Four | Rank::Five | Rank::Six | Rank::Seven => 0,
        }
    }

    /// The ranks that can be declared: Ace, Two and Three.
    pub fn is_honour(&self) -> bool {
        matches!(self, Rank::Ace | Rank::Two | Rank::Three)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Rank {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Rank::iter()
            .find(|rank| rank.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl TryFrom<String> for Rank {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rank::try_from(s.as_str())
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "WireCard", from = "WireCard")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

/// JSON shape the browser client renders: `{"Suit","Rank","Value","Order"}`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireCard {
    suit: Suit,
    rank: Rank,
    #[serde(default)]
    value: u32,
    #[serde(default)]
    order: u8,
}

impl From<Card> for WireCard {
    fn from(card: Card) -> Self {
        Self {
            suit: card.suit,
            rank: card.rank,
            value: card.scaled_value(),
            order: card.strength(),
        }
    }
}

impl From<WireCard> for Card {
    fn from(wire: WireCard) -> Self {
        Card::new(wire.rank, wire.suit)
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    /// Parses the `suit`/`rank` strings of a `play_card` payload.
    pub fn from_parts(suit: &str, rank: &str) -> Result<Self, String> {
        let suit = Suit::try_from(suit).map_err(|s| format!("unknown suit '{}'", s))?;
        let rank = Rank::try_from(rank).map_err(|r| format!("unknown rank '{}'", r))?;
        Ok(Self::new(rank, suit))
    }

    pub fn strength(&self) -> u8 {
        self.rank.strength()
    }

    pub fn scaled_value(&self) -> u32 {
        self.rank.scaled_value()
    }

    pub fn all_cards() -> Vec<Card> {
        let mut cards = Vec::new();
        for suit in Suit::iter() {
            for rank in Rank::iter() {
                cards.push(Card::new(rank, suit));
            }
        }
        cards
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.rank, self.suit)
    }
}
