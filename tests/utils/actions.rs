#![allow(dead_code)] // Test utilities may not all be used in every test

use tressette::game::{Card, Suit};

// ============================================================================
// Play Helpers
// ============================================================================

/// Suit of the first card on the table, if any.
pub fn led_suit(table: &[Card]) -> Option<Suit> {
    table.first().map(|card| card.suit)
}

/// A legal card to play: the first one following the led suit, else the first in hand.
pub fn choose_card(hand: &[Card], table: &[Card]) -> Card {
    led_suit(table)
        .and_then(|led| hand.iter().find(|card| card.suit == led))
        .or_else(|| hand.first())
        .copied()
        .expect("hand should not be empty on your turn")
}
