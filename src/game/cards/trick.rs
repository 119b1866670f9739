use serde::{Deserialize, Serialize};

use super::basic::{Card, Suit};
use crate::game::scoring;

/// A card on the table together with the seat that played it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub card: Card,
    pub player_index: usize,
}

/// The cards played so far in the current trick.
#[derive(Debug, Clone, Default)]
pub struct Trick {
    cards: Vec<PlayedCard>,
    led_suit: Option<Suit>,
}

impl Trick {
    pub const SIZE: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    /// Records a play. The first card of the trick sets the led suit.
    pub fn add_card(&mut self, card: Card, player_index: usize) {
        if self.cards.is_empty() {
            self.led_suit = Some(card.suit);
        }
        self.cards.push(PlayedCard { card, player_index });
    }

    pub fn led_suit(&self) -> Option<Suit> {
        self.led_suit
    }

    pub fn cards(&self) -> Vec<Card> {
        self.cards.iter().map(|pc| pc.card).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cards.len() == Self::SIZE
    }

    /// The highest-strength card of the led suit. `None` for an empty trick or when
    /// no card follows the led suit, both of which the play rules rule out.
    pub fn winner(&self) -> Option<PlayedCard> {
        let led = self.led_suit?;
        self.cards
            .iter()
            .filter(|pc| pc.card.suit == led)
            .max_by_key(|pc| pc.card.strength())
            .copied()
    }

    /// Scaled points carried by the cards in this trick.
    pub fn points(&self) -> u32 {
        scoring::card_points(self.cards.iter().map(|pc| &pc.card))
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.led_suit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::Rank;

    fn trick_of(cards: &[(Rank, Suit)]) -> Trick {
        let mut trick = Trick::new();
        for (seat, (rank, suit)) in cards.iter().enumerate() {
            trick.add_card(Card::new(*rank, *suit), seat);
        }
        trick
    }

    #[test]
    fn test_highest_of_led_suit_wins() {
        let trick = trick_of(&[
            (Rank::King, Suit::Denari),
            (Rank::Three, Suit::Denari),
            (Rank::Ace, Suit::Denari),
            (Rank::Two, Suit::Denari),
        ]);

        let winner = trick.winner().unwrap();
        assert_eq!(winner.player_index, 1);
        assert_eq!(winner.card, Card::new(Rank::Three, Suit::Denari));
    }

    #[test]
    fn test_off_suit_cards_never_win() {
        let trick = trick_of(&[
            (Rank::Four, Suit::Spade),
            (Rank::Three, Suit::Kope),
            (Rank::Two, Suit::Bastoni),
            (Rank::Five, Suit::Spade),
        ]);

        assert_eq!(trick.led_suit(), Some(Suit::Spade));
        assert_eq!(trick.winner().unwrap().player_index, 3);
    }

    #[test]
    fn test_empty_trick_has_no_winner() {
        assert!(Trick::new().winner().is_none());
    }

    #[test]
    fn test_points_of_blank_cards_are_zero() {
        let trick = trick_of(&[
            (Rank::Four, Suit::Spade),
            (Rank::Five, Suit::Spade),
            (Rank::Six, Suit::Spade),
            (Rank::Seven, Suit::Spade),
        ]);
        assert_eq!(trick.points(), 0);
    }

    #[test]
    fn test_points_count_ace_as_full_point() {
        let trick = trick_of(&[
            (Rank::Ace, Suit::Kope),
            (Rank::Four, Suit::Kope),
            (Rank::Five, Suit::Kope),
            (Rank::Six, Suit::Kope),
        ]);
        assert_eq!(trick.points(), 3);
    }

    #[test]
    fn test_clear_resets_led_suit() {
        let mut trick = trick_of(&[(Rank::Ace, Suit::Kope)]);
        trick.clear();
        assert!(trick.is_empty());
        assert!(trick.led_suit().is_none());
    }
}
