use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::basic::Card;

/// A full 40-card deck, rebuilt at the start of every round.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    pub fn new() -> Self {
        Self {
            cards: Card::all_cards(),
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        debug!(cards = self.cards.len(), "Deck shuffled");
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Deals `per_player` cards to each of `players` hands in consecutive blocks and
    /// empties the deck. Returns `None` when the deck is too small.
    pub fn deal(&mut self, players: usize, per_player: usize) -> Option<Vec<Vec<Card>>> {
        if self.cards.len() < players * per_player {
            return None;
        }

        let hands = self
            .cards
            .chunks(per_player)
            .take(players)
            .map(|chunk| chunk.to_vec())
            .collect();
        self.cards.clear();

        Some(hands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_deal_empties_deck_and_hands_are_disjoint() {
        let mut deck = Deck::new();
        deck.shuffle(&mut StdRng::seed_from_u64(7));

        let hands = deck.deal(4, 10).unwrap();

        assert!(deck.is_empty());
        assert_eq!(hands.len(), 4);
        assert!(hands.iter().all(|h| h.len() == 10));

        let unique: HashSet<Card> = hands.iter().flatten().copied().collect();
        assert_eq!(unique.len(), 40);
    }

    #[test]
    fn test_deal_fails_when_short() {
        let mut deck = Deck::new();
        assert!(deck.deal(5, 10).is_none());
        assert_eq!(deck.len(), 40, "A failed deal must not consume cards");
    }

    #[test]
    fn test_shuffle_keeps_every_card() {
        let mut deck = Deck::new();
        deck.shuffle(&mut StdRng::seed_from_u64(42));
        let mut cards = deck.deal(1, 40).unwrap().remove(0);
        let mut expected = Card::all_cards();
        let key = |c: &Card| (c.suit.as_str(), c.strength());
        cards.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(cards, expected);
    }
}
