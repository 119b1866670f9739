use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::cards::{Card, Rank, Suit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// Ace, Two and Three of one suit.
    Napola,
    /// Three or four cards of the same honour rank.
    ThreeOrFourOfKind,
}

/// A bonus claim about a starting hand. Doubles as the `declare` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(rename = "declaration_type")]
    pub kind: DeclarationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suit: Option<Suit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
}

impl Declaration {
    pub fn napola(suit: Suit) -> Self {
        Self {
            kind: DeclarationKind::Napola,
            suit: Some(suit),
            rank: None,
        }
    }

    pub fn of_a_kind(rank: Rank) -> Self {
        Self {
            kind: DeclarationKind::ThreeOrFourOfKind,
            suit: None,
            rank: Some(rank),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationOutcome {
    /// The declaration as recorded, stripped of fields that do not apply to its kind.
    pub declaration: Declaration,
    /// Award in whole points.
    pub points: u32,
    /// For three of a kind, the suit of the rank the player does not hold.
    pub without_suit: Option<Suit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("napola requires a suit")]
    MissingSuit,
    #[error("three or four of a kind requires a rank")]
    MissingRank,
    #[error("rank {0} cannot be declared")]
    RankNotDeclarable(Rank),
    #[error("napola requires the 1, 2 and 3 of {0}")]
    IncompleteNapola(Suit),
    #[error("holding {held} cards of rank {rank}, need 3 or 4")]
    NotEnoughOfKind { rank: Rank, held: usize },
    #[error("already declared this round")]
    AlreadyDeclared,
}

/// Checks `declaration` against the player's current hand and the declarations they
/// have already made this round.
pub fn evaluate(
    hand: &[Card],
    previous: &[Declaration],
    declaration: &Declaration,
) -> Result<DeclarationOutcome, DeclarationError> {
    match declaration.kind {
        DeclarationKind::Napola => {
            let suit = declaration.suit.ok_or(DeclarationError::MissingSuit)?;
            let recorded = Declaration::napola(suit);
            if previous.contains(&recorded) {
                return Err(DeclarationError::AlreadyDeclared);
            }

            let honours = hand
                .iter()
                .filter(|c| c.suit == suit && c.rank.is_honour())
                .count();
            if honours != 3 {
                return Err(DeclarationError::IncompleteNapola(suit));
            }

            Ok(DeclarationOutcome {
                declaration: recorded,
                points: 3,
                without_suit: None,
            })
        }
        DeclarationKind::ThreeOrFourOfKind => {
            let rank = declaration.rank.ok_or(DeclarationError::MissingRank)?;
            if !rank.is_honour() {
                return Err(DeclarationError::RankNotDeclarable(rank));
            }
            let recorded = Declaration::of_a_kind(rank);
            if previous.contains(&recorded) {
                return Err(DeclarationError::AlreadyDeclared);
            }

            let held: Vec<Suit> = hand
                .iter()
                .filter(|c| c.rank == rank)
                .map(|c| c.suit)
                .collect();

            match held.len() {
                3 => Ok(DeclarationOutcome {
                    declaration: recorded,
                    points: 3,
                    without_suit: Suit::iter().find(|s| !held.contains(s)),
                }),
                4 => Ok(DeclarationOutcome {
                    declaration: recorded,
                    points: 4,
                    without_suit: None,
                }),
                n => Err(DeclarationError::NotEnoughOfKind { rank, held: n }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(cards: &[(Rank, Suit)]) -> Vec<Card> {
        cards.iter().map(|(r, s)| Card::new(*r, *s)).collect()
    }

    #[test]
    fn test_napola_requires_all_three_honours() {
        let full = hand(&[
            (Rank::Ace, Suit::Spade),
            (Rank::Two, Suit::Spade),
            (Rank::Three, Suit::Spade),
            (Rank::Four, Suit::Kope),
        ]);
        let outcome = evaluate(&full, &[], &Declaration::napola(Suit::Spade)).unwrap();
        assert_eq!(outcome.points, 3);
        assert_eq!(outcome.without_suit, None);

        let partial = hand(&[(Rank::Ace, Suit::Spade), (Rank::Two, Suit::Spade)]);
        assert_eq!(
            evaluate(&partial, &[], &Declaration::napola(Suit::Spade)),
            Err(DeclarationError::IncompleteNapola(Suit::Spade))
        );
    }

    #[test]
    fn test_napola_only_once_per_suit() {
        let cards = hand(&[
            (Rank::Ace, Suit::Denari),
            (Rank::Two, Suit::Denari),
            (Rank::Three, Suit::Denari),
        ]);
        let previous = [Declaration::napola(Suit::Denari)];
        assert_eq!(
            evaluate(&cards, &previous, &Declaration::napola(Suit::Denari)),
            Err(DeclarationError::AlreadyDeclared)
        );
    }

    #[test]
    fn test_napola_without_suit_is_rejected() {
        let declaration = Declaration {
            kind: DeclarationKind::Napola,
            suit: None,
            rank: Some(Rank::Ace),
        };
        assert_eq!(
            evaluate(&[], &[], &declaration),
            Err(DeclarationError::MissingSuit)
        );
    }

    #[test]
    fn test_three_of_a_kind_reports_missing_suit() {
        let cards = hand(&[
            (Rank::Two, Suit::Denari),
            (Rank::Two, Suit::Spade),
            (Rank::Two, Suit::Kope),
            (Rank::King, Suit::Bastoni),
        ]);
        let outcome = evaluate(&cards, &[], &Declaration::of_a_kind(Rank::Two)).unwrap();
        assert_eq!(outcome.points, 3);
        assert_eq!(outcome.without_suit, Some(Suit::Bastoni));
    }

    #[test]
    fn test_four_of_a_kind_scores_four() {
        let cards = hand(&[
            (Rank::Three, Suit::Denari),
            (Rank::Three, Suit::Spade),
            (Rank::Three, Suit::Bastoni),
            (Rank::Three, Suit::Kope),
        ]);
        let outcome = evaluate(&cards, &[], &Declaration::of_a_kind(Rank::Three)).unwrap();
        assert_eq!(outcome.points, 4);
        assert_eq!(outcome.without_suit, None);
    }

    #[test]
    fn test_two_of_a_kind_is_not_enough() {
        let cards = hand(&[(Rank::Ace, Suit::Denari), (Rank::Ace, Suit::Spade)]);
        assert_eq!(
            evaluate(&cards, &[], &Declaration::of_a_kind(Rank::Ace)),
            Err(DeclarationError::NotEnoughOfKind {
                rank: Rank::Ace,
                held: 2
            })
        );
    }

    #[test]
    fn test_only_honour_ranks_can_be_declared() {
        let cards = hand(&[
            (Rank::King, Suit::Denari),
            (Rank::King, Suit::Spade),
            (Rank::King, Suit::Kope),
        ]);
        assert_eq!(
            evaluate(&cards, &[], &Declaration::of_a_kind(Rank::King)),
            Err(DeclarationError::RankNotDeclarable(Rank::King))
        );
    }

    #[test]
    fn test_kind_declared_once_per_rank() {
        let cards = hand(&[
            (Rank::Ace, Suit::Denari),
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Kope),
        ]);
        let previous = [Declaration::of_a_kind(Rank::Ace)];
        assert_eq!(
            evaluate(&cards, &previous, &Declaration::of_a_kind(Rank::Ace)),
            Err(DeclarationError::AlreadyDeclared)
        );
    }

    #[test]
    fn test_payload_parsing() {
        let parsed: Declaration = serde_json::from_value(serde_json::json!({
            "declaration_type": "three_or_four_of_kind",
            "rank": "2"
        }))
        .unwrap();
        assert_eq!(parsed, Declaration::of_a_kind(Rank::Two));

        let parsed: Declaration = serde_json::from_value(serde_json::json!({
            "declaration_type": "napola",
            "suit": "Kope"
        }))
        .unwrap();
        assert_eq!(parsed, Declaration::napola(Suit::Kope));
    }
}
