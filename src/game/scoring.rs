//! Scaled scoring. Card values are fractions of a point (an Ace is worth one point,
//! figures and Twos/Threes a third), so every award during a round is kept in integer
//! thirds and only converted to whole points when the round closes.

use super::cards::Card;

/// Scaled units per real point.
pub const SCALE: u32 = 3;

/// Bonus for taking the last trick of a round: one real point.
pub const LAST_TRICK_BONUS: u32 = SCALE;

pub fn card_points<'a>(cards: impl IntoIterator<Item = &'a Card>) -> u32 {
    cards.into_iter().map(Card::scaled_value).sum()
}

/// Scaled units for an award of `points` whole points.
pub fn scale(points: u32) -> u32 {
    points * SCALE
}

/// Converts a round score to whole points, discarding the remainder.
pub fn to_real_points(scaled: u32) -> u32 {
    scaled / SCALE
}
