use serde::{Deserialize, Serialize};

use super::cards::{Card, Rank, Suit};
use super::declaration::Declaration;
use super::scoring;

pub const SEATS: usize = 4;

/// Which of the two teams a player asked to join. Team One sits in seats 0 and 2,
/// team Two in seats 1 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    One,
    Two,
}

impl TeamSide {
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(TeamSide::One),
            2 => Some(TeamSide::Two),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            TeamSide::One => 1,
            TeamSide::Two => 2,
        }
    }
}

/// A lobby member waiting to be seated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatRequest {
    pub id: String,
    pub name: String,
    pub desired_team: TeamSide,
}

/// Maps seats to join indices. Players are seated on the side they asked for while it
/// has room; once a side holds two players, later joiners go to the other side.
pub fn seat_order(desired: [TeamSide; SEATS]) -> [usize; SEATS] {
    let mut one = Vec::with_capacity(2);
    let mut two = Vec::with_capacity(2);

    for (join_index, side) in desired.iter().enumerate() {
        let (wanted, other) = match side {
            TeamSide::One => (&mut one, &mut two),
            TeamSide::Two => (&mut two, &mut one),
        };
        if wanted.len() < 2 {
            wanted.push(join_index);
        } else {
            other.push(join_index);
        }
    }

    [one[0], two[0], one[1], two[1]]
}

/// Index into the session's team array for a seat.
pub fn team_of_seat(seat: usize) -> usize {
    seat % 2
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub hand: Vec<Card>,
    pub declarations: Vec<Declaration>,
}

impl Player {
    pub fn new(request: SeatRequest) -> Self {
        Self {
            id: request.id,
            name: request.name,
            hand: Vec::new(),
            declarations: Vec::new(),
        }
    }

    /// Replaces the hand for a new round and forgets last round's declarations.
    pub fn take_hand(&mut self, hand: Vec<Card>) {
        self.hand = hand;
        self.declarations.clear();
    }

    pub fn find_card(&self, suit: Suit, rank: Rank) -> Option<Card> {
        self.hand
            .iter()
            .find(|c| c.suit == suit && c.rank == rank)
            .copied()
    }

    pub fn remove_card(&mut self, card: &Card) -> bool {
        match self.hand.iter().position(|c| c == card) {
            Some(pos) => {
                self.hand.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.hand.iter().any(|c| c.suit == suit)
    }
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: String,
    pub number: u8,
    pub seats: [usize; 2],
    /// Current round, in scaled units.
    round_score: u32,
    /// Accumulated over finished rounds, in whole points.
    total_score: u32,
}

impl Team {
    pub fn new(number: u8, seats: [usize; 2]) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            number,
            seats,
            round_score: 0,
            total_score: 0,
        }
    }

    pub fn round_score(&self) -> u32 {
        self.round_score
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn add_score(&mut self, scaled: u32) {
        self.round_score += scaled;
    }

    pub fn reset_round(&mut self) {
        self.round_score = 0;
    }

    /// Moves the round score into the total as whole points and returns what was added.
    pub fn close_round(&mut self) -> u32 {
        let earned = scoring::to_real_points(self.round_score);
        self.total_score += earned;
        self.round_score = 0;
        earned
    }
}
