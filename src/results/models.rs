use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the finished games table. Players 1 and 2 form team 1,
/// players 3 and 4 team 2. Scores are whole points.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct GameResult {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub player1: String,
    pub player2: String,
    pub player3: String,
    pub player4: String,
    pub player1_team: u8,
    pub player2_team: u8,
    pub player3_team: u8,
    pub player4_team: u8,
    pub team1_score: u32,
    pub team2_score: u32,
}

impl GameResult {
    /// Builds a record stamped with the current time.
    pub fn new(
        id: String,
        team1: [String; 2],
        team2: [String; 2],
        team1_score: u32,
        team2_score: u32,
    ) -> Self {
        let [player1, player2] = team1;
        let [player3, player4] = team2;
        Self {
            id,
            created_at: Utc::now(),
            player1,
            player2,
            player3,
            player4,
            player1_team: 1,
            player2_team: 1,
            player3_team: 2,
            player4_team: 2,
            team1_score,
            team2_score,
        }
    }

    pub fn players(&self) -> [&str; 4] {
        [&self.player1, &self.player2, &self.player3, &self.player4]
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.players().contains(&name)
    }

    /// Team number of the winner, `None` for a draw.
    pub fn winning_team(&self) -> Option<u8> {
        match self.team1_score.cmp(&self.team2_score) {
            std::cmp::Ordering::Greater => Some(1),
            std::cmp::Ordering::Less => Some(2),
            std::cmp::Ordering::Equal => None,
        }
    }
}
