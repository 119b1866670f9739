use thiserror::Error;
use tracing::debug;

use crate::game::{SeatRequest, TeamSide, SEATS};
use crate::websockets::PlayerInfo;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Lobby is full")]
    Full,
    #[error("Name already taken")]
    NameTaken,
    #[error("Player not in lobby")]
    NotMember,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyMember {
    pub client_id: String,
    pub name: String,
    pub desired_team: TeamSide,
}

/// Players waiting under a game code, in join order.
#[derive(Debug)]
pub struct Lobby {
    code: String,
    points_goal: u32,
    members: Vec<LobbyMember>,
}

impl Lobby {
    pub fn new(code: String, creator: LobbyMember, points_goal: u32) -> Self {
        Self {
            code,
            points_goal,
            members: vec![creator],
        }
    }

    /// Target score chosen by the creator.
    pub fn points_goal(&self) -> u32 {
        self.points_goal
    }

    pub fn add_member(&mut self, member: LobbyMember) -> Result<(), LobbyError> {
        if self.is_full() {
            debug!(game_code = %self.code, "Lobby is full");
            return Err(LobbyError::Full);
        }

        if self.members.iter().any(|m| m.name == member.name) {
            debug!(game_code = %self.code, name = %member.name, "Name already taken");
            return Err(LobbyError::NameTaken);
        }

        self.members.push(member);
        Ok(())
    }

    pub fn remove_member(&mut self, client_id: &str) -> Result<LobbyMember, LobbyError> {
        let pos = self
            .members
            .iter()
            .position(|m| m.client_id == client_id)
            .ok_or(LobbyError::NotMember)?;
        Ok(self.members.remove(pos))
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.client_id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= SEATS
    }

    /// Roster for `lobby_update`, positions are join order.
    pub fn roster(&self) -> Vec<PlayerInfo> {
        self.members
            .iter()
            .enumerate()
            .map(|(position, m)| PlayerInfo {
                id: m.client_id.clone(),
                name: m.name.clone(),
                position,
            })
            .collect()
    }

    /// The four members in join order, ready to be seated. `None` unless full.
    pub fn into_seat_requests(self) -> Option<[SeatRequest; SEATS]> {
        let requests: Vec<SeatRequest> = self
            .members
            .into_iter()
            .map(|m| SeatRequest {
                id: m.client_id,
                name: m.name,
                desired_team: m.desired_team,
            })
            .collect();
        requests.try_into().ok()
    }
}
