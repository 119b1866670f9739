use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::game::{Card, Declaration, PlayedCard};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    // Client -> Server
    CreateGame,
    JoinGame,
    PlayCard,
    Declare,
    Ping,

    // Server -> Client
    GameCreated,
    LobbyUpdate,
    JoinError,
    GameStart,
    DealHand,
    YourTurn,
    YouPlayed,
    GameStateUpdate,
    TrickEnd,
    RoundEnd,
    DeclarationConfirmation,
    GameOver,
    PlayerLeft,
    Error,
    Pong,

    /// Any type string this server does not know.
    #[serde(other)]
    Unknown,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGamePayload {
    pub name: String,
    #[serde(default)]
    pub desired_team: u8,
    #[serde(default)]
    pub points_goal: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGamePayload {
    pub name: String,
    pub game_code: String,
    #[serde(default)]
    pub desired_team: u8,
}

/// Suit and rank stay textual so an unknown card reads as "not in hand" rather than a
/// malformed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayCardPayload {
    pub suit: String,
    pub rank: String,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerInfo {
    pub id: String,
    pub name: String,
    pub position: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamInfo {
    pub id: String,
    pub players: Vec<PlayerInfo>,
    pub score: u32,
    pub team_number: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCreatedPayload {
    pub game_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyUpdatePayload {
    pub players: Vec<PlayerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStartPayload {
    pub game_id: String,
    pub players: Vec<PlayerInfo>,
    pub teams: Vec<TeamInfo>,
    pub points_goal: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealHandPayload {
    pub hand: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerIdPayload {
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouPlayedPayload {
    pub player_id: String,
    pub card: Card,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatePayload {
    pub current_player_id: String,
    pub cards_on_table: Vec<Card>,
    /// Current round, scaled units.
    pub team1_score: u32,
    pub team2_score: u32,
    pub game_state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrickEndPayload {
    pub winner: PlayedCard,
    pub winner_id: String,
    pub cards: Vec<Card>,
    /// Scaled units, last-trick bonus included.
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundEndPayload {
    /// Whole points earned this round.
    pub team1_round_score: u32,
    pub team2_round_score: u32,
    pub team1_total_score: u32,
    pub team2_total_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationConfirmationPayload {
    pub team_id: String,
    pub player_id: String,
    /// Scaled units.
    pub points: u32,
    pub declaration: Declaration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub without_suit: Option<crate::game::Suit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOverPayload {
    pub winning_team_id: String,
    pub final_score_t1: u32,
    pub final_score_t2: u32,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: Value) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    fn with<T: Serialize>(message_type: MessageType, payload: T) -> Self {
        Self::new(
            message_type,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes the payload into the type expected for this message.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    pub fn game_created(game_code: String) -> Self {
        Self::with(MessageType::GameCreated, GameCreatedPayload { game_code })
    }

    pub fn lobby_update(players: Vec<PlayerInfo>) -> Self {
        Self::with(MessageType::LobbyUpdate, LobbyUpdatePayload { players })
    }

    pub fn join_error(message: String) -> Self {
        Self::with(MessageType::JoinError, ErrorPayload { message })
    }

    /// Create an ERROR message
    pub fn error(message: String) -> Self {
        Self::with(MessageType::Error, ErrorPayload { message })
    }

    pub fn game_start(
        game_id: String,
        players: Vec<PlayerInfo>,
        teams: Vec<TeamInfo>,
        points_goal: u32,
    ) -> Self {
        Self::with(
            MessageType::GameStart,
            GameStartPayload {
                game_id,
                players,
                teams,
                points_goal,
            },
        )
    }

    /// Private: only ever addressed to the owner of the hand.
    pub fn deal_hand(hand: Vec<Card>) -> Self {
        Self::with(MessageType::DealHand, DealHandPayload { hand })
    }

    pub fn your_turn(player_id: String) -> Self {
        Self::with(MessageType::YourTurn, PlayerIdPayload { player_id })
    }

    pub fn you_played(player_id: String, card: Card) -> Self {
        Self::with(MessageType::YouPlayed, YouPlayedPayload { player_id, card })
    }

    pub fn game_state_update(state: GameStatePayload) -> Self {
        Self::with(MessageType::GameStateUpdate, state)
    }

    pub fn trick_end(winner: PlayedCard, winner_id: String, cards: Vec<Card>, points: u32) -> Self {
        Self::with(
            MessageType::TrickEnd,
            TrickEndPayload {
                winner,
                winner_id,
                cards,
                points,
            },
        )
    }

    pub fn round_end(summary: RoundEndPayload) -> Self {
        Self::with(MessageType::RoundEnd, summary)
    }

    pub fn declaration_confirmation(confirmation: DeclarationConfirmationPayload) -> Self {
        Self::with(MessageType::DeclarationConfirmation, confirmation)
    }

    pub fn game_over(winning_team_id: String, final_score_t1: u32, final_score_t2: u32) -> Self {
        Self::with(
            MessageType::GameOver,
            GameOverPayload {
                winning_team_id,
                final_score_t1,
                final_score_t2,
            },
        )
    }

    pub fn player_left(player_id: String) -> Self {
        Self::with(MessageType::PlayerLeft, PlayerIdPayload { player_id })
    }

    pub fn pong() -> Self {
        Self::new(MessageType::Pong, Value::Object(Default::default()))
    }
}
