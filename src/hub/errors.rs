use thiserror::Error;

use super::lobby::LobbyError;

/// Router-level rejections. The text is sent to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("Already in a game or lobby.")]
    AlreadyInGame,

    #[error("Name cannot be empty.")]
    InvalidName,

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("Game code not found.")]
    NotFound,

    #[error("Game lobby is full.")]
    Full,

    #[error("Name already taken in this lobby.")]
    NameTaken,

    #[error("You are not in an active game or lobby.")]
    NotInGame,

    #[error("Game not found or not active.")]
    SessionNotFound,

    #[error("Unknown message type.")]
    UnknownMessageType,

    #[error("Invalid message: {0}")]
    MalformedPayload(String),
}

impl From<LobbyError> for HubError {
    fn from(err: LobbyError) -> Self {
        match err {
            LobbyError::Full => HubError::Full,
            LobbyError::NameTaken => HubError::NameTaken,
            LobbyError::NotMember => HubError::NotInGame,
        }
    }
}
