// Public API
pub use connection_manager::{ConnectionManager, DeliveryStatus, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{
    CreateGamePayload, DeclarationConfirmationPayload, GameStatePayload, JoinGamePayload,
    MessageType, PlayCardPayload, PlayerInfo, RoundEndPayload, TeamInfo, WebSocketMessage,
};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod connection_manager;
mod handler;
mod messages;
mod socket;
