// Library crate for the Tressette game server
// This file exposes the public API for integration tests

pub mod config;
pub mod game;
pub mod hub;
pub mod results;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::Config;
pub use game::{Game, GameSession};
pub use hub::{Hub, HubHandle, HubStats};
pub use results::{GameResult, InMemoryResultRepository, ResultRepository};
pub use shared::{AppError, AppState};
pub use websockets::{
    ConnectionManager, InMemoryConnectionManager, MessageHandler, MessageType, WebSocketMessage,
    WebsocketReceiveHandler,
};
