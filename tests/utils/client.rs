//! A fake browser: owns the outbound queue the hub writes to and submits envelopes
//! the way the socket handler would.
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use tressette::{
    game::Card,
    hub::HubHandle,
    websockets::{MessageType, WebSocketMessage},
};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TestClient {
    pub id: String,
    hub: HubHandle,
    rx: mpsc::Receiver<String>,
}

impl TestClient {
    pub async fn connect(hub: &HubHandle, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        let id = hub.register(tx).await.expect("hub should be running");
        Self {
            id,
            hub: hub.clone(),
            rx,
        }
    }

    pub fn send(&self, message_type: MessageType, payload: Value) {
        self.hub
            .submit(&self.id, WebSocketMessage::new(message_type, payload));
    }

    /// Sends a raw frame through the same parsing path as a socket.
    pub fn send_raw(&self, text: &str) {
        match WebSocketMessage::parse(text) {
            Ok(message) => self.hub.submit(&self.id, message),
            Err(e) => self.hub.protocol_error(&self.id, e.to_string()),
        }
    }

    pub fn create_game(&self, name: &str, team: u8, points_goal: u32) {
        self.send(
            MessageType::CreateGame,
            json!({ "name": name, "desired_team": team, "points_goal": points_goal }),
        );
    }

    pub fn join_game(&self, name: &str, code: &str, team: u8) {
        self.send(
            MessageType::JoinGame,
            json!({ "name": name, "game_code": code, "desired_team": team }),
        );
    }

    pub fn play(&self, card: &Card) {
        self.send(
            MessageType::PlayCard,
            json!({ "suit": card.suit.as_str(), "rank": card.rank.as_str() }),
        );
    }

    pub fn disconnect(&self) {
        self.hub.unregister(&self.id);
    }

    /// Next message, panicking if none arrives in time.
    pub async fn recv(&mut self) -> WebSocketMessage {
        let text = timeout(RECV_TIMEOUT, self.rx.recv())
            .await
            .unwrap_or_else(|_| panic!("{} timed out waiting for a message", self.id))
            .unwrap_or_else(|| panic!("{} was disconnected", self.id));
        WebSocketMessage::parse(&text).unwrap()
    }

    /// Skips ahead to the next message of the given type.
    pub async fn expect(&mut self, expected: MessageType) -> WebSocketMessage {
        loop {
            let message = self.recv().await;
            if message.message_type == expected {
                return message;
            }
        }
    }

    /// Everything queued right now, without waiting.
    pub fn drain(&mut self) -> Vec<WebSocketMessage> {
        let mut messages = Vec::new();
        while let Ok(text) = self.rx.try_recv() {
            messages.push(WebSocketMessage::parse(&text).unwrap());
        }
        messages
    }

    /// True once the hub has dropped this client's queue.
    pub async fn is_closed(&mut self) -> bool {
        self.drain();
        matches!(
            timeout(Duration::from_millis(200), self.rx.recv()).await,
            Ok(None)
        )
    }
}
