use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::hub::HubHandle;
use crate::shared::AppState;
use crate::websockets::messages::WebSocketMessage;

use super::socket::{Connection, MessageHandler};

/// Parses inbound frames and forwards them to the router
pub struct WebsocketReceiveHandler {
    hub: HubHandle,
}

impl WebsocketReceiveHandler {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, client_id: &str, message: String) {
        debug!(client_id = %client_id, message = %message, "Received message");

        match WebSocketMessage::parse(&message) {
            Ok(ws_message) => self.hub.submit(client_id, ws_message),
            Err(e) => {
                warn!(
                    client_id = %client_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                self.hub.protocol_error(client_id, e.to_string());
            }
        }
    }
}

/// WebSocket endpoint. GET /ws
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    info!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let (outbound_sender, outbound_receiver) =
        mpsc::channel::<String>(app_state.config.outbound_capacity);

    let Some(client_id) = app_state.hub.register(outbound_sender).await else {
        warn!("Hub unavailable, dropping WebSocket connection");
        return;
    };
    info!(client_id = %client_id, "WebSocket connection established");

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state.hub.clone()));
    let connection = Connection::new(
        client_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => {
            info!(client_id = %client_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(client_id = %client_id, error = %e, "WebSocket connection error");
        }
    }

    app_state.hub.unregister(&client_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Hub;
    use crate::results::InMemoryResultRepository;
    use crate::websockets::{InMemoryConnectionManager, MessageType};
    use std::time::Duration;

    #[tokio::test]
    async fn test_frames_are_parsed_and_forwarded() {
        let hub = Hub::new(
            Arc::new(InMemoryConnectionManager::new()),
            Arc::new(InMemoryResultRepository::new()),
            31,
        )
        .spawn();
        let (tx, mut rx) = mpsc::channel(8);
        let client_id = hub.register(tx).await.unwrap();
        let handler = WebsocketReceiveHandler::new(hub.clone());

        handler
            .handle_message(&client_id, r#"{"type":"ping"}"#.to_string())
            .await;
        let reply = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            WebSocketMessage::parse(&reply).unwrap().message_type,
            MessageType::Pong
        );

        handler
            .handle_message(&client_id, "not json".to_string())
            .await;
        let reply = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let reply = WebSocketMessage::parse(&reply).unwrap();
        assert_eq!(reply.message_type, MessageType::Error);
        assert!(reply.payload["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid message:"));
    }
}
