use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::router::HubHandle;
use crate::game::OutboundSink;
use crate::websockets::{ConnectionManager, DeliveryStatus, WebSocketMessage};

/// Session output routed to live connections. A client that cannot take a message is
/// handed back to the router for disconnection instead of being waited on.
pub struct HubSink {
    connections: Arc<dyn ConnectionManager>,
    hub: HubHandle,
}

impl HubSink {
    pub fn new(connections: Arc<dyn ConnectionManager>, hub: HubHandle) -> Self {
        Self { connections, hub }
    }
}

#[async_trait]
impl OutboundSink for HubSink {
    async fn deliver(&self, client_id: &str, message: &WebSocketMessage) {
        let text = match message.to_text() {
            Ok(text) => text,
            Err(e) => {
                error!(client_id = %client_id, error = %e, "Failed to serialize message");
                return;
            }
        };

        match self.connections.try_send(client_id, &text).await {
            DeliveryStatus::Queued => {}
            DeliveryStatus::Unreachable => {
                warn!(client_id = %client_id, "Client unreachable, disconnecting");
                self.hub.unregister(client_id);
            }
            DeliveryStatus::Unknown => {
                debug!(client_id = %client_id, "Dropping message for departed client");
            }
        }
    }
}
