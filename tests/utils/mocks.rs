#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use tokio::sync::mpsc;

use tressette::{game::OutboundSink, websockets::WebSocketMessage};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Collects session output on one ordered channel, tagged with the recipient.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<(String, WebSocketMessage)>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(String, WebSocketMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl OutboundSink for ChannelSink {
    async fn deliver(&self, client_id: &str, message: &WebSocketMessage) {
        let _ = self.tx.send((client_id.to_string(), message.clone()));
    }
}
