use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// What happened to a message handed to [`ConnectionManager::try_send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Queued,
    /// The client's queue is full or its writer is gone.
    Unreachable,
    /// No connection under that id, typically already disconnected.
    Unknown,
}

#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, client_id: String, sender: mpsc::Sender<String>);

    /// Drops the client's sender, which closes its outbound queue.
    async fn remove_connection(&self, client_id: &str) -> bool;

    /// Enqueues without waiting for room in the client's queue.
    async fn try_send(&self, client_id: &str, message: &str) -> DeliveryStatus;

    async fn connection_count(&self) -> usize;
}

pub struct InMemoryConnectionManager {
    // client id -> sender
    connections: Arc<RwLock<HashMap<String, mpsc::Sender<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, client_id: String, sender: mpsc::Sender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(client_id, sender);
    }

    async fn remove_connection(&self, client_id: &str) -> bool {
        let mut connections = self.connections.write().await;
        connections.remove(client_id).is_some()
    }

    async fn try_send(&self, client_id: &str, message: &str) -> DeliveryStatus {
        let connections = self.connections.read().await;
        match connections.get(client_id) {
            Some(sender) => match sender.try_send(message.to_string()) {
                Ok(()) => DeliveryStatus::Queued,
                Err(_) => DeliveryStatus::Unreachable,
            },
            None => DeliveryStatus::Unknown,
        }
    }

    async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
