use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

use super::logic::{Game, Outgoing, Recipient};
use crate::results::ResultRepository;
use crate::websockets::WebSocketMessage;

/// Where a session sends its messages. Implementations must not wait on the client.
#[async_trait]
pub trait OutboundSink: Send + Sync {
    async fn deliver(&self, client_id: &str, message: &WebSocketMessage);
}

/// A running game plus the collaborators it reports to.
pub struct GameSession {
    code: String,
    game: Mutex<Game>,
    sink: Arc<dyn OutboundSink>,
    results: Arc<dyn ResultRepository>,
}

impl GameSession {
    pub fn new(
        code: String,
        game: Game,
        sink: Arc<dyn OutboundSink>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            code,
            game: Mutex::new(game),
            sink,
            results,
        }
    }

    pub async fn is_over(&self) -> bool {
        self.game.lock().await.is_over()
    }

    pub async fn begin(&self) {
        let mut game = self.game.lock().await;
        game.begin();
        self.flush(&mut game).await;
    }

    pub async fn handle_action(&self, client_id: &str, message: &WebSocketMessage) {
        let mut game = self.game.lock().await;
        game.handle_action(client_id, message);
        self.flush(&mut game).await;
    }

    pub async fn handle_disconnect(&self, client_id: &str) {
        let mut game = self.game.lock().await;
        game.handle_disconnect(client_id);
        self.flush(&mut game).await;
    }

    /// Delivers everything the game queued and stores its result if it just finished.
    async fn flush(&self, game: &mut Game) {
        let outbox = game.take_outbox();
        let player_ids: Vec<String> = game.players().iter().map(|p| p.id.clone()).collect();

        for Outgoing { recipient, message } in outbox {
            match recipient {
                Recipient::All => {
                    for id in &player_ids {
                        self.sink.deliver(id, &message).await;
                    }
                }
                Recipient::Player(id) => self.sink.deliver(&id, &message).await,
            }
        }

        if let Some(result) = game.take_pending_result() {
            match self.results.record(&result).await {
                Ok(()) => info!(game_code = %self.code, game_id = %result.id, "Result recorded"),
                Err(e) => error!(
                    game_code = %self.code,
                    game_id = %result.id,
                    error = %e,
                    "Failed to record result"
                ),
            }
        }
    }
}

#[derive(Debug)]
pub enum SessionCommand {
    Action {
        client_id: String,
        message: WebSocketMessage,
    },
    Disconnect {
        client_id: String,
    },
}

/// The router's way into a running session task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub code: String,
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Queues a command. Returns false once the session task has exited.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.tx.send(command).is_ok()
    }
}

impl GameSession {
    /// Runs the session on its own task until the game is over, then calls
    /// `on_finished` with the game code.
    pub fn spawn<F>(self, on_finished: F) -> SessionHandle
    where
        F: FnOnce(String) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            code: self.code.clone(),
            tx,
        };

        tokio::spawn(async move {
            info!(game_code = %self.code, "Session task started");
            self.begin().await;

            while !self.is_over().await {
                let Some(command) = rx.recv().await else {
                    break;
                };
                match command {
                    SessionCommand::Action { client_id, message } => {
                        self.handle_action(&client_id, &message).await;
                    }
                    SessionCommand::Disconnect { client_id } => {
                        self.handle_disconnect(&client_id).await;
                    }
                }
            }

            // anything queued behind the final move still gets an answer
            rx.close();
            while let Some(command) = rx.recv().await {
                match command {
                    SessionCommand::Action { client_id, message } => {
                        self.handle_action(&client_id, &message).await;
                    }
                    SessionCommand::Disconnect { client_id } => {
                        debug!(
                            game_code = %self.code,
                            client_id = %client_id,
                            "Disconnect after game over"
                        );
                    }
                }
            }

            debug!(game_code = %self.code, "Session task ending");
            on_finished(self.code);
        });

        handle
    }
}
