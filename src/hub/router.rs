use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::codes::{self, CodeGenerator, RandomCodeGenerator};
use super::errors::HubError;
use super::lobby::{Lobby, LobbyMember};
use super::sink::HubSink;
use crate::game::{Game, GameSession, SessionCommand, SessionHandle, TeamSide};
use crate::results::ResultRepository;
use crate::websockets::{
    ConnectionManager, CreateGamePayload, DeliveryStatus, JoinGamePayload, MessageType,
    WebSocketMessage,
};

/// Requests processed one at a time by the router task.
#[derive(Debug)]
pub enum HubCommand {
    Register {
        sender: mpsc::Sender<String>,
        reply: oneshot::Sender<String>,
    },
    Unregister {
        client_id: String,
    },
    Inbound {
        client_id: String,
        message: WebSocketMessage,
    },
    /// A frame from this client could not be parsed as an envelope.
    ProtocolError {
        client_id: String,
        reason: String,
    },
    SessionFinished {
        code: String,
    },
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    pub clients: usize,
    pub lobbies: usize,
    pub sessions: usize,
}

/// Cheap, cloneable access to the router task. Every method except the ones that
/// wait for a reply returns immediately.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    /// Registers a connection's outbound queue and returns its client id.
    pub async fn register(&self, sender: mpsc::Sender<String>) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(HubCommand::Register { sender, reply }).ok()?;
        rx.await.ok()
    }

    pub fn unregister(&self, client_id: &str) {
        self.dispatch(HubCommand::Unregister {
            client_id: client_id.to_string(),
        });
    }

    pub fn submit(&self, client_id: &str, message: WebSocketMessage) {
        self.dispatch(HubCommand::Inbound {
            client_id: client_id.to_string(),
            message,
        });
    }

    pub fn protocol_error(&self, client_id: &str, reason: String) {
        self.dispatch(HubCommand::ProtocolError {
            client_id: client_id.to_string(),
            reason,
        });
    }

    pub fn session_finished(&self, code: String) {
        self.dispatch(HubCommand::SessionFinished { code });
    }

    pub async fn stats(&self) -> Option<HubStats> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(HubCommand::Stats { reply }).ok()?;
        rx.await.ok()
    }

    fn dispatch(&self, command: HubCommand) {
        if self.tx.send(command).is_err() {
            warn!("Hub is not running, command dropped");
        }
    }
}

/// Owner of every client, lobby and session. Only the router task touches it.
pub struct Hub {
    clients: HashSet<String>,
    lobbies: HashMap<String, Lobby>,
    sessions: HashMap<String, SessionHandle>,
    // client id -> game code of their lobby or session
    locations: HashMap<String, String>,
    connections: Arc<dyn ConnectionManager>,
    results: Arc<dyn ResultRepository>,
    codes: Box<dyn CodeGenerator>,
    default_points_goal: u32,
    commands: Option<mpsc::WeakUnboundedSender<HubCommand>>,
    unreachable: Vec<String>,
}

impl Hub {
    pub fn new(
        connections: Arc<dyn ConnectionManager>,
        results: Arc<dyn ResultRepository>,
        default_points_goal: u32,
    ) -> Self {
        Self {
            clients: HashSet::new(),
            lobbies: HashMap::new(),
            sessions: HashMap::new(),
            locations: HashMap::new(),
            connections,
            results,
            codes: Box::new(RandomCodeGenerator::new()),
            default_points_goal,
            commands: None,
            unreachable: Vec::new(),
        }
    }

    pub fn with_code_generator(mut self, codes: Box<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    /// Starts the router task. It stops once every handle has been dropped.
    pub fn spawn(mut self) -> HubHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        self.commands = Some(tx.downgrade());
        tokio::spawn(self.run(rx));
        HubHandle { tx }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<HubCommand>) {
        info!("Hub started");
        while let Some(command) = rx.recv().await {
            self.handle_command(command).await;

            // clients found unreachable while handling the command
            while let Some(client_id) = self.unreachable.pop() {
                self.unregister_client(&client_id).await;
            }
        }
        info!("Hub stopped");
    }

    async fn handle_command(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register { sender, reply } => {
                let client_id = self.register_client(sender).await;
                if reply.send(client_id.clone()).is_err() {
                    // the connection went away while registering
                    self.unregister_client(&client_id).await;
                }
            }
            HubCommand::Unregister { client_id } => self.unregister_client(&client_id).await,
            HubCommand::Inbound { client_id, message } => {
                self.handle_inbound(&client_id, message).await
            }
            HubCommand::ProtocolError { client_id, reason } => {
                debug!(client_id = %client_id, reason = %reason, "Malformed frame");
                let err = HubError::MalformedPayload(reason);
                self.send(&client_id, WebSocketMessage::error(err.to_string()))
                    .await;
            }
            HubCommand::SessionFinished { code } => self.session_finished(&code),
            HubCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            clients: self.clients.len(),
            lobbies: self.lobbies.len(),
            sessions: self.sessions.len(),
        }
    }

    #[instrument(skip(self, sender))]
    pub async fn register_client(&mut self, sender: mpsc::Sender<String>) -> String {
        let client_id = Uuid::new_v4().to_string();
        self.connections
            .add_connection(client_id.clone(), sender)
            .await;
        self.clients.insert(client_id.clone());
        info!(client_id = %client_id, "Client connected");
        client_id
    }

    #[instrument(skip(self))]
    pub async fn unregister_client(&mut self, client_id: &str) {
        if !self.clients.remove(client_id) {
            debug!(client_id = %client_id, "Client already unregistered");
            return;
        }
        self.connections.remove_connection(client_id).await;
        info!(client_id = %client_id, "Client disconnected");

        let Some(code) = self.locations.remove(client_id) else {
            return;
        };

        if let Some(lobby) = self.lobbies.get_mut(&code) {
            let _ = lobby.remove_member(client_id);
            if lobby.is_empty() {
                self.lobbies.remove(&code);
                info!(game_code = %code, "Lobby emptied and removed");
            } else {
                self.broadcast_roster(&code).await;
            }
        } else if let Some(session) = self.sessions.get(&code) {
            info!(game_code = %code, client_id = %client_id, "Notifying session of disconnect");
            session.send(SessionCommand::Disconnect {
                client_id: client_id.to_string(),
            });
        } else {
            warn!(client_id = %client_id, game_code = %code, "Client mapped to unknown game code");
        }
    }

    async fn handle_inbound(&mut self, client_id: &str, message: WebSocketMessage) {
        if !self.clients.contains(client_id) {
            debug!(client_id = %client_id, "Message from unregistered client ignored");
            return;
        }

        let message_type = message.message_type;
        match message_type {
            MessageType::CreateGame => {
                let outcome = match message.payload_as::<CreateGamePayload>() {
                    Ok(payload) => self.create_lobby(client_id, payload).await.map(|_| ()),
                    Err(e) => Err(HubError::MalformedPayload(e.to_string())),
                };
                if let Err(err) = outcome {
                    self.send(client_id, WebSocketMessage::error(err.to_string()))
                        .await;
                }
            }
            MessageType::JoinGame => {
                let outcome = match message.payload_as::<JoinGamePayload>() {
                    Ok(payload) => self.join_lobby(client_id, payload).await,
                    Err(e) => Err(HubError::MalformedPayload(e.to_string())),
                };
                if let Err(err) = outcome {
                    self.send(client_id, WebSocketMessage::join_error(err.to_string()))
                        .await;
                }
            }
            MessageType::PlayCard | MessageType::Declare => {
                if let Err(err) = self.route_action(client_id, message) {
                    self.send(client_id, WebSocketMessage::error(err.to_string()))
                        .await;
                }
            }
            MessageType::Ping => self.send(client_id, WebSocketMessage::pong()).await,
            other => {
                debug!(client_id = %client_id, message_type = ?other, "Unknown message type");
                self.send(
                    client_id,
                    WebSocketMessage::error(HubError::UnknownMessageType.to_string()),
                )
                .await;
            }
        }
    }

    /// Opens a lobby with the client as its first member and returns the new code.
    #[instrument(skip(self, payload))]
    pub async fn create_lobby(
        &mut self,
        client_id: &str,
        payload: CreateGamePayload,
    ) -> Result<String, HubError> {
        if self.locations.contains_key(client_id) {
            return Err(HubError::AlreadyInGame);
        }
        let name = payload.name.trim().to_string();
        if name.is_empty() {
            return Err(HubError::InvalidName);
        }
        let desired_team = TeamSide::from_number(payload.desired_team)
            .ok_or(HubError::InvalidInput("Invalid desired team."))?;

        let code = self.unique_code();
        let points_goal = match payload.points_goal {
            0 => self.default_points_goal,
            goal => goal,
        };
        let creator = LobbyMember {
            client_id: client_id.to_string(),
            name,
            desired_team,
        };

        info!(client_id = %client_id, game_code = %code, points_goal, "Lobby created");
        self.lobbies
            .insert(code.clone(), Lobby::new(code.clone(), creator, points_goal));
        self.locations.insert(client_id.to_string(), code.clone());

        self.send(client_id, WebSocketMessage::game_created(code.clone()))
            .await;
        self.broadcast_roster(&code).await;
        Ok(code)
    }

    /// Adds the client to a lobby, starting the game when it fills.
    #[instrument(skip(self, payload))]
    pub async fn join_lobby(
        &mut self,
        client_id: &str,
        payload: JoinGamePayload,
    ) -> Result<(), HubError> {
        if self.locations.contains_key(client_id) {
            return Err(HubError::AlreadyInGame);
        }
        let name = payload.name.trim().to_string();
        if name.is_empty() {
            return Err(HubError::InvalidInput("Name cannot be empty."));
        }
        if payload.game_code.trim().is_empty() {
            return Err(HubError::InvalidInput("Game code cannot be empty."));
        }
        let desired_team = TeamSide::from_number(payload.desired_team)
            .ok_or(HubError::InvalidInput("Invalid desired team."))?;

        let code = codes::normalize(&payload.game_code);
        let lobby = self.lobbies.get_mut(&code).ok_or(HubError::NotFound)?;
        lobby.add_member(LobbyMember {
            client_id: client_id.to_string(),
            name,
            desired_team,
        })?;
        let full = lobby.is_full();
        self.locations.insert(client_id.to_string(), code.clone());
        info!(client_id = %client_id, game_code = %code, "Joined lobby");

        self.broadcast_roster(&code).await;
        if full {
            self.promote(&code);
        }
        Ok(())
    }

    /// Replaces a full lobby with a running session.
    fn promote(&mut self, code: &str) {
        let Some(lobby) = self.lobbies.remove(code) else {
            return;
        };
        let points_goal = lobby.points_goal();
        let Some(members) = lobby.into_seat_requests() else {
            error!(game_code = %code, "Lobby promoted without four members");
            return;
        };
        let Some(hub) = self.handle() else {
            error!(game_code = %code, "Hub is shutting down, game not started");
            return;
        };

        let game = Game::new(members, points_goal);
        info!(game_code = %code, game_id = %game.id(), "Lobby full, starting game");

        let sink = Arc::new(HubSink::new(self.connections.clone(), hub.clone()));
        let session = GameSession::new(code.to_string(), game, sink, self.results.clone());
        let handle = session.spawn(move |code| hub.session_finished(code));
        self.sessions.insert(code.to_string(), handle);
    }

    /// Hands a game action to the client's session without waiting for it.
    pub fn route_action(
        &self,
        client_id: &str,
        message: WebSocketMessage,
    ) -> Result<(), HubError> {
        let code = self.locations.get(client_id).ok_or(HubError::NotInGame)?;
        let session = self.sessions.get(code).ok_or(HubError::SessionNotFound)?;

        debug!(
            client_id = %client_id,
            game_code = %code,
            message_type = ?message.message_type,
            "Routing action"
        );
        let delivered = session.send(SessionCommand::Action {
            client_id: client_id.to_string(),
            message,
        });
        if delivered {
            Ok(())
        } else {
            Err(HubError::SessionNotFound)
        }
    }

    /// Drops a finished session and frees its players to start another game.
    fn session_finished(&mut self, code: &str) {
        if self.sessions.remove(code).is_none() {
            return;
        }
        self.locations.retain(|_, c| c != code);
        info!(game_code = %code, "Session removed");
    }

    fn unique_code(&self) -> String {
        loop {
            let code = self.codes.generate();
            if !self.lobbies.contains_key(&code) && !self.sessions.contains_key(&code) {
                return code;
            }
            debug!(game_code = %code, "Generated code collided, retrying");
        }
    }

    fn handle(&self) -> Option<HubHandle> {
        let tx = self.commands.as_ref()?.upgrade()?;
        Some(HubHandle { tx })
    }

    async fn broadcast_roster(&mut self, code: &str) {
        let Some(lobby) = self.lobbies.get(code) else {
            return;
        };
        let message = WebSocketMessage::lobby_update(lobby.roster());
        for client_id in lobby.member_ids() {
            self.send(&client_id, message.clone()).await;
        }
    }

    async fn send(&mut self, client_id: &str, message: WebSocketMessage) {
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
                self.unreachable.push(client_id.to_string());
            }
            DeliveryStatus::Unknown => {
                debug!(client_id = %client_id, "No connection for client");
            }
        }
    }
}
