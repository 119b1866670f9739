#![allow(dead_code)] // Test utilities may not all be used in every test

use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};

use tressette::{
    hub::{Hub, HubHandle, HubStats},
    results::InMemoryResultRepository,
    websockets::{InMemoryConnectionManager, MessageType, WebSocketMessage},
};

use super::client::TestClient;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const NAMES: [&str; 4] = ["alice", "bob", "charlie", "david"];

pub struct TestSetup {
    pub hub: HubHandle,
    pub results: Arc<InMemoryResultRepository>,
    capacity: usize,
}

/// Four clients seated in a running game. `clients[i]` sits at seat `i`.
pub struct StartedGame {
    pub code: String,
    pub clients: Vec<TestClient>,
    pub game_start: WebSocketMessage,
}

pub struct TestSetupBuilder {
    points_goal: u32,
    capacity: usize,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            points_goal: 31,
            capacity: 1024,
        }
    }

    pub fn with_points_goal(mut self, points_goal: u32) -> Self {
        self.points_goal = points_goal;
        self
    }

    pub fn build(self) -> TestSetup {
        let results = Arc::new(InMemoryResultRepository::new());
        let hub = Hub::new(
            Arc::new(InMemoryConnectionManager::new()),
            results.clone(),
            self.points_goal,
        )
        .spawn();
        TestSetup {
            hub,
            results,
            capacity: self.capacity,
        }
    }
}

impl TestSetup {
    pub async fn connect(&self) -> TestClient {
        TestClient::connect(&self.hub, self.capacity).await
    }

    pub async fn connect_with_capacity(&self, capacity: usize) -> TestClient {
        TestClient::connect(&self.hub, capacity).await
    }

    pub async fn stats(&self) -> HubStats {
        self.hub.stats().await.expect("hub should be running")
    }

    /// Polls the hub until `check` holds, panicking after two seconds.
    pub async fn wait_for_stats(&self, check: impl Fn(&HubStats) -> bool) -> HubStats {
        timeout(Duration::from_secs(2), async {
            loop {
                let stats = self.stats().await;
                if check(&stats) {
                    return stats;
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("hub stats never matched")
    }

    /// Creates a lobby with the first client and returns its code.
    pub async fn create_lobby(&self, creator: &mut TestClient, name: &str, team: u8) -> String {
        creator.create_game(name, team, 0);
        let created = creator.expect(MessageType::GameCreated).await;
        created.payload["game_code"].as_str().unwrap().to_string()
    }

    /// Seats four clients alternating between the teams and waits for `game_start`.
    pub async fn start_game(&self) -> StartedGame {
        let mut clients = Vec::new();
        for _ in 0..4 {
            clients.push(self.connect().await);
        }

        let code = self.create_lobby(&mut clients[0], NAMES[0], 1).await;
        for (seat, client) in clients.iter().enumerate().skip(1) {
            let team = if seat % 2 == 0 { 1 } else { 2 };
            client.join_game(NAMES[seat], &code, team);
        }

        let mut game_start = None;
        for client in clients.iter_mut() {
            game_start = Some(client.expect(MessageType::GameStart).await);
        }

        StartedGame {
            code,
            clients,
            game_start: game_start.unwrap(),
        }
    }
}
