use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::GameResult;

#[derive(Debug, Error)]
pub enum ResultStoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store of finished games. Written once per completed game, read by the HTTP routes.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn record(&self, result: &GameResult) -> Result<(), ResultStoreError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<GameResult>, ResultStoreError>;
    /// Every game the named player took part in, newest first.
    async fn get_by_player(&self, name: &str) -> Result<Vec<GameResult>, ResultStoreError>;
    /// All games, newest first.
    async fn list(&self) -> Result<Vec<GameResult>, ResultStoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryResultRepository {
    results: Arc<RwLock<Vec<GameResult>>>,
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn record(&self, result: &GameResult) -> Result<(), ResultStoreError> {
        self.results.write().await.push(result.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<GameResult>, ResultStoreError> {
        let results = self.results.read().await;
        Ok(results.iter().find(|r| r.id == id).cloned())
    }

    async fn get_by_player(&self, name: &str) -> Result<Vec<GameResult>, ResultStoreError> {
        let results = self.results.read().await;
        Ok(results
            .iter()
            .rev()
            .filter(|r| r.has_player(name))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<GameResult>, ResultStoreError> {
        let results = self.results.read().await;
        Ok(results.iter().rev().cloned().collect())
    }
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS tressette (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    player1 TEXT NOT NULL,
    player2 TEXT NOT NULL,
    player3 TEXT NOT NULL,
    player4 TEXT NOT NULL,
    player1_team INTEGER NOT NULL,
    player2_team INTEGER NOT NULL,
    player3_team INTEGER NOT NULL,
    player4_team INTEGER NOT NULL,
    team1_score INTEGER NOT NULL,
    team2_score INTEGER NOT NULL
)";

const SELECT_COLUMNS: &str = "SELECT id, created_at, player1, player2, player3, player4, \
    player1_team, player2_team, player3_team, player4_team, team1_score, team2_score \
    FROM tressette";

/// SQLite implementation of the result store
pub struct SqliteResultRepository {
    pool: SqlitePool,
}

impl SqliteResultRepository {
    /// Opens the pool, creating the database file if needed, and makes sure the
    /// results table exists.
    pub async fn connect(database_url: &str) -> Result<Self, ResultStoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, ResultStoreError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!("Results table ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl ResultRepository for SqliteResultRepository {
    #[instrument(skip(self, result), fields(game_id = %result.id))]
    async fn record(&self, result: &GameResult) -> Result<(), ResultStoreError> {
        sqlx::query(
            "INSERT INTO tressette (id, created_at, player1, player2, player3, player4, \
             player1_team, player2_team, player3_team, player4_team, team1_score, team2_score) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&result.id)
        .bind(result.created_at)
        .bind(&result.player1)
        .bind(&result.player2)
        .bind(&result.player3)
        .bind(&result.player4)
        .bind(result.player1_team)
        .bind(result.player2_team)
        .bind(result.player3_team)
        .bind(result.player4_team)
        .bind(result.team1_score)
        .bind(result.team2_score)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert game result");
            ResultStoreError::from(e)
        })?;

        debug!("Game result stored");
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<GameResult>, ResultStoreError> {
        let query = format!("{SELECT_COLUMNS} WHERE id = ?");
        let result = sqlx::query_as::<_, GameResult>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(result)
    }

    async fn get_by_player(&self, name: &str) -> Result<Vec<GameResult>, ResultStoreError> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE ?1 IN (player1, player2, player3, player4) \
             ORDER BY created_at DESC"
        );
        let results = sqlx::query_as::<_, GameResult>(&query)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;
        Ok(results)
    }

    async fn list(&self) -> Result<Vec<GameResult>, ResultStoreError> {
        let query = format!("{SELECT_COLUMNS} ORDER BY created_at DESC");
        let results = sqlx::query_as::<_, GameResult>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(results)
    }
}
